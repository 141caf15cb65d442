//! Reporting: insight cards and formatted terminal output.

pub mod format;

pub use format::*;

use serde::{Deserialize, Serialize};

use crate::analytics::KeyMetrics;
use crate::domain::{HighlightTarget, PriceSeries, Severity, SparkKind, VolatilityPoint};
use crate::error::AppError;
use crate::geometry::{SparkPath, compute_paths};

/// A summary card with its sparkline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightCard {
    pub title: String,
    pub headline: String,
    pub detail: String,
    pub severity: Severity,
    pub kind: SparkKind,
    pub values: Vec<f64>,
    pub spark: SparkPath,
    pub target: HighlightTarget,
}

/// Severity of a price spike from its deviation above baseline (€/MWh).
pub fn price_severity(peak_vs_baseline: f64) -> Severity {
    if peak_vs_baseline > 30.0 {
        Severity::High
    } else if peak_vs_baseline > 10.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Severity of a volatility regime from its ratio to the earlier level.
pub fn volatility_severity(ratio: f64) -> Severity {
    if ratio >= 2.0 {
        Severity::High
    } else if ratio >= 1.3 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Build the price-anomaly and volatility-regime cards.
pub fn insight_cards(
    metrics: &KeyMetrics,
    price: &PriceSeries,
    volatility: &[VolatilityPoint],
    spark_width: f64,
    spark_height: f64,
) -> Result<Vec<InsightCard>, AppError> {
    let price_values = price.daily_peaks();
    let vol_values: Vec<f64> = volatility.iter().map(|v| v.value).collect();

    let jobs = [
        (price_values.clone(), SparkKind::Line),
        (vol_values.clone(), SparkKind::Area),
    ];
    let mut sparks = compute_paths(&jobs, spark_width, spark_height)?.into_iter();
    let (Some(price_spark), Some(vol_spark)) = (sparks.next(), sparks.next()) else {
        return Err(AppError::runtime("Sparkline batch returned no geometry."));
    };

    let price_level = price_severity(metrics.peak_vs_baseline);
    let price_headline = match price_level {
        Severity::High => "Unusual Price Spike",
        Severity::Medium => "Elevated Peak Prices",
        Severity::Low => "Prices Near Baseline",
    };
    let vol_level = volatility_severity(metrics.volatility_ratio);
    let vol_headline = match vol_level {
        Severity::High | Severity::Medium => "High Volatility Detected",
        Severity::Low => "Volatility Within Normal Range",
    };

    Ok(vec![
        InsightCard {
            title: "Price Anomaly".to_string(),
            headline: price_headline.to_string(),
            detail: format!(
                "Day-ahead price peaked at {:.0} €/MWh ({:+.0} €/MWh vs baseline)",
                metrics.peak_price, metrics.peak_vs_baseline
            ),
            severity: price_level,
            kind: SparkKind::Line,
            values: price_values,
            spark: price_spark,
            target: HighlightTarget::Price,
        },
        InsightCard {
            title: "Volatility Regime".to_string(),
            headline: vol_headline.to_string(),
            detail: format!(
                "Volatility is {:.1}× higher than the preceding period",
                metrics.volatility_ratio
            ),
            severity: vol_level,
            kind: SparkKind::Area,
            values: vol_values,
            spark: vol_spark,
            target: HighlightTarget::Volatility,
        },
    ])
}
