//! Shared "brief pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! synthesize series -> driver stats -> key metrics -> insight cards
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use serde::{Deserialize, Serialize};

use crate::analytics::{DriverStats, KeyMetrics, driver_stats, key_metrics};
use crate::data::SeriesSynthesizer;
use crate::domain::{BriefConfig, CorrelationSample, PriceSeries, TimePoint, VolatilityPoint};
use crate::error::AppError;
use crate::report::{InsightCard, insight_cards};

/// All computed outputs of a single brief run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brief {
    pub config: BriefConfig,
    pub price: PriceSeries,
    pub volatility: Vec<VolatilityPoint>,
    pub drivers: Vec<CorrelationSample>,
    pub driver_stats: DriverStats,
    pub metrics: KeyMetrics,
    pub cards: Vec<InsightCard>,
}

impl Brief {
    /// The trailing hours shown by the price chart.
    pub fn price_window(&self) -> &[TimePoint] {
        self.price.last(self.config.window_hours)
    }
}

/// Execute the full brief pipeline and return the computed outputs.
pub fn build_brief(config: &BriefConfig) -> Result<Brief, AppError> {
    let synth = SeriesSynthesizer::with_params(config.seed, config.params.clone());

    // 1) Synthesize the three series.
    let price = synth.generate_price_series(config.days)?;
    let volatility = synth.generate_volatility_series(config.days)?;
    let drivers = synth.generate_correlation_sample(config.normal_samples, config.anomaly_samples)?;

    // 2) Statistics over the synthesized data.
    let stats = driver_stats(&drivers, true)?;
    let metrics = key_metrics(
        &price,
        &volatility,
        config.params.volatility.elevated_tail,
        &stats,
    )?;

    // 3) Cards with sparkline geometry.
    let cards = insight_cards(
        &metrics,
        &price,
        &volatility,
        config.spark_width,
        config.spark_height,
    )?;

    log::info!(
        "brief built: seed={} days={} peak={:.1} vol_ratio={:.2} corr={:.2}",
        config.seed,
        config.days,
        metrics.peak_price,
        metrics.volatility_ratio,
        stats.correlation
    );

    Ok(Brief {
        config: config.clone(),
        price,
        volatility,
        drivers,
        driver_stats: stats,
        metrics,
        cards,
    })
}
