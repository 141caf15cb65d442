//! Price vs residual-load relationship.

use serde::{Deserialize, Serialize};

use crate::domain::CorrelationSample;
use crate::error::AppError;
use crate::math::{fit_line, pearson};

/// Correlation and regression line of price on residual load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStats {
    pub n: usize,
    pub include_anomalies: bool,
    pub correlation: f64,
    /// Price at zero residual load (€/MWh).
    pub intercept: f64,
    /// €/MWh per MW.
    pub slope: f64,
}

impl DriverStats {
    /// Fitted price at a given residual load.
    pub fn predict(&self, residual_load: f64) -> f64 {
        self.intercept + self.slope * residual_load
    }
}

pub fn driver_stats(samples: &[CorrelationSample], include_anomalies: bool) -> Result<DriverStats, AppError> {
    let (loads, prices): (Vec<f64>, Vec<f64>) = samples
        .iter()
        .filter(|s| include_anomalies || !s.is_anomaly)
        .map(|s| (s.residual_load, s.price))
        .unzip();

    if loads.len() < 2 {
        return Err(AppError::runtime(format!(
            "Driver statistics need at least 2 samples (got {}).",
            loads.len()
        )));
    }

    let correlation = pearson(&loads, &prices)
        .ok_or_else(|| AppError::runtime("Driver sample has zero variance; correlation undefined."))?;
    let (intercept, slope) = fit_line(&loads, &prices)
        .ok_or_else(|| AppError::runtime("Failed to fit driver regression line."))?;

    Ok(DriverStats {
        n: loads.len(),
        include_anomalies,
        correlation,
        intercept,
        slope,
    })
}
