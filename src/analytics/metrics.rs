//! Headline numbers for the key metrics table and insight cards.

use serde::{Deserialize, Serialize};

use crate::analytics::DriverStats;
use crate::domain::{HOURS_PER_DAY, PriceSeries, VolatilityPoint};
use crate::error::AppError;
use crate::math::mean;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    /// Mean price over the last 24 hours (€/MWh).
    pub avg_price_24h: f64,
    /// Change of the 24h mean vs the preceding 24h, in percent (needs 48 hours).
    pub avg_change_pct: Option<f64>,
    /// Highest price in the last 24 hours.
    pub peak_price: f64,
    pub peak_baseline: f64,
    /// `peak_price - peak_baseline`.
    pub peak_vs_baseline: f64,
    pub peak_vs_baseline_pct: f64,
    /// `date time` label of the peak hour.
    pub peak_label: String,
    pub volatility_latest: f64,
    /// Mean of the elevated tail over the mean of the earlier entries.
    pub volatility_ratio: f64,
    pub driver_correlation: f64,
}

pub fn key_metrics(
    price: &PriceSeries,
    volatility: &[VolatilityPoint],
    elevated_tail: usize,
    drivers: &DriverStats,
) -> Result<KeyMetrics, AppError> {
    if price.len() < HOURS_PER_DAY {
        return Err(AppError::invalid_input(format!(
            "Key metrics need at least {HOURS_PER_DAY} hourly prices (got {}).",
            price.len()
        )));
    }
    if elevated_tail == 0 || volatility.len() <= elevated_tail {
        return Err(AppError::invalid_input(format!(
            "Volatility ratio needs more than {elevated_tail} entries (got {}).",
            volatility.len()
        )));
    }

    let last_day = price.last(HOURS_PER_DAY);
    let values = price.values();
    let n = values.len();
    let avg_price_24h = mean(&values[n - HOURS_PER_DAY..]).unwrap_or(0.0);

    let avg_change_pct = if n >= 2 * HOURS_PER_DAY {
        mean(&values[n - 2 * HOURS_PER_DAY..n - HOURS_PER_DAY])
            .filter(|m| *m > 0.0)
            .map(|m| (avg_price_24h - m) / m * 100.0)
    } else {
        None
    };

    let mut peak = &last_day[0];
    for p in last_day {
        if p.value > peak.value {
            peak = p;
        }
    }
    let peak_vs_baseline = peak.value - peak.baseline;
    let peak_vs_baseline_pct = if peak.baseline > 0.0 {
        peak_vs_baseline / peak.baseline * 100.0
    } else {
        0.0
    };

    let split = volatility.len() - elevated_tail;
    let before: Vec<f64> = volatility[..split].iter().map(|v| v.value).collect();
    let tail: Vec<f64> = volatility[split..].iter().map(|v| v.value).collect();
    let before_mean = mean(&before).unwrap_or(0.0);
    if before_mean <= 0.0 {
        return Err(AppError::runtime("Baseline volatility is zero; ratio undefined."));
    }
    let volatility_ratio = mean(&tail).unwrap_or(0.0) / before_mean;

    Ok(KeyMetrics {
        avg_price_24h,
        avg_change_pct,
        peak_price: peak.value,
        peak_baseline: peak.baseline,
        peak_vs_baseline,
        peak_vs_baseline_pct,
        peak_label: format!("{} {}", peak.date, peak.time),
        volatility_latest: volatility[volatility.len() - 1].value,
        volatility_ratio,
        driver_correlation: drivers.correlation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::driver_stats;
    use crate::data::SeriesSynthesizer;
    use crate::domain::TimePoint;

    fn stats() -> DriverStats {
        DriverStats {
            n: 10,
            include_anomalies: true,
            correlation: 0.58,
            intercept: 0.0,
            slope: 0.0,
        }
    }

    fn vol(values: &[f64]) -> Vec<VolatilityPoint> {
        values
            .iter()
            .map(|&value| VolatilityPoint {
                label: String::new(),
                value,
                normal_upper: 20.0,
                normal_lower: 8.0,
            })
            .collect()
    }

    fn flat_series(hours: usize, value: f64) -> PriceSeries {
        PriceSeries {
            points: (0..hours)
                .map(|index| TimePoint {
                    index,
                    date: "Jan 02".to_string(),
                    time: format!("{:02}:00", index % 24),
                    value,
                    baseline: 50.0,
                    is_anomaly: false,
                })
                .collect(),
            anomaly_window: None,
        }
    }

    #[test]
    fn metrics_on_handmade_series() {
        let mut price = flat_series(48, 50.0);
        for p in &mut price.points[24..] {
            p.value = 60.0;
        }
        price.points[40].value = 140.0;

        let m = key_metrics(&price, &vol(&[10.0, 10.0, 10.0, 20.0, 30.0]), 2, &stats()).unwrap();
        let expected_avg = (23.0 * 60.0 + 140.0) / 24.0;
        assert!((m.avg_price_24h - expected_avg).abs() < 1e-9);
        let expected_change = (expected_avg - 50.0) / 50.0 * 100.0;
        assert!((m.avg_change_pct.unwrap() - expected_change).abs() < 1e-9);
        assert_eq!(m.peak_price, 140.0);
        assert_eq!(m.peak_vs_baseline, 90.0);
        assert!((m.peak_vs_baseline_pct - 180.0).abs() < 1e-9);
        assert_eq!(m.peak_label, "Jan 02 16:00");
        assert!((m.volatility_ratio - 2.5).abs() < 1e-12);
        assert_eq!(m.volatility_latest, 30.0);
        assert_eq!(m.driver_correlation, 0.58);
    }

    #[test]
    fn single_day_has_no_change() {
        let m = key_metrics(&flat_series(24, 50.0), &vol(&[10.0, 20.0]), 1, &stats()).unwrap();
        assert!(m.avg_change_pct.is_none());
        // Ties resolve to the first hour.
        assert_eq!(m.peak_label, "Jan 02 00:00");
    }

    #[test]
    fn short_inputs_are_rejected() {
        assert!(key_metrics(&flat_series(23, 50.0), &vol(&[1.0, 2.0]), 1, &stats()).is_err());
        assert!(key_metrics(&flat_series(24, 50.0), &vol(&[1.0, 2.0]), 2, &stats()).is_err());
        assert!(key_metrics(&flat_series(24, 50.0), &vol(&[1.0, 2.0]), 0, &stats()).is_err());
    }

    #[test]
    fn synthesized_brief_shows_spike_and_regime_shift() {
        let synth = SeriesSynthesizer::from_seed(42);
        let price = synth.generate_price_series(14).unwrap();
        let vol = synth.generate_volatility_series(14).unwrap();
        let drivers = driver_stats(&synth.generate_correlation_sample(50, 5).unwrap(), true).unwrap();

        let m = key_metrics(&price, &vol, 3, &drivers).unwrap();
        assert!(m.peak_price >= 120.0);
        assert!(m.peak_vs_baseline > 10.0);
        // Elevated band [22, 30) over normal band [12, 17).
        assert!(m.volatility_ratio > 1.25 && m.volatility_ratio < 2.6, "ratio {}", m.volatility_ratio);
    }
}
