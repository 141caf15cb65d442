//! Shared domain types.
//!
//! These types are plain, serializable value objects so they can be:
//!
//! - produced by the synthesizer and consumed by geometry/analytics in-memory
//! - exported to JSON/CSV
//! - handed to a rendering surface (TUI, ASCII plot, SVG)

use std::ops::Range;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const HOURS_PER_DAY: usize = 24;

/// Upper bound on generated days; larger requests are rejected as input errors.
pub const MAX_DAYS: usize = 3650;

/// Upper bound on normal plus anomaly driver samples.
pub const MAX_SAMPLES: usize = 1_000_000;

/// One hourly price sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// Hour offset from the start of the series.
    pub index: usize,
    /// Calendar label, e.g. `Jan 02`.
    pub date: String,
    /// Time-of-day label, e.g. `07:00`.
    pub time: String,
    /// Price in €/MWh (rounded to 0.1, never negative).
    pub value: f64,
    /// Noise-free seasonal expectation for the same hour slot.
    pub baseline: f64,
    pub is_anomaly: bool,
}

impl TimePoint {
    pub fn day(&self) -> usize {
        self.index / HOURS_PER_DAY
    }

    pub fn hour_of_day(&self) -> usize {
        self.index % HOURS_PER_DAY
    }

    /// Deviation of the observed value from its baseline.
    pub fn deviation(&self) -> f64 {
        self.value - self.baseline
    }
}

/// An hourly price series with its designated anomaly window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub points: Vec<TimePoint>,
    /// Index range (into `points`) of the injected spike, if any.
    pub anomaly_window: Option<Range<usize>>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The final `k` points (or the whole series when shorter).
    pub fn last(&self, k: usize) -> &[TimePoint] {
        let start = self.points.len().saturating_sub(k);
        &self.points[start..]
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn baselines(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.baseline).collect()
    }

    pub fn anomaly_points(&self) -> &[TimePoint] {
        match &self.anomaly_window {
            Some(window) => &self.points[window.clone()],
            None => &[],
        }
    }

    /// Maximum price of each calendar day, in day order.
    pub fn daily_peaks(&self) -> Vec<f64> {
        self.points
            .chunks(HOURS_PER_DAY)
            .map(|day| day.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max))
            .collect()
    }
}

/// One entry of the rolling volatility series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPoint {
    pub label: String,
    /// Volatility in percent.
    pub value: f64,
    pub normal_upper: f64,
    pub normal_lower: f64,
}

impl VolatilityPoint {
    pub fn is_above_normal(&self) -> bool {
        self.value > self.normal_upper
    }
}

/// One point of the residual-load vs price scatter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationSample {
    /// Residual load in MW (independent variable).
    pub residual_load: f64,
    /// Price in €/MWh (dependent variable).
    pub price: f64,
    pub is_anomaly: bool,
}

/// Hourly price generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceParams {
    pub base_price: f64,
    /// Full width of the uniform noise band (15.0 means ±7.5).
    pub noise_amplitude: f64,
    /// Day carrying the spike; `None` picks the last generated day.
    pub anomaly_day: Option<usize>,
    pub anomaly_start_hour: usize,
    /// Inclusive.
    pub anomaly_end_hour: usize,
    pub spike_floor: f64,
    pub spike_span: f64,
}

impl Default for PriceParams {
    fn default() -> Self {
        Self {
            base_price: 78.0,
            noise_amplitude: 15.0,
            anomaly_day: None,
            anomaly_start_hour: 7,
            anomaly_end_hour: 9,
            spike_floor: 120.0,
            spike_span: 25.0,
        }
    }
}

/// Volatility regime generation parameters (all in percent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityParams {
    pub normal_low: f64,
    pub normal_span: f64,
    pub elevated_low: f64,
    pub elevated_span: f64,
    /// Number of trailing entries drawn from the elevated band.
    pub elevated_tail: usize,
    pub normal_upper: f64,
    pub normal_lower: f64,
}

impl Default for VolatilityParams {
    fn default() -> Self {
        Self {
            normal_low: 12.0,
            normal_span: 5.0,
            elevated_low: 22.0,
            elevated_span: 8.0,
            elevated_tail: 3,
            normal_upper: 20.0,
            normal_lower: 8.0,
        }
    }
}

/// Residual-load/price scatter generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverParams {
    pub load_min: f64,
    pub load_span: f64,
    pub intercept: f64,
    /// €/MWh per MW of residual load above `load_min`.
    pub slope: f64,
    /// Full width of the uniform price noise band.
    pub noise_amplitude: f64,
    pub anomaly_load_min: f64,
    pub anomaly_load_span: f64,
    pub anomaly_price_min: f64,
    pub anomaly_price_span: f64,
}

impl Default for DriverParams {
    fn default() -> Self {
        Self {
            load_min: 4000.0,
            load_span: 2500.0,
            intercept: 40.0,
            slope: 0.015,
            noise_amplitude: 25.0,
            anomaly_load_min: 6500.0,
            anomaly_load_span: 500.0,
            anomaly_price_min: 130.0,
            anomaly_price_span: 20.0,
        }
    }
}

/// All synthesizer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthParams {
    /// Calendar date of hour 0 / day 0.
    pub start_date: NaiveDate,
    pub price: PriceParams,
    pub volatility: VolatilityParams,
    pub drivers: DriverParams,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            price: PriceParams::default(),
            volatility: VolatilityParams::default(),
            drivers: DriverParams::default(),
        }
    }
}

pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 2).unwrap_or_default()
}

/// Dashboard widgets that can be cross-highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HighlightTarget {
    Price,
    Volatility,
    Driver,
}

impl HighlightTarget {
    pub const ALL: [HighlightTarget; 3] = [
        HighlightTarget::Price,
        HighlightTarget::Volatility,
        HighlightTarget::Driver,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            HighlightTarget::Price => "price",
            HighlightTarget::Volatility => "volatility",
            HighlightTarget::Driver => "driver",
        }
    }
}

/// Insight severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn display_name(self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    /// Stroke color (hex).
    pub fn stroke(self) -> &'static str {
        match self {
            Severity::High => "#ef4444",
            Severity::Medium => "#f59e0b",
            Severity::Low => "#10b981",
        }
    }

    /// Area fill color (CSS rgba).
    pub fn fill(self) -> &'static str {
        match self {
            Severity::High => "rgba(239, 68, 68, 0.1)",
            Severity::Medium => "rgba(245, 158, 11, 0.1)",
            Severity::Low => "rgba(16, 185, 129, 0.1)",
        }
    }
}

/// Sparkline flavor: stroke only, or stroke plus filled area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SparkKind {
    #[default]
    Line,
    Area,
}

/// A full brief run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefConfig {
    pub seed: u64,
    pub days: usize,
    /// Trailing hours shown by the price chart.
    pub window_hours: usize,
    pub normal_samples: usize,
    pub anomaly_samples: usize,
    pub spark_width: f64,
    pub spark_height: f64,
    pub params: SynthParams,
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            days: 14,
            window_hours: 72,
            normal_samples: 50,
            anomaly_samples: 5,
            spark_width: 200.0,
            spark_height: 48.0,
            params: SynthParams::default(),
        }
    }
}
