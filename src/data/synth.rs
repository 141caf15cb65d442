//! Synthetic market series: hourly prices, volatility regime, and the
//! residual-load/price driver scatter.
//!
//! The shape of every series is fixed by its parameters; only the noise is
//! random. Two entry points exist:
//!
//! - `SeriesSynthesizer::from_seed` derives one `StdRng` per series from a base
//!   seed and a series tag, so each series is reproducible and independent of
//!   the order in which series are requested
//! - the `*_with` functions take any caller-supplied `Rng`

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Uniform;

use crate::domain::{
    CorrelationSample, DriverParams, HOURS_PER_DAY, MAX_DAYS, MAX_SAMPLES, PriceParams, PriceSeries,
    SynthParams, TimePoint, VolatilityParams, VolatilityPoint,
};
use crate::error::AppError;

/// Seeded generator for all three dashboard series.
#[derive(Debug, Clone)]
pub struct SeriesSynthesizer {
    seed: u64,
    params: SynthParams,
}

impl SeriesSynthesizer {
    pub fn from_seed(seed: u64) -> Self {
        Self::with_params(seed, SynthParams::default())
    }

    pub fn with_params(seed: u64, params: SynthParams) -> Self {
        Self { seed, params }
    }

    pub fn generate_price_series(&self, days: usize) -> Result<PriceSeries, AppError> {
        let mut rng = self.series_rng("price");
        price_series_with(&mut rng, days, self.params.start_date, &self.params.price)
    }

    pub fn generate_volatility_series(&self, days: usize) -> Result<Vec<VolatilityPoint>, AppError> {
        let mut rng = self.series_rng("volatility");
        volatility_series_with(&mut rng, days, self.params.start_date, &self.params.volatility)
    }

    pub fn generate_correlation_sample(
        &self,
        normal_count: usize,
        anomaly_count: usize,
    ) -> Result<Vec<CorrelationSample>, AppError> {
        let mut rng = self.series_rng("drivers");
        correlation_sample_with(&mut rng, normal_count, anomaly_count, &self.params.drivers)
    }

    fn series_rng(&self, tag: &str) -> StdRng {
        let seed = series_seed(self.seed, tag);
        log::debug!("series '{tag}' seeded with {seed:#018x} (base seed {})", self.seed);
        StdRng::seed_from_u64(seed)
    }
}

fn series_seed(base: u64, tag: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    base.hash(&mut hasher);
    tag.hash(&mut hasher);
    hasher.finish()
}

/// Seasonal multiplier for an hour of the day (morning and evening peaks, night trough).
pub fn hourly_multiplier(hour_of_day: usize) -> f64 {
    match hour_of_day {
        7..=9 => 1.3,
        18..=21 => 1.2,
        0..=5 => 0.7,
        _ => 1.0,
    }
}

/// Noise-free expected price for an hour slot. Depends only on the hour of day.
pub fn baseline_price(params: &PriceParams, hour_of_day: usize) -> f64 {
    params.base_price * hourly_multiplier(hour_of_day)
}

/// Generate `24 * days` hourly prices with exactly one anomaly window.
pub fn price_series_with<R: Rng + ?Sized>(
    rng: &mut R,
    days: usize,
    start_date: NaiveDate,
    params: &PriceParams,
) -> Result<PriceSeries, AppError> {
    validate_days(days)?;
    validate_price_params(params)?;

    if days == 0 {
        return Ok(PriceSeries::default());
    }

    let anomaly_day = params.anomaly_day.unwrap_or(days - 1);
    if anomaly_day >= days {
        return Err(AppError::invalid_input(format!(
            "Anomaly day {anomaly_day} is outside a {days}-day series."
        )));
    }
    let window_start = anomaly_day * HOURS_PER_DAY + params.anomaly_start_hour;
    let window_end = anomaly_day * HOURS_PER_DAY + params.anomaly_end_hour + 1;

    let half = params.noise_amplitude / 2.0;
    let noise = Uniform::new_inclusive(-half, half);
    let spike = Uniform::new(0.0, params.spike_span);

    let hours = days * HOURS_PER_DAY;
    let mut points = Vec::with_capacity(hours);
    let mut clamped = 0usize;

    for h in 0..hours {
        let day = h / HOURS_PER_DAY;
        let hour_of_day = h % HOURS_PER_DAY;
        let baseline = baseline_price(params, hour_of_day);

        let is_anomaly = (window_start..window_end).contains(&h);
        // Always draw the noise so the spike does not shift the stream for later hours.
        let noisy = baseline + noise.sample(rng);
        let raw = if is_anomaly {
            params.spike_floor + spike.sample(rng)
        } else {
            noisy
        };

        let mut value = round_tenth(raw);
        if value < 0.0 {
            clamped += 1;
            value = 0.0;
        }

        points.push(TimePoint {
            index: h,
            date: date_label(start_date, day),
            time: format!("{hour_of_day:02}:00"),
            value,
            baseline,
            is_anomaly,
        });
    }

    if clamped > 0 {
        log::warn!("clamped {clamped} negative price(s) to zero");
    }
    log::debug!(
        "generated {} hourly prices over {days} day(s); anomaly window {window_start}..{window_end}",
        points.len()
    );

    Ok(PriceSeries {
        points,
        anomaly_window: Some(window_start..window_end),
    })
}

/// Generate one volatility entry per day; the trailing entries model a regime shift.
pub fn volatility_series_with<R: Rng + ?Sized>(
    rng: &mut R,
    days: usize,
    start_date: NaiveDate,
    params: &VolatilityParams,
) -> Result<Vec<VolatilityPoint>, AppError> {
    validate_days(days)?;
    if !(params.normal_low.is_finite()
        && params.elevated_low.is_finite()
        && params.normal_span.is_finite()
        && params.elevated_span.is_finite()
        && params.normal_span > 0.0
        && params.elevated_span > 0.0)
    {
        return Err(AppError::invalid_input("Invalid volatility band settings."));
    }

    let normal = Uniform::new(params.normal_low, params.normal_low + params.normal_span);
    let elevated = Uniform::new(params.elevated_low, params.elevated_low + params.elevated_span);

    let out: Vec<VolatilityPoint> = (0..days)
        .map(|i| {
            let in_tail = i + params.elevated_tail >= days;
            let value = if in_tail {
                elevated.sample(rng)
            } else {
                normal.sample(rng)
            };
            VolatilityPoint {
                label: date_label(start_date, i),
                value: round_tenth(value),
                normal_upper: params.normal_upper,
                normal_lower: params.normal_lower,
            }
        })
        .collect();

    log::debug!("generated {} volatility entries", out.len());
    Ok(out)
}

/// Generate the residual-load/price scatter: normal samples first, then anomalies.
pub fn correlation_sample_with<R: Rng + ?Sized>(
    rng: &mut R,
    normal_count: usize,
    anomaly_count: usize,
    params: &DriverParams,
) -> Result<Vec<CorrelationSample>, AppError> {
    let spans = [
        params.load_span,
        params.anomaly_load_span,
        params.anomaly_price_span,
    ];
    if spans.iter().any(|s| !(s.is_finite() && *s > 0.0))
        || !(params.noise_amplitude.is_finite() && params.noise_amplitude >= 0.0)
        || !(params.load_min.is_finite() && params.slope.is_finite() && params.intercept.is_finite())
    {
        return Err(AppError::invalid_input("Invalid driver sample settings."));
    }

    let load = Uniform::new(params.load_min, params.load_min + params.load_span);
    let half = params.noise_amplitude / 2.0;
    let noise = Uniform::new_inclusive(-half, half);
    let anomaly_load = Uniform::new(
        params.anomaly_load_min,
        params.anomaly_load_min + params.anomaly_load_span,
    );
    let anomaly_price = Uniform::new(
        params.anomaly_price_min,
        params.anomaly_price_min + params.anomaly_price_span,
    );

    let total = normal_count
        .checked_add(anomaly_count)
        .filter(|n| *n <= MAX_SAMPLES)
        .ok_or_else(|| {
            AppError::invalid_input(format!(
                "Sample count {normal_count} + {anomaly_count} exceeds the maximum of {MAX_SAMPLES}."
            ))
        })?;

    let mut out = Vec::with_capacity(total);
    for _ in 0..normal_count {
        let residual_load: f64 = load.sample(rng);
        let price = params.intercept
            + (residual_load - params.load_min) * params.slope
            + noise.sample(rng);
        out.push(CorrelationSample {
            residual_load: residual_load.round(),
            price: round_tenth(price),
            is_anomaly: false,
        });
    }
    for _ in 0..anomaly_count {
        out.push(CorrelationSample {
            residual_load: anomaly_load.sample(rng),
            price: anomaly_price.sample(rng),
            is_anomaly: true,
        });
    }

    log::debug!("generated {normal_count} normal and {anomaly_count} anomaly driver samples");
    Ok(out)
}

fn validate_days(days: usize) -> Result<(), AppError> {
    if days > MAX_DAYS {
        return Err(AppError::invalid_input(format!(
            "Day count {days} exceeds the maximum of {MAX_DAYS}."
        )));
    }
    Ok(())
}

fn validate_price_params(params: &PriceParams) -> Result<(), AppError> {
    if !(params.base_price.is_finite() && params.base_price >= 0.0) {
        return Err(AppError::invalid_input("Base price must be finite and >= 0."));
    }
    if !(params.noise_amplitude.is_finite() && params.noise_amplitude >= 0.0) {
        return Err(AppError::invalid_input("Noise amplitude must be finite and >= 0."));
    }
    if !(params.spike_floor.is_finite() && params.spike_span.is_finite() && params.spike_span > 0.0) {
        return Err(AppError::invalid_input("Invalid spike settings."));
    }
    if params.anomaly_start_hour > params.anomaly_end_hour || params.anomaly_end_hour >= HOURS_PER_DAY {
        return Err(AppError::invalid_input(format!(
            "Invalid anomaly hours {}..={}.",
            params.anomaly_start_hour, params.anomaly_end_hour
        )));
    }
    Ok(())
}

fn date_label(start_date: NaiveDate, day: usize) -> String {
    start_date
        .checked_add_signed(Duration::days(day as i64))
        .unwrap_or(start_date)
        .format("%b %d")
        .to_string()
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::percentile;

    #[test]
    fn price_series_has_contiguous_hourly_indices() {
        let synth = SeriesSynthesizer::from_seed(7);
        for days in [1usize, 3, 14] {
            let series = synth.generate_price_series(days).unwrap();
            assert_eq!(series.len(), 24 * days);
            for (i, p) in series.points.iter().enumerate() {
                assert_eq!(p.index, i);
            }
        }
    }

    #[test]
    fn zero_days_yields_empty_series() {
        let series = SeriesSynthesizer::from_seed(1).generate_price_series(0).unwrap();
        assert!(series.is_empty());
        assert!(series.anomaly_window.is_none());
        assert!(series.anomaly_points().is_empty());
    }

    #[test]
    fn exactly_one_contiguous_anomaly_window() {
        let series = SeriesSynthesizer::from_seed(11).generate_price_series(14).unwrap();
        let window = series.anomaly_window.clone().unwrap();
        assert_eq!(window, (13 * 24 + 7)..(13 * 24 + 10));

        let flagged: Vec<usize> = series
            .points
            .iter()
            .filter(|p| p.is_anomaly)
            .map(|p| p.index)
            .collect();
        assert_eq!(flagged, window.clone().collect::<Vec<_>>());

        for p in series.anomaly_points() {
            assert!(p.value >= 120.0 && p.value <= 145.0, "spike value {}", p.value);
        }
    }

    #[test]
    fn anomaly_day_can_be_pinned() {
        let params = PriceParams {
            anomaly_day: Some(2),
            ..PriceParams::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let series = price_series_with(&mut rng, 5, NaiveDate::default(), &params).unwrap();
        assert_eq!(series.anomaly_window, Some((2 * 24 + 7)..(2 * 24 + 10)));
    }

    #[test]
    fn anomaly_day_outside_series_is_rejected() {
        let params = PriceParams {
            anomaly_day: Some(5),
            ..PriceParams::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let err = price_series_with(&mut rng, 5, NaiveDate::default(), &params).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn oversized_day_count_is_rejected() {
        let synth = SeriesSynthesizer::from_seed(3);
        assert!(synth.generate_price_series(MAX_DAYS + 1).unwrap_err().is_input_error());
        assert!(synth.generate_volatility_series(MAX_DAYS + 1).unwrap_err().is_input_error());
    }

    #[test]
    fn baseline_depends_only_on_hour_slot() {
        let a = SeriesSynthesizer::from_seed(1).generate_price_series(3).unwrap();
        let b = SeriesSynthesizer::from_seed(2).generate_price_series(3).unwrap();
        assert_eq!(a.baselines(), b.baselines());

        let params = PriceParams::default();
        for p in &a.points {
            assert_eq!(p.baseline, baseline_price(&params, p.hour_of_day()));
        }
        assert_eq!(a.points[8].baseline, 78.0 * 1.3);
        assert_eq!(a.points[19].baseline, 78.0 * 1.2);
        assert_eq!(a.points[2].baseline, 78.0 * 0.7);
        assert_eq!(a.points[12].baseline, 78.0);
    }

    #[test]
    fn normal_prices_stay_within_noise_band() {
        let series = SeriesSynthesizer::from_seed(5).generate_price_series(7).unwrap();
        for p in series.points.iter().filter(|p| !p.is_anomaly) {
            assert!(
                (p.value - p.baseline).abs() <= 7.5 + 0.05 + 1e-9,
                "hour {}: value {} baseline {}",
                p.index,
                p.value,
                p.baseline
            );
        }
    }

    #[test]
    fn negative_prices_are_clamped() {
        let params = PriceParams {
            base_price: 1.0,
            noise_amplitude: 100.0,
            ..PriceParams::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let series = price_series_with(&mut rng, 4, NaiveDate::default(), &params).unwrap();
        assert!(series.points.iter().all(|p| p.value >= 0.0));
        assert!(series.points.iter().any(|p| p.value == 0.0));
    }

    #[test]
    fn labels_follow_calendar() {
        let series = SeriesSynthesizer::from_seed(1).generate_price_series(2).unwrap();
        assert_eq!(series.points[0].date, "Jan 02");
        assert_eq!(series.points[0].time, "00:00");
        assert_eq!(series.points[31].date, "Jan 03");
        assert_eq!(series.points[31].time, "07:00");
    }

    #[test]
    fn same_seed_reproduces_series() {
        let a = SeriesSynthesizer::from_seed(99);
        let b = SeriesSynthesizer::from_seed(99);
        assert_eq!(a.generate_price_series(3).unwrap(), b.generate_price_series(3).unwrap());
        // Request order does not matter.
        let vol_b = b.generate_volatility_series(14).unwrap();
        let _ = a.generate_correlation_sample(10, 2).unwrap();
        assert_eq!(a.generate_volatility_series(14).unwrap(), vol_b);
    }

    #[test]
    fn volatility_tail_is_elevated() {
        let vol = SeriesSynthesizer::from_seed(4).generate_volatility_series(14).unwrap();
        assert_eq!(vol.len(), 14);
        for (i, v) in vol.iter().enumerate() {
            if i >= 11 {
                assert!(v.value >= 22.0 && v.value <= 30.0, "day {i}: {}", v.value);
            } else {
                assert!(v.value >= 12.0 && v.value <= 17.0, "day {i}: {}", v.value);
            }
            assert_eq!(v.normal_upper, 20.0);
            assert_eq!(v.normal_lower, 8.0);
        }
        assert_eq!(vol[0].label, "Jan 02");
    }

    #[test]
    fn short_volatility_series_is_all_tail() {
        let vol = SeriesSynthesizer::from_seed(4).generate_volatility_series(2).unwrap();
        assert_eq!(vol.len(), 2);
        assert!(vol.iter().all(|v| v.value >= 22.0));
        assert!(SeriesSynthesizer::from_seed(4).generate_volatility_series(0).unwrap().is_empty());
    }

    #[test]
    fn correlation_sample_counts_and_separation() {
        let samples = SeriesSynthesizer::from_seed(2024)
            .generate_correlation_sample(50, 5)
            .unwrap();
        assert_eq!(samples.len(), 55);

        let (anomalies, normal): (Vec<&CorrelationSample>, Vec<_>) = samples.iter().partition(|s| s.is_anomaly);
        assert_eq!(anomalies.len(), 5);

        let normal_loads: Vec<f64> = normal.iter().map(|s| s.residual_load).collect();
        let p95 = percentile(&normal_loads, 95.0).unwrap();
        let max_normal_price = normal.iter().map(|s| s.price).fold(f64::NEG_INFINITY, f64::max);
        for a in &anomalies {
            assert!(a.residual_load > p95, "anomaly load {} <= p95 {p95}", a.residual_load);
            assert!(a.price > max_normal_price);
        }
    }

    #[test]
    fn correlation_sample_accepts_zero_counts() {
        let synth = SeriesSynthesizer::from_seed(1);
        assert!(synth.generate_correlation_sample(0, 0).unwrap().is_empty());
        let only_anomalies = synth.generate_correlation_sample(0, 3).unwrap();
        assert!(only_anomalies.iter().all(|s| s.is_anomaly));
    }

    #[test]
    fn oversized_sample_counts_are_rejected() {
        let synth = SeriesSynthesizer::from_seed(1);
        let err = synth.generate_correlation_sample(usize::MAX, 5).unwrap_err();
        assert!(err.is_input_error());
        assert!(synth.generate_correlation_sample(MAX_SAMPLES, 1).unwrap_err().is_input_error());
        assert!(synth.generate_correlation_sample(usize::MAX, 0).unwrap_err().is_input_error());
    }

    #[test]
    fn supplied_rng_is_used() {
        let params = DriverParams::default();
        let mut a = StdRng::seed_from_u64(5);
        let mut b = StdRng::seed_from_u64(5);
        assert_eq!(
            correlation_sample_with(&mut a, 20, 2, &params).unwrap(),
            correlation_sample_with(&mut b, 20, 2, &params).unwrap()
        );
    }
}
