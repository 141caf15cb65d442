//! Formatted terminal output: key numbers, narrative, cards and data tables.
//!
//! We keep formatting code in one place so:
//! - the synthesis/analytics code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::analytics::{DriverStats, KeyMetrics};
use crate::app::pipeline::Brief;
use crate::domain::{CorrelationSample, HighlightTarget, TimePoint, VolatilityPoint};
use crate::error::AppError;
use crate::plot::render_sparkline;
use crate::report::InsightCard;

/// One row of the key numbers table.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub label: &'static str,
    pub value: String,
    pub change: Option<String>,
    pub target: HighlightTarget,
}

/// Key numbers in display order, each tied to the chart it explains.
pub fn metric_rows(metrics: &KeyMetrics) -> Vec<MetricRow> {
    vec![
        MetricRow {
            label: "Average price (24h)",
            value: format!("{:.0} €/MWh", metrics.avg_price_24h),
            change: metrics.avg_change_pct.map(|pct| format!("{pct:+.0}%")),
            target: HighlightTarget::Price,
        },
        MetricRow {
            label: "Peak price",
            value: format!("{:.0} €/MWh", metrics.peak_price),
            change: Some(format!("{:+.0}%", metrics.peak_vs_baseline_pct)),
            target: HighlightTarget::Price,
        },
        MetricRow {
            label: "Price change vs baseline",
            value: format!("{:+.0} €/MWh", metrics.peak_vs_baseline),
            change: None,
            target: HighlightTarget::Price,
        },
        MetricRow {
            label: "Volatility ratio",
            value: format!("{:.1}×", metrics.volatility_ratio),
            change: Some(format!("{:+.0}%", (metrics.volatility_ratio - 1.0) * 100.0)),
            target: HighlightTarget::Volatility,
        },
        MetricRow {
            label: "Strongest driver correlation",
            value: format!("Residual load ({:.2})", metrics.driver_correlation),
            change: None,
            target: HighlightTarget::Driver,
        },
    ]
}

/// Format the full brief: headline, key numbers, cards, narrative.
pub fn format_brief(brief: &Brief, spark_cols: usize, spark_rows: usize) -> Result<String, AppError> {
    let mut out = String::new();
    let config = &brief.config;

    out.push_str("=== sm - Energy Market Brief ===\n");
    out.push_str(&format!(
        "Seed: {} | Days: {} | Start: {}\n",
        config.seed,
        config.days,
        config.params.start_date.format("%Y-%m-%d")
    ));
    if let (Some(first), Some(last)) = (brief.price.points.first(), brief.price.points.last()) {
        out.push_str(&format!(
            "Prices: n={} | {} {} .. {} {}\n",
            brief.price.len(),
            first.date,
            first.time,
            last.date,
            last.time
        ));
    }
    out.push('\n');

    out.push_str("Key numbers:\n");
    out.push_str(&format_metrics_table(&brief.metrics));
    out.push('\n');

    out.push_str(&format_cards(&brief.cards, spark_cols, spark_rows)?);

    out.push_str("What happened and why:\n");
    out.push_str(&format_narrative(&brief.metrics, &brief.driver_stats));

    Ok(out)
}

/// Format the key numbers table.
pub fn format_metrics_table(metrics: &KeyMetrics) -> String {
    let mut out = String::new();
    push_row(&mut out, format!("{:<30} {:>24} {:>8} {:<10}", "metric", "value", "change", "chart"));
    push_row(&mut out, format!("{:-<30} {:-<24} {:-<8} {:-<10}", "", "", "", ""));
    for row in metric_rows(metrics) {
        push_row(
            &mut out,
            format!(
                "{:<30} {:>24} {:>8} {:<10}",
                row.label,
                row.value,
                row.change.as_deref().unwrap_or("-"),
                row.target.display_name()
            ),
        );
    }
    out
}

/// Plain-language summary of the brief's numbers.
pub fn format_narrative(metrics: &KeyMetrics, drivers: &DriverStats) -> String {
    let mut out = String::new();

    let spike = if metrics.peak_vs_baseline > 30.0 {
        "a significant price spike"
    } else if metrics.peak_vs_baseline > 10.0 {
        "an elevated price peak"
    } else {
        "prices close to their baseline"
    };
    out.push_str(&format!(
        "The day-ahead market saw {spike} at {}, with the hourly price reaching {:.0} €/MWh. \
         That is {:+.0} €/MWh against the seasonal baseline.\n",
        metrics.peak_label, metrics.peak_price, metrics.peak_vs_baseline
    ));

    out.push_str(&format!(
        "Volatility is running at {:.1}% ({:.1}× the preceding period).\n",
        metrics.volatility_latest, metrics.volatility_ratio
    ));

    let strength = correlation_strength(drivers.correlation);
    out.push_str(&format!(
        "Price shows a {strength} correlation with residual load (r={:.2}, n={}); \
         each extra GW of residual load adds about {:.1} €/MWh.\n",
        drivers.correlation,
        drivers.n,
        drivers.slope * 1000.0
    ));

    out.push_str("Note: correlation does not imply causation.\n");
    out
}

/// Format insight cards with ASCII sparklines of `cols` x `rows` characters.
pub fn format_cards(cards: &[InsightCard], cols: usize, rows: usize) -> Result<String, AppError> {
    let mut out = String::new();
    for card in cards {
        out.push_str(&format!(
            "[{}] {}: {}\n",
            card.severity.display_name(),
            card.title,
            card.headline
        ));
        out.push_str(&format!("  {}\n", card.detail));
        for line in render_sparkline(&card.values, cols, rows)?.lines() {
            out.push_str("  ");
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out.push('\n');
    }
    Ok(out)
}

/// Hourly price table.
pub fn format_price_table(points: &[TimePoint]) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        format!("{:>6} {:<8} {:<6} {:>10} {:>10} {:>10} {:<7}", "hour", "date", "time", "price", "baseline", "dev", "anomaly"),
    );
    push_row(&mut out, format!("{:-<6} {:-<8} {:-<6} {:-<10} {:-<10} {:-<10} {:-<7}", "", "", "", "", "", "", ""));
    for p in points {
        push_row(
            &mut out,
            format!(
                "{:>6} {:<8} {:<6} {:>10.1} {:>10.1} {:>+10.1} {:<7}",
                p.index,
                p.date,
                p.time,
                p.value,
                p.baseline,
                p.deviation(),
                if p.is_anomaly { "yes" } else { "" }
            ),
        );
    }
    out
}

/// Volatility table with the normal band.
pub fn format_volatility_table(points: &[VolatilityPoint]) -> String {
    let mut out = String::new();
    push_row(&mut out, format!("{:<8} {:>8} {:>8} {:>8} {:<6}", "date", "vol%", "lower", "upper", "state"));
    push_row(&mut out, format!("{:-<8} {:-<8} {:-<8} {:-<8} {:-<6}", "", "", "", "", ""));
    for p in points {
        push_row(
            &mut out,
            format!(
                "{:<8} {:>8.1} {:>8.1} {:>8.1} {:<6}",
                p.label,
                p.value,
                p.normal_lower,
                p.normal_upper,
                if p.is_above_normal() { "HIGH" } else { "" }
            ),
        );
    }
    out
}

/// Residual-load/price samples followed by the fitted driver statistics.
pub fn format_driver_table(samples: &[CorrelationSample], stats: &DriverStats) -> String {
    let mut out = String::new();
    push_row(&mut out, format!("{:>5} {:>10} {:>10} {:>10} {:<7}", "#", "load_mw", "price", "fit", "anomaly"));
    push_row(&mut out, format!("{:-<5} {:-<10} {:-<10} {:-<10} {:-<7}", "", "", "", "", ""));
    for (i, s) in samples.iter().enumerate() {
        push_row(
            &mut out,
            format!(
                "{:>5} {:>10.0} {:>10.1} {:>10.1} {:<7}",
                i,
                s.residual_load,
                s.price,
                stats.predict(s.residual_load),
                if s.is_anomaly { "yes" } else { "" }
            ),
        );
    }
    out.push('\n');
    out.push_str(&format!(
        "Fit: price = {:.2} + {:.5} * load | r={:.3} ({}) | n={}{}\n",
        stats.intercept,
        stats.slope,
        stats.correlation,
        correlation_strength(stats.correlation),
        stats.n,
        if stats.include_anomalies { " (anomalies included)" } else { "" }
    ));
    out
}

fn correlation_strength(r: f64) -> &'static str {
    let r = r.abs();
    if r >= 0.7 {
        "strong"
    } else if r >= 0.4 {
        "moderate"
    } else {
        "weak"
    }
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_brief;
    use crate::domain::BriefConfig;

    fn metrics() -> KeyMetrics {
        KeyMetrics {
            avg_price_24h: 98.0,
            avg_change_pct: Some(12.0),
            peak_price: 142.0,
            peak_baseline: 78.0,
            peak_vs_baseline: 64.0,
            peak_vs_baseline_pct: 82.05,
            peak_label: "Jan 15 08:00".to_string(),
            volatility_latest: 26.4,
            volatility_ratio: 2.1,
            driver_correlation: 0.58,
        }
    }

    fn stats() -> DriverStats {
        DriverStats {
            n: 55,
            include_anomalies: true,
            correlation: 0.58,
            intercept: -60.0,
            slope: 0.025,
        }
    }

    #[test]
    fn metric_rows_link_to_charts() {
        let rows = metric_rows(&metrics());
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].value, "98 €/MWh");
        assert_eq!(rows[0].change.as_deref(), Some("+12%"));
        assert_eq!(rows[2].value, "+64 €/MWh");
        assert_eq!(rows[3].value, "2.1×");
        assert_eq!(rows[3].change.as_deref(), Some("+110%"));
        assert_eq!(rows[3].target, HighlightTarget::Volatility);
        assert_eq!(rows[4].value, "Residual load (0.58)");
        assert_eq!(rows[4].target, HighlightTarget::Driver);
    }

    #[test]
    fn metrics_table_has_header_and_rows() {
        let txt = format_metrics_table(&metrics());
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("metric"));
        assert!(lines[4].starts_with("Price change vs baseline"));
        assert!(lines.iter().all(|l| !l.ends_with(' ')));
    }

    #[test]
    fn narrative_mentions_spike_and_driver() {
        let txt = format_narrative(&metrics(), &stats());
        assert!(txt.contains("a significant price spike at Jan 15 08:00"));
        assert!(txt.contains("+64 €/MWh"));
        assert!(txt.contains("moderate correlation"));
        assert!(txt.contains("about 25.0 €/MWh"));
        assert!(txt.ends_with("causation.\n"));
    }

    #[test]
    fn full_brief_renders_every_section() {
        let brief = build_brief(&BriefConfig::default()).unwrap();
        let txt = format_brief(&brief, 28, 6).unwrap();
        assert!(txt.starts_with("=== sm - Energy Market Brief ===\n"));
        assert!(txt.contains("Seed: 42 | Days: 14 | Start: 2026-01-02"));
        assert!(txt.contains("Key numbers:"));
        assert!(txt.contains("Price Anomaly"));
        assert!(txt.contains("Volatility Regime"));
        assert!(txt.contains("What happened and why:"));
        // Each card gets a sparkline with its peak marked.
        assert_eq!(txt.matches('*').count(), 2);
    }

    #[test]
    fn price_table_flags_anomalies() {
        let brief = build_brief(&BriefConfig::default()).unwrap();
        let txt = format_price_table(brief.price_window());
        assert_eq!(txt.lines().count(), 2 + 72);
        assert_eq!(txt.lines().filter(|l| l.ends_with("yes")).count(), 3);
    }

    #[test]
    fn volatility_table_marks_elevated_tail() {
        let brief = build_brief(&BriefConfig::default()).unwrap();
        let txt = format_volatility_table(&brief.volatility);
        assert_eq!(txt.lines().count(), 2 + 14);
        assert_eq!(txt.lines().filter(|l| l.ends_with("HIGH")).count(), 3);
    }

    #[test]
    fn driver_table_ends_with_fit_summary() {
        let brief = build_brief(&BriefConfig::default()).unwrap();
        let txt = format_driver_table(&brief.drivers, &brief.driver_stats);
        assert_eq!(txt.lines().filter(|l| l.ends_with("yes")).count(), 5);
        let last = txt.lines().last().unwrap();
        assert!(last.starts_with("Fit: price = "));
        assert!(last.ends_with("n=55 (anomalies included)"));
    }
}
