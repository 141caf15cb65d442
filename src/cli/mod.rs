//! Command-line parsing for the energy market brief.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the synthesis/analytics code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::Severity;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sm", version, about = "Energy market sensemaker (synthetic day-ahead brief)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print key numbers, insight cards with sparklines, and the narrative.
    Brief(BriefArgs),
    /// Print the trailing hourly price window.
    Price(PriceArgs),
    /// Print the daily volatility series against its normal band.
    Volatility(SynthArgs),
    /// Print the residual-load/price sample and its fitted relationship.
    Drivers(DriversArgs),
    /// Compute sparkline geometry for the given values.
    Spark(SparkArgs),
    /// Launch the interactive dashboard.
    ///
    /// This uses the same underlying brief pipeline as `sm brief`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(BriefArgs),
}

/// Common options for generating the synthetic series.
#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Random seed; the same seed always yields the same series.
    #[arg(long, env = "SENSEMAKER_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Number of days of hourly prices (and daily volatility entries).
    #[arg(short = 'd', long, env = "SENSEMAKER_DAYS", default_value_t = 14)]
    pub days: usize,

    /// Calendar date of the first generated day (YYYY-MM-DD).
    #[arg(long, default_value = "2026-01-02")]
    pub start_date: NaiveDate,

    /// Mean price level before the hourly shape is applied (€/MWh).
    #[arg(long, default_value_t = 78.0)]
    pub base_price: f64,

    /// Day (0-based) carrying the price spike; defaults to the last day.
    #[arg(long)]
    pub anomaly_day: Option<usize>,

    /// Number of normal residual-load/price samples.
    #[arg(long, default_value_t = 50)]
    pub normal_samples: usize,

    /// Number of anomalous residual-load/price samples.
    #[arg(long, default_value_t = 5)]
    pub anomaly_samples: usize,
}

/// Options for the brief and the dashboard.
#[derive(Debug, Args, Clone)]
pub struct BriefArgs {
    #[command(flatten)]
    pub synth: SynthArgs,

    /// Trailing hours shown by the price chart.
    #[arg(long, default_value_t = 72)]
    pub window: usize,

    /// Export the full brief to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,

    /// Load a brief previously written with `--export-json` instead of
    /// synthesizing one; the synthesis flags are then ignored.
    #[arg(long = "from")]
    pub from: Option<PathBuf>,

    /// ASCII sparkline width (columns).
    #[arg(long, default_value_t = 42)]
    pub spark_cols: usize,

    /// ASCII sparkline height (rows).
    #[arg(long, default_value_t = 6)]
    pub spark_rows: usize,
}

/// Options for the price table.
#[derive(Debug, Args, Clone)]
pub struct PriceArgs {
    #[command(flatten)]
    pub synth: SynthArgs,

    /// Trailing hours to print.
    #[arg(long, default_value_t = 72)]
    pub window: usize,

    /// Export the printed window to CSV.
    #[arg(long = "export-csv")]
    pub export_csv: Option<PathBuf>,

    /// Render an ASCII plot of price vs baseline below the table.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 96)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for the driver sample.
#[derive(Debug, Args, Clone)]
pub struct DriversArgs {
    #[command(flatten)]
    pub synth: SynthArgs,

    /// Fit the relationship on normal samples only.
    #[arg(long)]
    pub exclude_anomalies: bool,
}

/// Options for raw sparkline geometry.
#[derive(Debug, Args, Clone)]
pub struct SparkArgs {
    /// Values to plot, in order.
    #[arg(allow_negative_numbers = true, value_name = "VALUE")]
    pub values: Vec<f64>,

    /// Box width in pixels.
    #[arg(long, default_value_t = 200.0)]
    pub width: f64,

    /// Box height in pixels.
    #[arg(long, default_value_t = 48.0)]
    pub height: f64,

    /// Also compute the filled area path.
    #[arg(long)]
    pub area: bool,

    /// Colour scheme for the SVG output.
    #[arg(long, value_enum, default_value_t = Severity::Low)]
    pub severity: Severity,

    /// Write the sparkline as an SVG file.
    #[arg(long, value_name = "PATH")]
    pub svg: Option<PathBuf>,

    /// Print the geometry as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// ASCII preview width (columns).
    #[arg(long, default_value_t = 40)]
    pub cols: usize,

    /// ASCII preview height (rows).
    #[arg(long, default_value_t = 8)]
    pub rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_brief_defaults() {
        let cli = Cli::try_parse_from(["sm", "brief"]).unwrap();
        let Command::Brief(args) = cli.command else {
            panic!("expected brief");
        };
        assert_eq!(args.window, 72);
        assert_eq!(args.synth.normal_samples, 50);
        assert_eq!(args.synth.start_date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert!(args.export_json.is_none());
        assert!(args.from.is_none());
    }

    #[test]
    fn brief_and_tui_accept_a_saved_brief() {
        let cli = Cli::try_parse_from(["sm", "brief", "--from", "saved.json"]).unwrap();
        let Command::Brief(args) = cli.command else {
            panic!("expected brief");
        };
        assert_eq!(args.from, Some(PathBuf::from("saved.json")));

        let cli = Cli::try_parse_from(["sm", "tui", "--from", "saved.json"]).unwrap();
        assert!(matches!(cli.command, Command::Tui(args) if args.from.is_some()));
    }

    #[test]
    fn spark_accepts_negative_values() {
        let cli = Cli::try_parse_from(["sm", "spark", "-3", "1.5", "4", "--area"]).unwrap();
        let Command::Spark(args) = cli.command else {
            panic!("expected spark");
        };
        assert_eq!(args.values, vec![-3.0, 1.5, 4.0]);
        assert!(args.area);
        assert_eq!(args.width, 200.0);
    }

    #[test]
    fn negative_days_are_rejected() {
        assert!(Cli::try_parse_from(["sm", "price", "--days", "-1"]).is_err());
        assert!(Cli::try_parse_from(["sm", "price", "--start-date", "02/01/2026"]).is_err());
    }
}
