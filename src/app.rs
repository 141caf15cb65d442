//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - builds the synthetic brief
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{BriefArgs, Command, DriversArgs, PriceArgs, SparkArgs, SynthArgs};
use crate::data::SeriesSynthesizer;
use crate::domain::{BriefConfig, SparkKind};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `sm` binary.
pub fn run() -> Result<(), AppError> {
    // Missing `.env` is the normal case.
    if let Ok(path) = dotenvy::dotenv() {
        log::debug!("loaded environment from {}", path.display());
    }

    // We want `sm` and `sm --seed 7` to behave like `sm tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Brief(args) => handle_brief(args),
        Command::Price(args) => handle_price(args),
        Command::Volatility(args) => handle_volatility(args),
        Command::Drivers(args) => handle_drivers(args),
        Command::Spark(args) => handle_spark(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_brief(args: BriefArgs) -> Result<(), AppError> {
    let brief = brief_from_args(&args)?;

    println!(
        "{}",
        crate::report::format_brief(&brief, args.spark_cols, args.spark_rows)?
    );

    if let Some(path) = &args.export_json {
        crate::io::write_brief_json(path, &brief)?;
    }
    Ok(())
}

fn handle_price(args: PriceArgs) -> Result<(), AppError> {
    let config = brief_config_from_args(&args.synth, args.window);
    let series = synthesizer(&config).generate_price_series(config.days)?;
    let window = series.last(args.window);

    println!("{}", crate::report::format_price_table(window));
    if args.plot {
        println!("{}", crate::plot::render_price_plot(window, args.width, args.height));
    }

    if let Some(path) = &args.export_csv {
        crate::io::write_price_csv(path, window)?;
    }
    Ok(())
}

fn handle_volatility(args: SynthArgs) -> Result<(), AppError> {
    let config = brief_config_from_args(&args, 0);
    let series = synthesizer(&config).generate_volatility_series(config.days)?;
    println!("{}", crate::report::format_volatility_table(&series));
    Ok(())
}

fn handle_drivers(args: DriversArgs) -> Result<(), AppError> {
    let config = brief_config_from_args(&args.synth, 0);
    let samples = synthesizer(&config).generate_correlation_sample(config.normal_samples, config.anomaly_samples)?;
    let stats = crate::analytics::driver_stats(&samples, !args.exclude_anomalies)?;
    println!("{}", crate::report::format_driver_table(&samples, &stats));
    Ok(())
}

fn handle_spark(args: SparkArgs) -> Result<(), AppError> {
    let kind = if args.area { SparkKind::Area } else { SparkKind::Line };
    let path = crate::geometry::compute_path(&args.values, args.width, args.height, kind)?;

    if args.json {
        let json = serde_json::to_string_pretty(&path)
            .map_err(|e| AppError::runtime(format!("Failed to serialize sparkline: {e}")))?;
        println!("{json}");
    } else {
        println!("stroke: {}", path.stroke_d());
        if let Some(area) = path.area_d() {
            println!("area:   {area}");
        }
        match path.peak {
            Some(peak) => println!("peak:   ({}, {})", peak.x, peak.y),
            None => println!("peak:   none"),
        }
        println!();
        print!("{}", crate::plot::render_sparkline(&args.values, args.cols, args.rows)?);
    }

    if let Some(file) = &args.svg {
        crate::io::write_sparkline_svg(file, &path, args.severity)?;
    }
    Ok(())
}

/// Load the brief named by `--from`, or synthesize one from the flags.
pub fn brief_from_args(args: &BriefArgs) -> Result<pipeline::Brief, AppError> {
    match &args.from {
        Some(path) => {
            let doc = crate::io::read_brief_json(path)?;
            log::info!(
                "loaded brief from {} (written by {} {})",
                path.display(),
                doc.tool,
                doc.version
            );
            Ok(doc.brief)
        }
        None => pipeline::build_brief(&brief_config_from_args(&args.synth, args.window)),
    }
}

fn synthesizer(config: &BriefConfig) -> SeriesSynthesizer {
    SeriesSynthesizer::with_params(config.seed, config.params.clone())
}

pub fn brief_config_from_args(args: &SynthArgs, window_hours: usize) -> BriefConfig {
    let mut config = BriefConfig {
        seed: args.seed,
        days: args.days,
        window_hours,
        normal_samples: args.normal_samples,
        anomaly_samples: args.anomaly_samples,
        ..BriefConfig::default()
    };
    config.params.start_date = args.start_date;
    config.params.price.base_price = args.base_price;
    config.params.price.anomaly_day = args.anomaly_day;
    config
}

/// Rewrite argv so `sm` defaults to `sm tui`.
///
/// Rules:
/// - `sm`                      -> `sm tui`
/// - `sm --seed 7 ...`         -> `sm tui --seed 7 ...`
/// - `sm --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "brief" | "price" | "volatility" | "drivers" | "spark" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(args(&["sm"])), args(&["sm", "tui"]));
        assert_eq!(
            rewrite_args(args(&["sm", "--seed", "7"])),
            args(&["sm", "tui", "--seed", "7"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(args(&["sm", "brief"])), args(&["sm", "brief"]));
        assert_eq!(rewrite_args(args(&["sm", "--help"])), args(&["sm", "--help"]));
        assert_eq!(rewrite_args(args(&["sm", "bogus"])), args(&["sm", "bogus"]));
    }

    #[test]
    fn config_carries_cli_overrides() {
        let cli = crate::cli::Cli::parse_from(["sm", "brief", "--base-price", "90", "--anomaly-day", "3"]);
        let Command::Brief(brief) = cli.command else {
            panic!("expected brief");
        };
        let config = brief_config_from_args(&brief.synth, brief.window);
        assert_eq!(config.window_hours, 72);
        assert_eq!(config.params.price.base_price, 90.0);
        assert_eq!(config.params.price.anomaly_day, Some(3));
        assert_eq!(config.spark_width, 200.0);
    }

    #[test]
    fn saved_brief_loads_in_place_of_synthesis() {
        let cli = crate::cli::Cli::parse_from(["sm", "brief", "--seed", "9", "--days", "5"]);
        let Command::Brief(mut args) = cli.command else {
            panic!("expected brief");
        };
        let built = brief_from_args(&args).unwrap();

        let path = std::env::temp_dir().join(format!("sm-from-{}.json", std::process::id()));
        crate::io::write_brief_json(&path, &built).unwrap();
        args.from = Some(path.clone());
        // Flags no longer matter once a saved brief is named.
        args.synth.seed = 1;
        let loaded = brief_from_args(&args);
        let _ = std::fs::remove_file(&path);

        let loaded = loaded.unwrap();
        assert_eq!(loaded.config, built.config);
        assert_eq!(loaded.config.seed, 9);
        assert_eq!(loaded.price.len(), 5 * 24);
        assert_eq!(loaded.price.anomaly_window, built.price.anomaly_window);
        assert_eq!(loaded.drivers.len(), built.drivers.len());
    }

    #[test]
    fn missing_saved_brief_is_an_input_error() {
        let cli = crate::cli::Cli::parse_from(["sm", "brief", "--from", "/nonexistent/sm-brief.json"]);
        let Command::Brief(args) = cli.command else {
            panic!("expected brief");
        };
        assert!(brief_from_args(&args).unwrap_err().is_input_error());
    }
}
