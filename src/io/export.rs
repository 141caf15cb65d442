//! Export hourly prices to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::TimePoint;
use crate::error::AppError;

/// Write hourly price points to a CSV file.
pub fn write_price_csv(path: &Path, points: &[TimePoint]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    // Header
    writeln!(out, "index,date,time,price_eur_mwh,baseline_eur_mwh,deviation,is_anomaly")
        .map_err(|e| AppError::invalid_input(format!("Failed to write export CSV header: {e}")))?;

    for p in points {
        writeln!(
            out,
            "{},{},{},{:.1},{:.4},{:.4},{}",
            p.index,
            p.date,
            p.time,
            p.value,
            p.baseline,
            p.deviation(),
            p.is_anomaly,
        )
        .map_err(|e| AppError::invalid_input(format!("Failed to write export CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::invalid_input(format!("Failed to flush export CSV: {e}")))?;

    log::info!("wrote {} price rows to {}", points.len(), path.display());
    Ok(())
}
