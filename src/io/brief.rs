//! Read/write brief JSON files.
//!
//! A brief file is the portable form of one run: the configuration it was
//! built from plus every computed series, statistic and card geometry.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::pipeline::Brief;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefFile {
    pub tool: String,
    pub version: String,
    pub brief: Brief,
}

/// Write a brief JSON file.
pub fn write_brief_json(path: &Path, brief: &Brief) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to create brief JSON '{}': {e}", path.display())))?;

    let doc = BriefFile {
        tool: "sm".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        brief: brief.clone(),
    };

    serde_json::to_writer_pretty(BufWriter::new(file), &doc)
        .map_err(|e| AppError::invalid_input(format!("Failed to write brief JSON: {e}")))?;

    log::info!("wrote brief JSON to {}", path.display());
    Ok(())
}

/// Read a brief JSON file.
pub fn read_brief_json(path: &Path) -> Result<BriefFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to open brief JSON '{}': {e}", path.display())))?;
    let doc: BriefFile = serde_json::from_reader(file)
        .map_err(|e| AppError::invalid_input(format!("Invalid brief JSON: {e}")))?;
    Ok(doc)
}
