//! Standalone SVG rendering of sparkline geometry.

use std::fmt::Write as _;
use std::path::Path;

use crate::domain::Severity;
use crate::error::AppError;
use crate::geometry::SparkPath;

/// Render a sparkline as an SVG document coloured by severity.
///
/// Draw order: area fill (if any), stroke, then a dot on the peak.
pub fn sparkline_svg(path: &SparkPath, severity: Severity) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" preserveAspectRatio="none">"#,
        w = path.width,
        h = path.height
    );
    if let Some(area) = path.area_d() {
        let _ = writeln!(out, r#"  <path d="{area}" fill="{}"/>"#, severity.fill());
    }
    let _ = writeln!(
        out,
        r#"  <path d="{}" fill="none" stroke="{}" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"/>"#,
        path.stroke_d(),
        severity.stroke()
    );
    if let Some(peak) = path.peak {
        let _ = writeln!(
            out,
            r#"  <circle cx="{}" cy="{}" r="3" fill="{}"/>"#,
            peak.x,
            peak.y,
            severity.stroke()
        );
    }
    out.push_str("</svg>\n");
    out
}

/// Write a sparkline SVG file.
pub fn write_sparkline_svg(file: &Path, path: &SparkPath, severity: Severity) -> Result<(), AppError> {
    std::fs::write(file, sparkline_svg(path, severity))
        .map_err(|e| AppError::invalid_input(format!("Failed to write SVG '{}': {e}", file.display())))?;
    log::info!("wrote sparkline SVG to {}", file.display());
    Ok(())
}
