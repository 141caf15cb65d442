//! Sparkline geometry: numeric sequence -> normalized stroke/area paths.
//!
//! The mapping is a plain linear min/max scale into a pixel box with the
//! origin at the top-left (SVG convention, y grows downwards). A small
//! vertical inset keeps the extremes off the box edges; it is capped at the
//! box height, so very short boxes collapse to a midline instead of flipping.
//!
//! Nothing here knows about a rendering surface; callers get point lists and
//! path commands (or an SVG `d` string) and draw them however they like.

use std::fmt::Write as _;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::SparkKind;
use crate::error::AppError;

/// Total vertical inset in pixels (half above the max, half below the min).
pub const SPARK_MARGIN_PX: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    Close,
}

/// Plot geometry for one sequence in one box. Never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparkPath {
    pub width: f64,
    pub height: f64,
    /// Scaled points in input order.
    pub points: Vec<Point>,
    pub stroke: Vec<PathCommand>,
    /// Stroke closed against the bottom edge; present for `SparkKind::Area`.
    pub area: Option<Vec<PathCommand>>,
    /// First occurrence of the maximum value; `None` for empty input.
    pub peak: Option<Point>,
}

impl SparkPath {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// SVG path data for the stroke, e.g. `M 0 44 L 50 4`.
    pub fn stroke_d(&self) -> String {
        path_d(&self.stroke)
    }

    pub fn area_d(&self) -> Option<String> {
        self.area.as_deref().map(path_d)
    }
}

/// Compute sparkline geometry with the standard inset.
pub fn compute_path(values: &[f64], width: f64, height: f64, kind: SparkKind) -> Result<SparkPath, AppError> {
    compute_path_with_margin(values, width, height, SPARK_MARGIN_PX, kind)
}

/// Compute sparkline geometry with an explicit total vertical inset.
pub fn compute_path_with_margin(
    values: &[f64],
    width: f64,
    height: f64,
    margin: f64,
    kind: SparkKind,
) -> Result<SparkPath, AppError> {
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return Err(AppError::invalid_input(format!(
            "Sparkline box must be positive and finite (got {width}x{height})."
        )));
    }
    if !(margin.is_finite() && margin >= 0.0) {
        return Err(AppError::invalid_input("Sparkline margin must be finite and >= 0."));
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(AppError::invalid_input(format!(
            "Sparkline value at index {i} is not finite."
        )));
    }

    let (min, max) = match crate::math::min_max(values) {
        Some(bounds) => bounds,
        None => {
            return Ok(SparkPath {
                width,
                height,
                points: Vec::new(),
                stroke: Vec::new(),
                area: (kind == SparkKind::Area).then(Vec::new),
                peak: None,
            });
        }
    };

    // Scaled in halves so spans beyond f64::MAX stay finite.
    let half_spread = max / 2.0 - min / 2.0;
    let range = if half_spread > 0.0 { half_spread } else { 1.0 };
    // An inset taller than the box would flip the plot.
    let margin = margin.min(height);
    let n = values.len();

    let points: Vec<Point> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = if n > 1 { i as f64 / (n - 1) as f64 * width } else { 0.0 };
            // A flat series sits on the vertical midpoint.
            let u = if half_spread > 0.0 { (v / 2.0 - min / 2.0) / range } else { 0.5 };
            let y = height - u * (height - margin) - margin / 2.0;
            Point { x, y }
        })
        .collect();

    let mut peak_index = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[peak_index] {
            peak_index = i;
        }
    }

    let stroke: Vec<PathCommand> = points
        .iter()
        .enumerate()
        .map(|(i, &p)| if i == 0 { PathCommand::MoveTo(p) } else { PathCommand::LineTo(p) })
        .collect();

    let area = (kind == SparkKind::Area).then(|| {
        let mut area = stroke.clone();
        area.push(PathCommand::LineTo(Point { x: width, y: height }));
        area.push(PathCommand::LineTo(Point { x: 0.0, y: height }));
        area.push(PathCommand::Close);
        area
    });

    Ok(SparkPath {
        width,
        height,
        peak: Some(points[peak_index]),
        points,
        stroke,
        area,
    })
}

/// Compute geometry for many sequences in parallel, all in the same box.
///
/// Results come back in input order.
pub fn compute_paths(
    jobs: &[(Vec<f64>, SparkKind)],
    width: f64,
    height: f64,
) -> Result<Vec<SparkPath>, AppError> {
    jobs.par_iter()
        .map(|(values, kind)| compute_path(values, width, height, *kind))
        .collect()
}

fn path_d(commands: &[PathCommand]) -> String {
    let mut out = String::new();
    for cmd in commands {
        if !out.is_empty() {
            out.push(' ');
        }
        // Writing to a String cannot fail.
        let _ = match cmd {
            PathCommand::MoveTo(p) => write!(out, "M {} {}", p.x, p.y),
            PathCommand::LineTo(p) => write!(out, "L {} {}", p.x, p.y),
            PathCommand::Close => write!(out, "Z"),
        };
    }
    out
}
