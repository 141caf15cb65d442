//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - sparkline: `.` segments, `o` samples, `*` peak
//! - price plot: `-` price, `.` baseline, `A` anomaly hours

use crate::domain::{SparkKind, TimePoint};
use crate::error::AppError;
use crate::geometry::compute_path_with_margin;

/// Render a sparkline into a `width` x `height` character grid.
///
/// Uses the same geometry as the pixel sparkline with no inset, so the
/// minimum lands on the bottom row and the maximum on the top row.
pub fn render_sparkline(values: &[f64], width: usize, height: usize) -> Result<String, AppError> {
    let width = width.max(2);
    let height = height.max(2);
    if values.is_empty() {
        return Ok("(no data)\n".to_string());
    }

    let path = compute_path_with_margin(
        values,
        (width - 1) as f64,
        (height - 1) as f64,
        0.0,
        SparkKind::Line,
    )?;

    let cells: Vec<(usize, usize)> = path
        .points
        .iter()
        .map(|p| (to_cell(p.x, width), to_cell(p.y, height)))
        .collect();

    let mut grid = vec![vec![' '; width]; height];
    for pair in cells.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        draw_line(&mut grid, x0, y0, x1, y1, '.');
    }
    for &(x, y) in &cells {
        grid[y][x] = 'o';
    }
    if let Some(peak) = path.peak {
        grid[to_cell(peak.y, height)][to_cell(peak.x, width)] = '*';
    }

    Ok(grid_to_string(grid))
}

/// Render hourly prices against their baseline, with anomaly hours marked.
pub fn render_price_plot(points: &[TimePoint], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (h_min, h_max) = match (points.first(), points.last()) {
        (Some(a), Some(b)) if b.index > a.index => (a.index as f64, b.index as f64),
        _ => (0.0, 1.0),
    };

    let (y_min, y_max) = y_range(points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Baseline first so the price line overlays it.
    let baseline: Vec<(f64, f64)> = points.iter().map(|p| (p.index as f64, p.baseline)).collect();
    draw_curve(&mut grid, &baseline, h_min, h_max, y_min, y_max, '.');
    let price: Vec<(f64, f64)> = points.iter().map(|p| (p.index as f64, p.value)).collect();
    draw_curve(&mut grid, &price, h_min, h_max, y_min, y_max, '-');

    for p in points.iter().filter(|p| p.is_anomaly) {
        let x = map_x(p.index as f64, h_min, h_max, width);
        let y = map_y(p.value, y_min, y_max, height);
        grid[y][x] = 'A';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: hours=[{h_min:.0}, {h_max:.0}] | price=[{y_min:.2}, {y_max:.2}] €/MWh\n"
    ));
    out.push_str(&grid_to_string(grid));
    out
}

fn to_cell(v: f64, len: usize) -> usize {
    (v.round().max(0.0) as usize).min(len - 1)
}

fn grid_to_string(grid: Vec<Vec<char>>) -> String {
    let mut out = String::new();
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn y_range(points: &[TimePoint]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in points {
        min_y = min_y.min(p.value).min(p.baseline);
        max_y = max_y.max(p.value).max(p.baseline);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    t_min: f64,
    t_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None => grid[yy][x] = ch,
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish). Only fills empty cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SeriesSynthesizer;

    #[test]
    fn sparkline_golden_snapshot_small() {
        let txt = render_sparkline(&[1.0, 5.0, 3.0], 5, 3).unwrap();
        let expected = concat!(
            "  *  \n",
            " . .o\n",
            "o    \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn flat_sparkline_sits_on_middle_row() {
        let txt = render_sparkline(&[2.0, 2.0, 2.0], 5, 3).unwrap();
        let rows: Vec<&str> = txt.lines().collect();
        assert_eq!(rows, vec!["     ", "*.o.o", "     "]);
    }

    #[test]
    fn empty_sparkline_renders_placeholder() {
        assert_eq!(render_sparkline(&[], 10, 4).unwrap(), "(no data)\n");
    }

    #[test]
    fn sparkline_rejects_non_finite_values() {
        assert!(render_sparkline(&[1.0, f64::NAN], 10, 4).is_err());
    }

    #[test]
    fn price_plot_marks_anomaly_hours() {
        let series = SeriesSynthesizer::from_seed(3).generate_price_series(3).unwrap();
        let txt = render_price_plot(series.last(24), 48, 12);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[0].starts_with("Plot: hours=[48, 71] | price=["));
        assert!(lines[1..].iter().all(|l| l.chars().count() == 48));
        assert!(txt.contains('A'));

        let quiet = render_price_plot(&series.points[..24], 48, 12);
        assert!(!quiet.contains('A'));
    }

    #[test]
    fn price_plot_handles_empty_input() {
        let txt = render_price_plot(&[], 10, 5);
        assert_eq!(txt.lines().count(), 6);
    }
}
