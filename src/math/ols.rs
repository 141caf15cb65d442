//! Least squares line fitting.
//!
//! The driver panel regresses price on residual load:
//!
//! ```text
//! minimize Σ (price_i - (β0 + β1 · load_i))^2
//! ```
//!
//! The design matrix is tall (one row per sample, two columns), so we solve it
//! with SVD rather than a square solver.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = intercept + slope * x`. Returns `(intercept, slope)`.
///
/// `None` when fewer than two points are given, lengths differ, or `x` has no spread.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let first = xs[0];
    if xs.iter().all(|&x| (x - first).abs() < 1e-12) {
        return None;
    }

    // Center x so the two columns stay well conditioned for loads in the thousands.
    let x_mean = xs.iter().sum::<f64>() / xs.len() as f64;
    let design = DMatrix::from_fn(xs.len(), 2, |r, c| if c == 0 { 1.0 } else { xs[r] - x_mean });
    let target = DVector::from_column_slice(ys);

    let beta = solve_least_squares(&design, &target)?;
    let slope = beta[1];
    let intercept = beta[0] - slope * x_mean;
    Some((intercept, slope))
}
