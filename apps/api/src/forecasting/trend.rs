//! Trend Estimator — ordinary least squares over bucket position.

use serde::{Deserialize, Serialize};

/// Fitted line `value = slope * index + intercept`.
///
/// Coefficients are raw: extrapolated values can leave the 0–100 rate range,
/// and callers clamp at the point of use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendFit {
    /// Fits `(index, value)` pairs.
    ///
    /// # Panics
    /// When fewer than two distinct x values are supplied. Callers guarantee a
    /// minimum bucket count before fitting, so this never happens for valid input.
    pub fn fit(points: &[(f64, f64)]) -> Self {
        let n = points.len() as f64;
        let (sum_x, sum_y, sum_xy, sum_xx) = points.iter().fold(
            (0.0, 0.0, 0.0, 0.0),
            |(sx, sy, sxy, sxx), &(x, y)| (sx + x, sy + y, sxy + x * y, sxx + x * x),
        );

        let denominator = n * sum_xx - sum_x * sum_x;
        assert!(
            denominator.abs() > f64::EPSILON,
            "trend fit requires at least two distinct x values (got {} points)",
            points.len()
        );

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;

        Self { slope, intercept }
    }

    /// Fits a series using each value's 0-based position as x.
    pub fn fit_series(values: &[f64]) -> Self {
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect();
        Self::fit(&points)
    }

    /// Unclamped value of the fitted line at `index`.
    pub fn value_at(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }
}
