//! Small numeric helpers: least-squares trend lines, moments, correlation

use serde::{Deserialize, Serialize};

/// Straight line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares fit of `values` against their positions `0..n`.
///
/// Returns `None` for an empty series. A single point or a degenerate
/// x-variance yields a flat line through the mean.
pub fn fit_index_trend(values: &[f64]) -> Option<LinearTrend> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values)?;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }

    let slope = if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    };
    Some(LinearTrend {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Pearson correlation; `0.0` when either series has zero variance
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.is_empty() {
        return None;
    }
    let x_mean = mean(xs)?;
    let y_mean = mean(ys)?;

    let mut cov = 0.0;
    let mut x_var = 0.0;
    let mut y_var = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        cov += dx * dy;
        x_var += dx * dx;
        y_var += dy * dy;
    }

    if x_var == 0.0 || y_var == 0.0 {
        return Some(0.0);
    }
    Some((cov / (x_var.sqrt() * y_var.sqrt())).clamp(-1.0, 1.0))
}
