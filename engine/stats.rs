//! Small descriptive-statistics primitives used throughout the engine.

use ndarray::ArrayView1;

pub fn mean(x: ArrayView1<f64>) -> f64 {
    x.sum() / x.len() as f64
}

/// Sample variance with one delta degree of freedom. NaN for n < 2.
pub fn sample_variance(x: ArrayView1<f64>) -> f64 {
    let n = x.len() as f64;
    let m = mean(x);
    x.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0)
}

/// Population standard deviation (zero delta degrees of freedom).
pub fn population_std(x: ArrayView1<f64>) -> f64 {
    let n = x.len() as f64;
    let m = mean(x);
    (x.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n).sqrt()
}

pub fn median(x: ArrayView1<f64>) -> f64 {
    percentile(x, 50.0)
}

/// Linear-interpolation percentile (Type 7 in R), `q` in [0, 100].
pub fn percentile(x: ArrayView1<f64>, q: f64) -> f64 {
    let mut sorted = x.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    percentile_of_sorted(&sorted, q)
}

/// Type-7 percentile over an already ascending-sorted, non-empty slice.
pub fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    let float_idx = (n as f64 - 1.0) * q / 100.0;
    let lower_idx = float_idx.floor() as usize;
    let upper_idx = float_idx.ceil() as usize;

    if lower_idx == upper_idx {
        sorted[lower_idx]
    } else {
        let fraction = float_idx - lower_idx as f64;
        sorted[lower_idx] * (1.0 - fraction) + sorted[upper_idx] * fraction
    }
}

/// Pearson correlation between two equal-length sequences.
///
/// A zero-variance input yields NaN, matching the behavior of the usual
/// covariance formulation; callers treat non-finite values as degenerate.
pub fn pearson_r(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    sxy / (sxx * syy).sqrt()
}
