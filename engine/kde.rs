//! Kernel-density-based threshold location for the empirical path.
//!
//! The measurement threshold for a decision probability p_t is the root of
//! the KDE posterior minus p_t. Two graceful fallbacks cover degenerate
//! data: a pooled-percentile threshold when a KDE cannot be built
//! (zero-variance group), and a dense-grid nearest match when the posterior
//! never crosses p_t inside the search interval.

use ndarray::ArrayView1;

use crate::stats;

const BISECT_MAX_ITER: usize = 100;
const BISECT_EPSILON: f64 = 1e-8;
const GRID_POINTS: usize = 1000;

/// Gaussian kernel density estimate with Scott's bandwidth factor.
pub struct GaussianKde {
    points: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// Returns `None` when the sample cannot support a density estimate
    /// (fewer than two points, or zero variance).
    pub fn new(sample: ArrayView1<f64>) -> Option<Self> {
        if sample.len() < 2 {
            return None;
        }
        let sd = stats::sample_variance(sample).sqrt();
        if !(sd > 0.0) {
            return None;
        }
        let n = sample.len() as f64;
        Some(GaussianKde {
            points: sample.to_vec(),
            bandwidth: sd * n.powf(-0.2),
        })
    }

    pub fn density(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = self.points.len() as f64 * h * (2.0 * std::f64::consts::PI).sqrt();
        let sum: f64 = self
            .points
            .iter()
            .map(|&p| (-0.5 * ((x - p) / h).powi(2)).exp())
            .sum();
        sum / norm
    }
}

fn kde_posterior(kde1: &GaussianKde, kde2: &GaussianKde, base_rate: f64, t: f64) -> f64 {
    let f1 = kde1.density(t);
    let f2 = kde2.density(t);
    let numerator = f2 * base_rate;
    let denominator = f1 * (1.0 - base_rate) + numerator;
    if denominator < 1e-15 { 0.5 } else { numerator / denominator }
}

/// Locate the measurement threshold whose KDE posterior equals `pt`.
pub fn threshold_from_pt_kde(
    group1: ArrayView1<f64>,
    group2: ArrayView1<f64>,
    base_rate: f64,
    pt: f64,
) -> f64 {
    let (kde1, kde2) = match (GaussianKde::new(group1), GaussianKde::new(group2)) {
        (Some(k1), Some(k2)) => (k1, k2),
        _ => {
            log::warn!("density estimate is singular; falling back to a pooled percentile threshold");
            let pooled: Vec<f64> = group1.iter().chain(group2.iter()).copied().collect();
            return stats::percentile(ArrayView1::from(pooled.as_slice()), 100.0 * (1.0 - pt));
        }
    };

    let pooled: Vec<f64> = group1.iter().chain(group2.iter()).copied().collect();
    let spread = stats::population_std(ArrayView1::from(pooled.as_slice()));
    let t_min = pooled.iter().copied().fold(f64::INFINITY, f64::min) - 2.0 * spread;
    let t_max = pooled.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 2.0 * spread;

    let objective = |t: f64| kde_posterior(&kde1, &kde2, base_rate, t) - pt;

    let f_lo = objective(t_min);
    let f_hi = objective(t_max);
    if f_lo * f_hi > 0.0 {
        log::warn!("posterior never crosses the requested probability; using nearest grid match");
        let step = (t_max - t_min) / (GRID_POINTS as f64 - 1.0);
        let mut best_t = t_min;
        let mut best_gap = f64::INFINITY;
        for i in 0..GRID_POINTS {
            let t = t_min + step * i as f64;
            let gap = objective(t).abs();
            if gap < best_gap {
                best_gap = gap;
                best_t = t;
            }
        }
        return best_t;
    }

    let (mut lo, mut hi) = (t_min, t_max);
    let mut f_lo = f_lo;
    for _ in 0..BISECT_MAX_ITER {
        let mid = 0.5 * (lo + hi);
        let f_mid = objective(mid);
        if f_mid.abs() < BISECT_EPSILON {
            return mid;
        }
        if f_mid * f_lo > 0.0 {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
        if hi - lo < BISECT_EPSILON {
            break;
        }
    }
    0.5 * (lo + hi)
}
