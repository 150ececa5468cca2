//! Analytic discrimination metrics for two Gaussian populations,
//! controls ~ N(0, sigma1) and cases ~ N(d, sigma2).

use ndarray::Array1;

use crate::dist::{normal_cdf, phi};

/// Number of threshold points for the PR-AUC integration grid.
const PR_GRID_POINTS: usize = 500;

/// Closed-form ROC-AUC: `Φ(d_att / sqrt(2))` with
/// `d_att = d * sqrt(2) / sqrt(sigma1^2 + sigma2^2)`.
pub fn roc_auc_parametric(cohens_d: f64, sigma1: f64, sigma2: f64) -> f64 {
    let d_att = cohens_d * 2.0_f64.sqrt() / (sigma1 * sigma1 + sigma2 * sigma2).sqrt();
    phi(d_att / 2.0_f64.sqrt())
}

/// PR-AUC by trapezoidal integration of precision over recall.
///
/// Thresholds span six scale units beyond both population means; precision
/// falls back to 1 where both tail probabilities vanish. Boundary points
/// (recall 0, precision 1) and (recall 1, precision = base rate) anchor the
/// curve, duplicate recalls keep their first precision, and the area is
/// clipped into [0, 1]. A degenerate base rate short-circuits to 0 or 1.
pub fn pr_auc_parametric(cohens_d: f64, base_rate: f64, sigma1: f64, sigma2: f64) -> f64 {
    if base_rate <= 0.0 {
        return 0.0;
    }
    if base_rate >= 1.0 {
        return 1.0;
    }

    let sigma_max = sigma1.max(sigma2);
    let min_thresh = cohens_d.min(0.0) - 6.0 * sigma_max;
    let max_thresh = cohens_d.max(0.0) + 6.0 * sigma_max;
    let thresholds = Array1::linspace(max_thresh, min_thresh, PR_GRID_POINTS);

    let mut points: Vec<(f64, f64)> = Vec::with_capacity(PR_GRID_POINTS + 2);
    points.push((0.0, 1.0));
    for &t in thresholds.iter() {
        let recall = 1.0 - normal_cdf(t, cohens_d, sigma2);
        let fpr = 1.0 - normal_cdf(t, 0.0, sigma1);

        let numerator = base_rate * recall;
        let denominator = numerator + (1.0 - base_rate) * fpr;
        let precision = if denominator < 1e-9 { 1.0 } else { numerator / denominator };

        points.push((recall, precision));
    }
    points.push((1.0, base_rate));

    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points.dedup_by(|a, b| a.0 == b.0);

    let mut area = 0.0;
    for pair in points.windows(2) {
        let delta_recall = pair[1].0 - pair[0].0;
        let avg_precision = 0.5 * (pair[1].1 + pair[0].1);
        area += delta_recall * avg_precision;
    }
    area.clamp(0.0, 1.0)
}
