//! Duality between a measurement-scale threshold and a decision threshold
//! probability p_t, related through Bayes' rule on the two group densities.
//!
//! The forward direction is a closed form; the inverse is solved by
//! bisection with fixed iteration and tolerance ceilings, returning the
//! bracketing midpoint on exhaustion rather than failing.

use serde::{Deserialize, Serialize};

use crate::dist::normal_pdf;
use crate::error::{DomainError, check_base_rate};
use crate::metrics::threshold_metrics_parametric;

const BISECT_MAX_ITER: usize = 100;
const BISECT_EPSILON: f64 = 1e-8;

/// Objective maximized by [`find_optimal_threshold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizeMetric {
    Youden,
    F1,
}

fn search_bounds(cohens_d: f64, sigma1: f64, sigma2: f64) -> (f64, f64) {
    let sigma_max = sigma1.max(sigma2);
    (-8.0 * sigma_max, 8.0 * sigma_max + cohens_d)
}

/// Posterior probability of the positive class at a measurement threshold:
///
/// ```text
/// p_t = pdf_case(t) * base_rate
///       / (pdf_ctrl(t) * (1 - base_rate) + pdf_case(t) * base_rate)
/// ```
///
/// Returns 0.5 where both densities vanish.
pub fn pt_from_threshold(
    cohens_d: f64,
    threshold: f64,
    base_rate: f64,
    sigma1: f64,
    sigma2: f64,
) -> f64 {
    let pdf_ctrl = normal_pdf(threshold, 0.0, sigma1);
    let pdf_case = normal_pdf(threshold, cohens_d, sigma2);

    let numerator = pdf_case * base_rate;
    let denominator = pdf_ctrl * (1.0 - base_rate) + numerator;

    if denominator == 0.0 {
        return 0.5;
    }
    numerator / denominator
}

/// Measurement threshold whose posterior equals the target p_t.
///
/// Bisection over `[-8 * max(sigma), 8 * max(sigma) + d]`, at most 100
/// iterations, stopping when the posterior is within 1e-8 of the target or
/// the interval narrows below 1e-8. Exhaustion degrades gracefully to the
/// interval midpoint.
pub fn threshold_from_pt(
    cohens_d: f64,
    pt: f64,
    base_rate: f64,
    sigma1: f64,
    sigma2: f64,
) -> f64 {
    let (mut left, mut right) = search_bounds(cohens_d, sigma1, sigma2);

    for _ in 0..BISECT_MAX_ITER {
        let mid = 0.5 * (left + right);
        let pt_mid = pt_from_threshold(cohens_d, mid, base_rate, sigma1, sigma2);

        if (pt_mid - pt).abs() < BISECT_EPSILON {
            return mid;
        }
        if pt_mid < pt {
            left = mid;
        } else {
            right = mid;
        }
        if right - left < BISECT_EPSILON {
            break;
        }
    }
    0.5 * (left + right)
}

/// Golden-section minimization over a bounded interval.
///
/// Deterministic, derivative-free, and bounded: the interval contracts by
/// the inverse golden ratio each step until it is narrower than `tol` or
/// the iteration ceiling is hit.
pub(crate) fn minimize_scalar_bounded<F: Fn(f64) -> f64>(
    objective: F,
    mut lo: f64,
    mut hi: f64,
    tol: f64,
    max_iter: usize,
) -> f64 {
    const INV_PHI: f64 = 0.618_033_988_749_894_8;

    let mut c = hi - INV_PHI * (hi - lo);
    let mut d = lo + INV_PHI * (hi - lo);
    let mut fc = objective(c);
    let mut fd = objective(d);

    for _ in 0..max_iter {
        if hi - lo <= tol {
            break;
        }
        if fc < fd {
            hi = d;
            d = c;
            fd = fc;
            c = hi - INV_PHI * (hi - lo);
            fc = objective(c);
        } else {
            lo = c;
            c = d;
            fc = fd;
            d = lo + INV_PHI * (hi - lo);
            fd = objective(d);
        }
    }
    0.5 * (lo + hi)
}

/// Threshold maximizing Youden's J or F1 over the standard search bounds.
pub fn find_optimal_threshold(
    cohens_d: f64,
    base_rate: f64,
    sigma1: f64,
    sigma2: f64,
    metric: OptimizeMetric,
) -> Result<f64, DomainError> {
    check_base_rate(base_rate)?;

    let (lo, hi) = search_bounds(cohens_d, sigma1, sigma2);
    let objective = |t: f64| {
        let m = threshold_metrics_parametric(cohens_d, base_rate, t, sigma1, sigma2);
        match metric {
            OptimizeMetric::Youden => -m.youden_j,
            OptimizeMetric::F1 => -m.f1,
        }
    };
    Ok(minimize_scalar_bounded(objective, lo, hi, 1e-7, 200))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn forward_and_inverse_agree() {
        let (d, base_rate) = (0.8, 0.1);
        for pt in [0.05, 0.2, 0.5, 0.8, 0.95] {
            let t = threshold_from_pt(d, pt, base_rate, 1.0, 1.0);
            let recovered = pt_from_threshold(d, t, base_rate, 1.0, 1.0);
            assert_abs_diff_eq!(recovered, pt, epsilon = 1e-6);
        }
    }

    #[test]
    fn posterior_is_half_where_densities_vanish() {
        // 60 scale units out, both Gaussian densities underflow to zero.
        assert_abs_diff_eq!(pt_from_threshold(0.8, 60.0, 0.1, 1.0, 1.0), 0.5);
    }

    #[test]
    fn posterior_rises_with_the_threshold_for_positive_d() {
        let mut prev = 0.0;
        let mut t = -4.0;
        while t <= 4.0 {
            let pt = pt_from_threshold(0.8, t, 0.3, 1.0, 1.0);
            assert!(pt >= prev);
            prev = pt;
            t += 0.25;
        }
    }

    #[test]
    fn golden_section_finds_a_parabola_minimum() {
        let min = minimize_scalar_bounded(|x| (x - 1.7).powi(2), -5.0, 5.0, 1e-9, 200);
        assert_abs_diff_eq!(min, 1.7, epsilon = 1e-6);
    }

    #[test]
    fn optimizer_is_locally_optimal() {
        let (d, base_rate) = (0.8, 0.1);
        for metric in [OptimizeMetric::Youden, OptimizeMetric::F1] {
            let t_star = find_optimal_threshold(d, base_rate, 1.0, 1.0, metric).unwrap();
            let value = |t: f64| {
                let m = threshold_metrics_parametric(d, base_rate, t, 1.0, 1.0);
                match metric {
                    OptimizeMetric::Youden => m.youden_j,
                    OptimizeMetric::F1 => m.f1,
                }
            };
            let at_star = value(t_star);
            assert!(at_star >= value(t_star - 0.1) - 1e-6);
            assert!(at_star >= value(t_star + 0.1) - 1e-6);
        }
    }

    #[test]
    fn optimizer_validates_base_rate() {
        assert!(matches!(
            find_optimal_threshold(0.8, 0.0, 1.0, 1.0, OptimizeMetric::Youden),
            Err(DomainError::BaseRate(_))
        ));
    }

    #[test]
    fn youden_optimum_for_equal_variances_sits_between_the_means() {
        // With unit variances and balanced prevalence, J is maximized where
        // the densities cross, i.e. at d/2.
        let t = find_optimal_threshold(0.8, 0.5, 1.0, 1.0, OptimizeMetric::Youden).unwrap();
        assert_abs_diff_eq!(t, 0.4, epsilon = 1e-3);
    }
}
