//! The confusion-matrix metric engine.
//!
//! Everything downstream of (sensitivity, specificity, base rate, p_t) is
//! derived in one place, [`metrics_from_rates`], so the analytic and
//! empirical front-ends cannot drift apart. The zero-denominator
//! conventions here are load-bearing for reproducibility; they are
//! deliberate definitions, not defensive fallbacks, and are exercised by
//! tests.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::dist::normal_cdf;
use crate::threshold::pt_from_threshold;

/// The full battery of threshold-dependent classification metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdMetrics {
    pub sensitivity: f64,
    pub specificity: f64,
    pub ppv: f64,
    pub npv: f64,
    pub accuracy: f64,
    pub balanced_accuracy: f64,
    pub f1: f64,
    pub mcc: f64,
    pub lr_plus: f64,
    pub lr_minus: f64,
    pub dor: f64,
    pub youden_j: f64,
    pub g_mean: f64,
    pub kappa_statistic: f64,
    pub post_test_prob_plus: f64,
    pub post_test_prob_minus: f64,
    pub delta_nb: f64,
}

fn probability_from_odds(odds: f64) -> f64 {
    if odds.is_infinite() { 1.0 } else { odds / (1.0 + odds) }
}

/// Derive the metric battery from classification rates.
///
/// Conventions for degenerate denominators:
/// - PPV is 1 when sensitivity is 0 or its denominator is non-positive;
///   NPV is 1 when its denominator is non-positive.
/// - F1 and MCC are 0 when their denominators vanish.
/// - LR+ is infinite at perfect specificity, LR- at zero specificity; the
///   diagnostic odds ratio is infinite unless both LRs are finite and
///   LR- is positive.
/// - The Cohen's kappa *statistic* (agreement beyond chance, distinct from
///   the label-reliability kappa parameter) is defined as 0 when chance
///   agreement reaches 1.
/// - Post-test probabilities are 1 at infinite post-test odds.
/// - Net benefit uses odds(p_t); at p_t -> 1 the model net benefit is 0 and
///   treat-all is negative infinity.
pub fn metrics_from_rates(
    sensitivity: f64,
    specificity: f64,
    base_rate: f64,
    pt: f64,
) -> ThresholdMetrics {
    let ppv = if sensitivity == 0.0 {
        1.0
    } else {
        let numerator = sensitivity * base_rate;
        let denominator = numerator + (1.0 - specificity) * (1.0 - base_rate);
        if denominator > 0.0 { numerator / denominator } else { 1.0 }
    };

    let npv = {
        let numerator = specificity * (1.0 - base_rate);
        let denominator = numerator + (1.0 - sensitivity) * base_rate;
        if denominator > 0.0 { numerator / denominator } else { 1.0 }
    };

    let accuracy = sensitivity * base_rate + specificity * (1.0 - base_rate);
    let balanced_accuracy = 0.5 * (sensitivity + specificity);

    let f1 = if ppv + sensitivity > 0.0 {
        2.0 * ppv * sensitivity / (ppv + sensitivity)
    } else {
        0.0
    };

    // Prevalence-weighted cell rates, not raw counts.
    let tp = sensitivity * base_rate;
    let tn = specificity * (1.0 - base_rate);
    let fp = (1.0 - specificity) * (1.0 - base_rate);
    let fn_ = (1.0 - sensitivity) * base_rate;

    let mcc_denom = ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();
    let mcc = if mcc_denom > 0.0 { (tp * tn - fp * fn_) / mcc_denom } else { 0.0 };

    let lr_plus = if specificity < 1.0 {
        sensitivity / (1.0 - specificity)
    } else {
        f64::INFINITY
    };
    let lr_minus = if specificity > 0.0 {
        (1.0 - sensitivity) / specificity
    } else {
        f64::INFINITY
    };
    let dor = if lr_plus.is_finite() && lr_minus.is_finite() && lr_minus > 0.0 {
        lr_plus / lr_minus
    } else {
        f64::INFINITY
    };

    let youden_j = sensitivity + specificity - 1.0;
    let g_mean = (sensitivity * specificity).sqrt();

    let predicted_positive = tp + fp;
    let chance_agreement =
        base_rate * predicted_positive + (1.0 - base_rate) * (1.0 - predicted_positive);
    let kappa_statistic = if chance_agreement < 1.0 {
        (accuracy - chance_agreement) / (1.0 - chance_agreement)
    } else {
        0.0
    };

    let pre_test_odds = base_rate / (1.0 - base_rate);
    let post_test_prob_plus = probability_from_odds(pre_test_odds * lr_plus);
    let post_test_prob_minus = probability_from_odds(pre_test_odds * lr_minus);

    let odds_pt = if pt < 1.0 { pt / (1.0 - pt) } else { f64::INFINITY };
    let (nb_model, nb_treat_all) = if odds_pt.is_finite() {
        (
            sensitivity * base_rate - (1.0 - specificity) * (1.0 - base_rate) * odds_pt,
            base_rate - (1.0 - base_rate) * odds_pt,
        )
    } else {
        (0.0, f64::NEG_INFINITY)
    };
    let nb_treat_none = 0.0;
    let delta_nb = nb_model - nb_treat_all.max(nb_treat_none);

    ThresholdMetrics {
        sensitivity,
        specificity,
        ppv,
        npv,
        accuracy,
        balanced_accuracy,
        f1,
        mcc,
        lr_plus,
        lr_minus,
        dor,
        youden_j,
        g_mean,
        kappa_statistic,
        post_test_prob_plus,
        post_test_prob_minus,
        delta_nb,
    }
}

/// Analytic battery: rates from the two Gaussian tails at a threshold, p_t
/// derived from the threshold through the forward Bayes map.
pub fn threshold_metrics_parametric(
    cohens_d: f64,
    base_rate: f64,
    threshold: f64,
    sigma1: f64,
    sigma2: f64,
) -> ThresholdMetrics {
    let sensitivity = 1.0 - normal_cdf(threshold, cohens_d, sigma2);
    let specificity = normal_cdf(threshold, 0.0, sigma1);
    let pt = pt_from_threshold(cohens_d, threshold, base_rate, sigma1, sigma2);
    metrics_from_rates(sensitivity, specificity, base_rate, pt)
}

/// Empirical battery: rates from sample proportions, p_t supplied by the
/// caller (it is the decision threshold the caller asked for, not a
/// quantity re-derived from data).
pub fn threshold_metrics_empirical(
    group1: ArrayView1<f64>,
    group2: ArrayView1<f64>,
    threshold: f64,
    base_rate: f64,
    pt: f64,
) -> ThresholdMetrics {
    let n1 = group1.len() as f64;
    let n2 = group2.len() as f64;
    let sensitivity = group2.iter().filter(|&&v| v >= threshold).count() as f64 / n2;
    let specificity = group1.iter().filter(|&&v| v < threshold).count() as f64 / n1;
    metrics_from_rates(sensitivity, specificity, base_rate, pt)
}
