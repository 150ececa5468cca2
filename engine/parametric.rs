//! Parametric entry points: the full metric battery from an effect size
//! alone, assuming idealized Gaussian populations. Point estimates only.

use serde::{Deserialize, Serialize};

use crate::convert::{
    d_to_cohens_u3, d_to_log_odds_ratio, d_to_odds_ratio, d_to_point_biserial_r, r_to_d,
};
use crate::discrimination::{pr_auc_parametric, roc_auc_parametric};
use crate::error::{
    DomainError, check_base_rate, check_threshold_prob, check_unit_half_open,
};
use crate::metrics::threshold_metrics_parametric;
use crate::reliability::{attenuate_d, sigma_from_icc};
use crate::threshold::threshold_from_pt;
use crate::types::ParametricResults;

/// Whether metrics describe the latent ("true") populations or the
/// observed ones after reliability attenuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    True,
    Observed,
}

/// Inputs for a parametric binary-outcome analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParametricBinaryConfig {
    /// True (latent) Cohen's d between cases and controls.
    pub cohens_d: f64,
    /// Real-world prevalence of the positive class.
    pub base_rate: f64,
    /// Decision threshold probability p_t.
    pub threshold_prob: f64,
    /// Measurement reliability (ICC) of the predictor among controls.
    pub icc1: f64,
    /// Measurement reliability (ICC) of the predictor among cases.
    pub icc2: f64,
    /// Diagnostic/label reliability.
    pub kappa: f64,
    pub view: View,
}

impl ParametricBinaryConfig {
    /// Defaults: p_t 0.5, perfect reliabilities, observed view.
    pub fn new(cohens_d: f64, base_rate: f64) -> Self {
        ParametricBinaryConfig {
            cohens_d,
            base_rate,
            threshold_prob: 0.5,
            icc1: 1.0,
            icc2: 1.0,
            kappa: 1.0,
            view: View::Observed,
        }
    }
}

/// Inputs for a parametric continuous-outcome analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParametricContinuousConfig {
    /// True Pearson correlation between predictor and outcome.
    pub pearson_r: f64,
    /// Share of the population counted as cases after dichotomizing.
    pub base_rate: f64,
    pub threshold_prob: f64,
    pub reliability_x: f64,
    pub reliability_y: f64,
    pub view: View,
}

impl ParametricContinuousConfig {
    pub fn new(pearson_r: f64, base_rate: f64) -> Self {
        ParametricContinuousConfig {
            pearson_r,
            base_rate,
            threshold_prob: 0.5,
            reliability_x: 1.0,
            reliability_y: 1.0,
            view: View::Observed,
        }
    }
}

fn assemble(
    cohens_d_true: f64,
    cohens_d_observed: f64,
    d_eff: f64,
    sigma1: f64,
    sigma2: f64,
    base_rate: f64,
    threshold_prob: f64,
    icc1: f64,
    icc2: f64,
    kappa: f64,
) -> Result<ParametricResults, DomainError> {
    let threshold_value = threshold_from_pt(d_eff, threshold_prob, base_rate, sigma1, sigma2);
    let threshold_metrics =
        threshold_metrics_parametric(d_eff, base_rate, threshold_value, sigma1, sigma2);

    let point_biserial_r = d_to_point_biserial_r(d_eff, base_rate)?;

    Ok(ParametricResults {
        cohens_d_true,
        cohens_d_observed,
        base_rate,
        threshold_prob,
        icc1,
        icc2,
        kappa,
        odds_ratio: d_to_odds_ratio(d_eff),
        log_odds_ratio: d_to_log_odds_ratio(d_eff),
        cohens_u3: d_to_cohens_u3(d_eff),
        point_biserial_r,
        eta_squared: point_biserial_r * point_biserial_r,
        roc_auc: roc_auc_parametric(d_eff, sigma1, sigma2),
        pr_auc: pr_auc_parametric(d_eff, base_rate, sigma1, sigma2),
        threshold_value,
        threshold_metrics,
    })
}

/// Metric battery from Cohen's d for a binary outcome.
///
/// The observed view attenuates d by the label reliability and inflates
/// each group's standard deviation by its measurement reliability; the
/// true view uses the latent d with unit variances.
pub fn parametric_binary(
    config: &ParametricBinaryConfig,
) -> Result<ParametricResults, DomainError> {
    check_base_rate(config.base_rate)?;
    check_threshold_prob(config.threshold_prob)?;
    check_unit_half_open(config.icc1, DomainError::Icc)?;
    check_unit_half_open(config.icc2, DomainError::Icc)?;
    check_unit_half_open(config.kappa, DomainError::Kappa)?;

    let d_observed = attenuate_d(config.cohens_d, config.kappa);
    let (d_eff, sigma1, sigma2) = match config.view {
        View::True => (config.cohens_d, 1.0, 1.0),
        View::Observed => (
            d_observed,
            sigma_from_icc(config.icc1)?,
            sigma_from_icc(config.icc2)?,
        ),
    };

    assemble(
        config.cohens_d,
        d_observed,
        d_eff,
        sigma1,
        sigma2,
        config.base_rate,
        config.threshold_prob,
        config.icc1,
        config.icc2,
        config.kappa,
    )
}

/// Metric battery from Pearson's r for a dichotomized continuous outcome.
///
/// The observed view attenuates the correlation as
/// `r_obs = r * sqrt(rel_x * rel_y)` — a simplifying approximation, kept
/// distinct from the binary kappa/ICC model on purpose — and the implied
/// separation carries unit variances on both sides.
pub fn parametric_continuous(
    config: &ParametricContinuousConfig,
) -> Result<ParametricResults, DomainError> {
    if !(config.pearson_r > -1.0 && config.pearson_r < 1.0) {
        return Err(DomainError::PearsonR(config.pearson_r));
    }
    check_base_rate(config.base_rate)?;
    check_threshold_prob(config.threshold_prob)?;
    check_unit_half_open(config.reliability_x, DomainError::Reliability)?;
    check_unit_half_open(config.reliability_y, DomainError::Reliability)?;

    let r_observed =
        config.pearson_r * (config.reliability_x * config.reliability_y).sqrt();
    let r_eff = match config.view {
        View::True => config.pearson_r,
        View::Observed => r_observed,
    };

    assemble(
        r_to_d(config.pearson_r),
        r_to_d(r_observed),
        r_to_d(r_eff),
        1.0,
        1.0,
        config.base_rate,
        config.threshold_prob,
        config.reliability_x,
        config.reliability_y,
        1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::pt_from_threshold;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn classic_benchmark_for_d_of_0_8() {
        let results =
            parametric_binary(&ParametricBinaryConfig::new(0.8, 0.1)).unwrap();
        assert_abs_diff_eq!(results.roc_auc, 0.714, epsilon = 0.01);
        assert_abs_diff_eq!(results.cohens_u3, 0.788, epsilon = 0.01);
        assert_abs_diff_eq!(results.odds_ratio, 4.27, epsilon = 0.02);
        assert_abs_diff_eq!(results.cohens_d_observed, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn threshold_value_inverts_to_the_requested_probability() {
        let config = ParametricBinaryConfig {
            threshold_prob: 0.3,
            ..ParametricBinaryConfig::new(0.8, 0.1)
        };
        let results = parametric_binary(&config).unwrap();
        let pt = pt_from_threshold(0.8, results.threshold_value, 0.1, 1.0, 1.0);
        assert_abs_diff_eq!(pt, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn perfect_reliability_makes_both_views_agree() {
        let base = ParametricBinaryConfig::new(0.8, 0.1);
        let observed = parametric_binary(&base).unwrap();
        let true_view =
            parametric_binary(&ParametricBinaryConfig { view: View::True, ..base }).unwrap();
        assert_eq!(observed, true_view);
    }

    #[test]
    fn imperfect_reliability_degrades_the_observed_view() {
        let base = ParametricBinaryConfig::new(0.8, 0.1);
        let ideal = parametric_binary(&base).unwrap();

        let noisy_measure = parametric_binary(&ParametricBinaryConfig {
            icc1: 0.6,
            icc2: 0.6,
            ..base
        })
        .unwrap();
        assert!(noisy_measure.roc_auc < ideal.roc_auc);

        let noisy_labels =
            parametric_binary(&ParametricBinaryConfig { kappa: 0.6, ..base }).unwrap();
        assert!(noisy_labels.cohens_d_observed < 0.8);
        assert!(noisy_labels.roc_auc < ideal.roc_auc);

        // The latent view ignores both.
        let latent = parametric_binary(&ParametricBinaryConfig {
            icc1: 0.6,
            icc2: 0.6,
            kappa: 0.6,
            view: View::True,
            ..base
        })
        .unwrap();
        assert_abs_diff_eq!(latent.roc_auc, ideal.roc_auc, epsilon = 1e-12);
    }

    #[test]
    fn continuous_mode_converts_r_through_d() {
        let results =
            parametric_continuous(&ParametricContinuousConfig::new(0.5, 0.1)).unwrap();
        let d_eff = 2.0 * 0.5 / (1.0 - 0.25_f64).sqrt();
        assert_relative_eq!(results.cohens_d_observed, d_eff, max_relative = 1e-12);
        assert_relative_eq!(
            results.roc_auc,
            crate::discrimination::roc_auc_parametric(d_eff, 1.0, 1.0),
            max_relative = 1e-12
        );
        assert_abs_diff_eq!(results.kappa, 1.0);
    }

    #[test]
    fn continuous_reliabilities_attenuate_multiplicatively() {
        let config = ParametricContinuousConfig {
            reliability_x: 0.8,
            reliability_y: 0.8,
            ..ParametricContinuousConfig::new(0.5, 0.1)
        };
        let results = parametric_continuous(&config).unwrap();
        // r_obs = 0.5 * sqrt(0.64) = 0.4
        assert_relative_eq!(results.cohens_d_observed, r_to_d(0.4), max_relative = 1e-12);
        assert_relative_eq!(results.cohens_d_true, r_to_d(0.5), max_relative = 1e-12);
    }

    #[test]
    fn every_domain_bound_is_enforced() {
        let ok = ParametricBinaryConfig::new(0.8, 0.1);
        for (config, expect_kind) in [
            (ParametricBinaryConfig { base_rate: 0.0, ..ok }, "base_rate"),
            (ParametricBinaryConfig { base_rate: 1.0, ..ok }, "base_rate"),
            (ParametricBinaryConfig { threshold_prob: 0.0, ..ok }, "threshold_prob"),
            (ParametricBinaryConfig { threshold_prob: 1.0, ..ok }, "threshold_prob"),
            (ParametricBinaryConfig { icc1: 0.0, ..ok }, "icc"),
            (ParametricBinaryConfig { icc2: 1.5, ..ok }, "icc"),
            (ParametricBinaryConfig { kappa: 0.0, ..ok }, "kappa"),
        ] {
            assert!(
                parametric_binary(&config).is_err(),
                "expected {expect_kind} bound to reject"
            );
        }

        let ok = ParametricContinuousConfig::new(0.5, 0.1);
        assert!(matches!(
            parametric_continuous(&ParametricContinuousConfig { pearson_r: 1.0, ..ok }),
            Err(DomainError::PearsonR(_))
        ));
        assert!(
            parametric_continuous(&ParametricContinuousConfig { reliability_x: 0.0, ..ok })
                .is_err()
        );
    }
}
