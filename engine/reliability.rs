//! Reliability attenuation formulas and the deterministic sample transforms
//! used to simulate data at a different measurement or label reliability.
//!
//! The transforms here are exact linear rescales and mean shifts. They are
//! NOT stochastic deconvolutions: no noise component is removed or injected,
//! so a "de-attenuated" sample shows what the same observations would look
//! like under the classical error model with the noise variance rescaled,
//! nothing more. This limitation holds everywhere the transforms are exposed.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::error::{DomainError, Error, InputError, check_unit_half_open};
use crate::stats;

/// Location parameter used to center data before rescaling deviations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Center {
    Mean,
    Median,
}

/// Observed Cohen's d from the true d under label reliability kappa:
/// `d_obs = d_true * sqrt(sin(pi/2 * kappa))`. Kappa of 1 is the identity.
pub fn attenuate_d(true_d: f64, kappa: f64) -> f64 {
    true_d * (FRAC_PI_2 * kappa).sin().sqrt()
}

/// Standard deviation of the observed distribution given measurement
/// reliability: `sigma_obs = 1 / sqrt(ICC)`, with the true sigma fixed at 1.
pub fn sigma_from_icc(icc: f64) -> Result<f64, DomainError> {
    check_unit_half_open(icc, DomainError::Icc)?;
    Ok(1.0 / icc.sqrt())
}

/// Rescale measurements to reflect a target reliability.
///
/// Under the classical decomposition `X_obs = X_true + E` with
/// `Rel = Var(X_true) / Var(X_obs)`, moving from `r_current` to `r_target`
/// scales total variance by `r_current / r_target` around a fixed location:
///
/// ```text
/// x_tgt = c + sqrt(r_current / r_target) * (x - c)
/// ```
///
/// A target above the current reliability shrinks deviations (less noise);
/// a target below inflates them. Equal reliabilities return the input
/// unchanged, bit for bit.
pub fn transform_for_target_reliability(
    x: ArrayView1<f64>,
    r_current: f64,
    r_target: f64,
    center: Center,
) -> Result<Array1<f64>, Error> {
    if !x.iter().all(|v| v.is_finite()) {
        return Err(InputError::NonFinite("x").into());
    }
    check_unit_half_open(r_current, DomainError::Reliability)?;
    check_unit_half_open(r_target, DomainError::Reliability)?;

    if r_current == r_target {
        return Ok(x.to_owned());
    }

    let c = match center {
        Center::Mean => stats::mean(x),
        Center::Median => stats::median(x),
    };
    let scale = (r_current / r_target).sqrt();
    Ok(x.mapv(|v| c + scale * (v - c)))
}

/// Shift two groups symmetrically so the between-group mean difference
/// reflects a target label reliability.
///
/// The separation scales by `sqrt(sin(pi/2 * kappa_target) / sin(pi/2 *
/// kappa_current))`; each group's within-group deviations are untouched and
/// the grand mean of the two group means is preserved.
pub fn transform_groups_for_target_kappa(
    group1: ArrayView1<f64>,
    group2: ArrayView1<f64>,
    kappa_current: f64,
    kappa_target: f64,
) -> Result<(Array1<f64>, Array1<f64>), Error> {
    if !group1.iter().all(|v| v.is_finite()) {
        return Err(InputError::NonFinite("group1").into());
    }
    if !group2.iter().all(|v| v.is_finite()) {
        return Err(InputError::NonFinite("group2").into());
    }
    check_unit_half_open(kappa_current, DomainError::Kappa)?;
    check_unit_half_open(kappa_target, DomainError::Kappa)?;

    let s_cur = (FRAC_PI_2 * kappa_current).sin();
    let s_tgt = (FRAC_PI_2 * kappa_target).sin();
    if s_cur <= 0.0 {
        return Err(DomainError::DegenerateKappa(kappa_current).into());
    }

    let scale = (s_tgt / s_cur).sqrt();
    if (scale - 1.0).abs() < 1e-12 {
        return Ok((group1.to_owned(), group2.to_owned()));
    }

    let delta = stats::mean(group2) - stats::mean(group1);
    let shift = 0.5 * (delta * scale - delta);
    Ok((group1.mapv(|v| v - shift), group2.mapv(|v| v + shift)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    #[test]
    fn perfect_reliability_is_a_no_op() {
        assert_abs_diff_eq!(attenuate_d(0.8, 1.0), 0.8, epsilon = 1e-14);
        assert_abs_diff_eq!(sigma_from_icc(1.0).unwrap(), 1.0);

        let x = array![0.3, -1.2, 4.5, 0.0];
        for r in [0.2, 0.6, 1.0] {
            let out = transform_for_target_reliability(x.view(), r, r, Center::Mean).unwrap();
            assert_eq!(out, x);
        }
        let (g1, g2) =
            transform_groups_for_target_kappa(x.view(), x.view(), 0.7, 0.7).unwrap();
        assert_eq!(g1, x);
        assert_eq!(g2, x);
    }

    #[test]
    fn attenuation_shrinks_positive_effects() {
        for kappa in [0.2, 0.5, 0.9] {
            assert!(attenuate_d(0.8, kappa) < 0.8);
            assert!(attenuate_d(0.8, kappa) > 0.0);
        }
    }

    #[test]
    fn sigma_grows_as_icc_falls() {
        assert_relative_eq!(sigma_from_icc(0.25).unwrap(), 2.0, max_relative = 1e-12);
        assert!(matches!(sigma_from_icc(0.0), Err(DomainError::Icc(_))));
        assert!(matches!(sigma_from_icc(1.5), Err(DomainError::Icc(_))));
    }

    #[test]
    fn reliability_transform_rescales_around_center() {
        let x = array![0.0, 2.0, 4.0];
        // Improving reliability 0.5 -> 1.0 shrinks deviations by sqrt(0.5).
        let out =
            transform_for_target_reliability(x.view(), 0.5, 1.0, Center::Mean).unwrap();
        let scale = 0.5_f64.sqrt();
        assert_relative_eq!(out[0], 2.0 - 2.0 * scale, max_relative = 1e-12);
        assert_relative_eq!(out[1], 2.0, max_relative = 1e-12);
        assert_relative_eq!(out[2], 2.0 + 2.0 * scale, max_relative = 1e-12);

        // Median centering uses the median as the fixed point.
        let skewed = array![0.0, 1.0, 10.0];
        let out =
            transform_for_target_reliability(skewed.view(), 0.5, 1.0, Center::Median).unwrap();
        assert_relative_eq!(out[1], 1.0, max_relative = 1e-12);
    }

    #[test]
    fn kappa_transform_scales_separation_and_preserves_grand_mean() {
        let g1 = array![0.0, 1.0];
        let g2 = array![2.0, 3.0];
        let (t1, t2) =
            transform_groups_for_target_kappa(g1.view(), g2.view(), 0.5, 1.0).unwrap();

        let scale = (1.0 / (FRAC_PI_2 * 0.5).sin()).sqrt();
        let new_delta = stats::mean(t2.view()) - stats::mean(t1.view());
        assert_relative_eq!(new_delta, 2.0 * scale, max_relative = 1e-12);

        let grand_before = 0.5 * (stats::mean(g1.view()) + stats::mean(g2.view()));
        let grand_after = 0.5 * (stats::mean(t1.view()) + stats::mean(t2.view()));
        assert_relative_eq!(grand_after, grand_before, max_relative = 1e-12);

        // Within-group deviations untouched.
        assert_relative_eq!(t1[1] - t1[0], 1.0, max_relative = 1e-12);
        assert_relative_eq!(t2[1] - t2[0], 1.0, max_relative = 1e-12);
    }

    #[test]
    fn transforms_reject_bad_inputs() {
        let x = array![1.0, f64::NAN];
        assert!(matches!(
            transform_for_target_reliability(x.view(), 0.5, 1.0, Center::Mean),
            Err(Error::Input(InputError::NonFinite(_)))
        ));

        let ok = array![1.0, 2.0];
        assert!(matches!(
            transform_for_target_reliability(ok.view(), 0.0, 1.0, Center::Mean),
            Err(Error::Domain(DomainError::Reliability(_)))
        ));
        assert!(matches!(
            transform_groups_for_target_kappa(ok.view(), ok.view(), 0.0, 1.0),
            Err(Error::Domain(DomainError::Kappa(_)))
        ));
    }
}
