//! Continuous-outcome analysis: a continuous predictor X and outcome Y are
//! reduced to a two-group comparison by dichotomizing Y at its
//! (1 - base_rate) percentile.
//!
//! The case/control assignment is computed once at construction and then
//! held fixed: reliability transforms of X re-use the original mask, so a
//! de-attenuation can never silently reshuffle who counts as a case.

use ndarray::{Array1, ArrayView1};

use crate::empirical::{BinaryStudy, BootstrapConfig};
use crate::error::{DomainError, Error, InputError, check_base_rate, check_threshold_prob};
use crate::metrics::ThresholdMetrics;
use crate::reliability::{Center, transform_for_target_reliability};
use crate::stats;
use crate::types::BinaryResults;

/// Paired continuous predictor/outcome data with a fixed dichotomization.
#[derive(Debug, Clone)]
pub struct ContinuousStudy {
    x: Array1<f64>,
    y_threshold: f64,
    is_case: Vec<bool>,
    base_rate: f64,
    threshold_prob: f64,
    config: BootstrapConfig,
}

impl ContinuousStudy {
    pub fn new(
        x: Array1<f64>,
        y: Array1<f64>,
        base_rate: f64,
        threshold_prob: f64,
        config: BootstrapConfig,
    ) -> Result<Self, Error> {
        if x.len() != y.len() {
            return Err(InputError::LengthMismatch { x_len: x.len(), y_len: y.len() }.into());
        }
        if x.is_empty() {
            return Err(InputError::EmptyGroup("x").into());
        }
        if !x.iter().all(|v| v.is_finite()) {
            return Err(InputError::NonFinite("x").into());
        }
        if !y.iter().all(|v| v.is_finite()) {
            return Err(InputError::NonFinite("y").into());
        }
        check_base_rate(base_rate)?;
        check_threshold_prob(threshold_prob)?;
        if !(config.ci_level > 0.0 && config.ci_level < 1.0) {
            return Err(DomainError::CiLevel(config.ci_level).into());
        }

        // The top base_rate share of the outcome becomes the case group.
        let y_threshold = stats::percentile(y.view(), 100.0 * (1.0 - base_rate));
        let is_case: Vec<bool> = y.iter().map(|&v| v >= y_threshold).collect();

        let n_cases = is_case.iter().filter(|&&c| c).count();
        if n_cases == 0 {
            return Err(InputError::DegenerateSplit("case").into());
        }
        if n_cases == is_case.len() {
            return Err(InputError::DegenerateSplit("control").into());
        }

        Ok(ContinuousStudy { x, y_threshold, is_case, base_rate, threshold_prob, config })
    }

    /// The outcome cutoff that defines the case group.
    pub fn y_threshold(&self) -> f64 {
        self.y_threshold
    }

    fn split(&self, x: ArrayView1<f64>) -> (Array1<f64>, Array1<f64>) {
        let mut controls = Vec::with_capacity(x.len());
        let mut cases = Vec::with_capacity(x.len());
        for (&value, &case) in x.iter().zip(&self.is_case) {
            if case {
                cases.push(value);
            } else {
                controls.push(value);
            }
        }
        (Array1::from_vec(controls), Array1::from_vec(cases))
    }

    fn study_over(&self, x: ArrayView1<f64>) -> BinaryStudy {
        let (group1, group2) = self.split(x);
        BinaryStudy::new(group1, group2, self.base_rate, self.threshold_prob, self.config)
            .expect("groups from a validated dichotomization are always valid")
    }

    /// The full metric battery with bootstrap confidence intervals.
    pub fn compute(&self) -> BinaryResults {
        self.study_over(self.x.view()).compute()
    }

    /// Threshold-dependent metrics at a different decision probability.
    pub fn compute_at_threshold(&self, threshold_prob: f64) -> Result<ThresholdMetrics, Error> {
        self.study_over(self.x.view()).compute_at_threshold(threshold_prob)
    }

    /// The full battery after rescaling X to a target reliability.
    ///
    /// Only X is transformed; the case/control mask derived from the
    /// original Y is preserved, so the outcome split cannot move. (For the
    /// same reason, transforming Y would be a no-op on every metric and is
    /// not offered.) Because a single affine map is applied to the whole
    /// predictor, scale-free metrics (d, AUC, rank statistics) are
    /// unchanged here — only the measurement-scale threshold moves. This
    /// differs from the two-group transform, which centers each group
    /// separately and therefore changes the standardized separation.
    pub fn compute_at_reliability(
        &self,
        r_current: f64,
        r_target: f64,
        center: Center,
    ) -> Result<BinaryResults, Error> {
        let x = transform_for_target_reliability(self.x.view(), r_current, r_target, center)?;
        Ok(self.study_over(x.view()).compute())
    }
}

/// Convenience entry point: dichotomize Y and compute the metric battery.
pub fn empirical_continuous(
    x: Array1<f64>,
    y: Array1<f64>,
    base_rate: f64,
    threshold_prob: f64,
    config: BootstrapConfig,
) -> Result<BinaryResults, Error> {
    Ok(ContinuousStudy::new(x, y, base_rate, threshold_prob, config)?.compute())
}

/// Convenience entry point: the battery after rescaling X to a target
/// reliability, with the outcome split held fixed.
pub fn empirical_continuous_deattenuated(
    x: Array1<f64>,
    y: Array1<f64>,
    base_rate: f64,
    threshold_prob: f64,
    r_current: f64,
    r_target: f64,
    center: Center,
    config: BootstrapConfig,
) -> Result<BinaryResults, Error> {
    ContinuousStudy::new(x, y, base_rate, threshold_prob, config)?
        .compute_at_reliability(r_current, r_target, center)
}
