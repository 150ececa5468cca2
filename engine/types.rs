//! Fixed-schema result records.
//!
//! Every result kind is an explicit struct of named fields rather than a
//! dynamically keyed map, so downstream adapters (CLI JSON, plotting) get
//! compile-time field checking. Serialization at the boundary preserves the
//! field names verbatim with no implicit rounding.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics::ThresholdMetrics;

/// A point estimate with a bootstrap percentile confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricWithCi {
    pub estimate: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

impl MetricWithCi {
    /// A collapsed interval: estimate and both bounds coincide. Used when
    /// no finite bootstrap replicate survived.
    pub fn point(estimate: f64) -> Self {
        MetricWithCi { estimate, ci_lower: estimate, ci_upper: estimate }
    }
}

impl fmt::Display for MetricWithCi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4} [{:.4}, {:.4}]",
            self.estimate, self.ci_lower, self.ci_upper
        )
    }
}

/// ROC curve coordinates for plotting collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
}

/// Precision-recall curve coordinates for plotting collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrCurve {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub thresholds: Vec<f64>,
}

/// Results of an empirical (sample-based) analysis: every metric carries a
/// bootstrap confidence interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryResults {
    // Effect sizes
    pub cohens_d: MetricWithCi,
    pub cohens_u3: MetricWithCi,
    pub point_biserial_r: MetricWithCi,
    pub eta_squared: MetricWithCi,
    pub odds_ratio: MetricWithCi,
    pub log_odds_ratio: MetricWithCi,

    // Discrimination
    pub roc_auc: MetricWithCi,
    pub pr_auc: MetricWithCi,

    // Threshold-dependent metrics at the requested p_t
    pub threshold_value: f64,
    pub sensitivity: MetricWithCi,
    pub specificity: MetricWithCi,
    pub ppv: MetricWithCi,
    pub npv: MetricWithCi,
    pub accuracy: MetricWithCi,
    pub balanced_accuracy: MetricWithCi,
    pub f1: MetricWithCi,
    pub mcc: MetricWithCi,
    pub lr_plus: MetricWithCi,
    pub lr_minus: MetricWithCi,
    pub dor: MetricWithCi,
    pub youden_j: MetricWithCi,
    pub g_mean: MetricWithCi,
    pub kappa_statistic: MetricWithCi,
    pub post_test_prob_plus: MetricWithCi,
    pub post_test_prob_minus: MetricWithCi,
    pub delta_nb: MetricWithCi,

    // Curve coordinates
    pub roc_curve: RocCurve,
    pub pr_curve: PrCurve,

    // Sample descriptors
    pub n_group1: usize,
    pub n_group2: usize,
    pub base_rate: f64,
    pub threshold_prob: f64,
}

/// Results of a parametric analysis: point estimates only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParametricResults {
    // Inputs, echoed for provenance
    pub cohens_d_true: f64,
    pub cohens_d_observed: f64,
    pub base_rate: f64,
    pub threshold_prob: f64,
    pub icc1: f64,
    pub icc2: f64,
    pub kappa: f64,

    // Effect sizes for the effective d
    pub odds_ratio: f64,
    pub log_odds_ratio: f64,
    pub cohens_u3: f64,
    pub point_biserial_r: f64,
    pub eta_squared: f64,

    // Discrimination
    pub roc_auc: f64,
    pub pr_auc: f64,

    // Threshold-dependent battery
    pub threshold_value: f64,
    #[serde(flatten)]
    pub threshold_metrics: ThresholdMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_with_ci_displays_estimate_and_bounds() {
        let m = MetricWithCi { estimate: 0.71425, ci_lower: 0.7, ci_upper: 0.73 };
        assert_eq!(m.to_string(), "0.7142 [0.7000, 0.7300]");
    }

    #[test]
    fn point_interval_collapses() {
        let m = MetricWithCi::point(0.5);
        assert_eq!(m.ci_lower, 0.5);
        assert_eq!(m.ci_upper, 0.5);
    }
}
