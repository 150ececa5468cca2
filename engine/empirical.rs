//! Empirical (sample-based) estimation of the full metric battery, with
//! bootstrap confidence intervals.
//!
//! The estimators here are the nonparametric companions to the analytic
//! engine: rank-based ROC-AUC, threshold sweeps over observed values, and a
//! KDE-located decision threshold. In the large-sample limit they agree
//! with the closed forms for matching Gaussian populations.

use itertools::Itertools;
use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::convert::d_to_log_odds_ratio;
use crate::error::{
    DomainError, Error, InputError, check_base_rate, check_threshold_prob,
};
use crate::kde::threshold_from_pt_kde;
use crate::metrics::{ThresholdMetrics, threshold_metrics_empirical};
use crate::reliability::{
    Center, transform_for_target_reliability, transform_groups_for_target_kappa,
};
use crate::stats;
use crate::types::{BinaryResults, MetricWithCi, PrCurve, RocCurve};

/// Cohen's d with pooled standard deviation. Zero when the pooled SD is
/// exactly zero.
pub fn cohens_d(group1: ArrayView1<f64>, group2: ArrayView1<f64>) -> f64 {
    let (n1, n2) = (group1.len() as f64, group2.len() as f64);
    let pooled_var = ((n1 - 1.0) * stats::sample_variance(group1)
        + (n2 - 1.0) * stats::sample_variance(group2))
        / (n1 + n2 - 2.0);
    let pooled_sd = pooled_var.sqrt();

    if pooled_sd == 0.0 {
        return 0.0;
    }
    (stats::mean(group2) - stats::mean(group1)) / pooled_sd
}

/// Point-biserial correlation between group membership and measurement.
pub fn point_biserial_r(group1: ArrayView1<f64>, group2: ArrayView1<f64>) -> f64 {
    let labels: Vec<f64> = std::iter::repeat(0.0)
        .take(group1.len())
        .chain(std::iter::repeat(1.0).take(group2.len()))
        .collect();
    let values: Vec<f64> = group1.iter().chain(group2.iter()).copied().collect();
    stats::pearson_r(&labels, &values)
}

/// Eta-squared from the one-way ANOVA decomposition. Zero when the total
/// sum of squares vanishes.
pub fn eta_squared(group1: ArrayView1<f64>, group2: ArrayView1<f64>) -> f64 {
    let (n1, n2) = (group1.len() as f64, group2.len() as f64);
    let (m1, m2) = (stats::mean(group1), stats::mean(group2));
    let grand_mean = (n1 * m1 + n2 * m2) / (n1 + n2);

    let ss_between = n1 * (m1 - grand_mean).powi(2) + n2 * (m2 - grand_mean).powi(2);
    let ss_total: f64 = group1
        .iter()
        .chain(group2.iter())
        .map(|v| (v - grand_mean).powi(2))
        .sum();

    if ss_total == 0.0 { 0.0 } else { ss_between / ss_total }
}

/// Odds ratio and log odds ratio derived from the sample Cohen's d.
pub fn odds_ratio(group1: ArrayView1<f64>, group2: ArrayView1<f64>) -> (f64, f64) {
    let log_or = d_to_log_odds_ratio(cohens_d(group1, group2));
    (log_or.exp(), log_or)
}

/// Cohen's U3: the proportion of cases strictly above the control median.
pub fn cohens_u3(group1: ArrayView1<f64>, group2: ArrayView1<f64>) -> f64 {
    let median1 = stats::median(group1);
    group2.iter().filter(|&&v| v > median1).count() as f64 / group2.len() as f64
}

/// ROC-AUC by the Mann-Whitney statistic: for every case, controls strictly
/// below count 1 and exact ties count one half.
pub fn roc_auc(group1: ArrayView1<f64>, group2: ArrayView1<f64>) -> f64 {
    let mut sorted1 = group1.to_vec();
    sorted1.sort_unstable_by(f64::total_cmp);

    let mut count = 0.0;
    for &x2 in group2.iter() {
        let below = sorted1.partition_point(|&v| v < x2);
        let tied = sorted1.partition_point(|&v| v <= x2) - below;
        count += below as f64 + 0.5 * tied as f64;
    }
    count / (group1.len() as f64 * group2.len() as f64)
}

fn sorted_vec(view: ArrayView1<f64>) -> Vec<f64> {
    let mut v = view.to_vec();
    v.sort_unstable_by(f64::total_cmp);
    v
}

// Proportion of `sorted` at or above `t`; `sorted` must be ascending.
fn frac_at_or_above(sorted: &[f64], t: f64) -> f64 {
    (sorted.len() - sorted.partition_point(|&v| v < t)) as f64 / sorted.len() as f64
}

fn frac_below(sorted: &[f64], t: f64) -> f64 {
    sorted.partition_point(|&v| v < t) as f64 / sorted.len() as f64
}

/// PR-AUC at a declared prevalence, sweeping the unique observed values as
/// thresholds and integrating precision over recall by the trapezoid rule.
pub fn pr_auc(group1: ArrayView1<f64>, group2: ArrayView1<f64>, base_rate: f64) -> f64 {
    let g1s = sorted_vec(group1);
    let g2s = sorted_vec(group2);
    let thresholds: Vec<f64> = group1
        .iter()
        .chain(group2.iter())
        .copied()
        .sorted_by(|a, b| b.total_cmp(a))
        .dedup()
        .collect();

    let mut points: Vec<(f64, f64)> = Vec::with_capacity(thresholds.len() + 2);
    points.push((0.0, 1.0));
    for &t in &thresholds {
        let sens = frac_at_or_above(&g2s, t);
        let spec = frac_below(&g1s, t);

        let numerator = sens * base_rate;
        let denominator = numerator + (1.0 - spec) * (1.0 - base_rate);
        let precision = if denominator > 0.0 { numerator / denominator } else { 1.0 };

        points.push((sens, precision));
    }
    points.push((1.0, base_rate));
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut area = 0.0;
    for pair in points.windows(2) {
        area += (pair[1].0 - pair[0].0) * 0.5 * (pair[1].1 + pair[0].1);
    }
    area.clamp(0.0, 1.0)
}

/// ROC curve coordinates over the unique observed values, anchored at
/// (1, 1) and (0, 0).
pub fn roc_curve(group1: ArrayView1<f64>, group2: ArrayView1<f64>) -> RocCurve {
    let g1s = sorted_vec(group1);
    let g2s = sorted_vec(group2);
    let unique: Vec<f64> = group1
        .iter()
        .chain(group2.iter())
        .copied()
        .sorted_by(f64::total_cmp)
        .dedup()
        .collect();

    let mut fpr = Vec::with_capacity(unique.len() + 2);
    let mut tpr = Vec::with_capacity(unique.len() + 2);
    let mut thresholds = Vec::with_capacity(unique.len() + 2);

    fpr.push(1.0);
    tpr.push(1.0);
    thresholds.push(unique[0] - 1.0);
    for &t in &unique {
        fpr.push(frac_at_or_above(&g1s, t));
        tpr.push(frac_at_or_above(&g2s, t));
        thresholds.push(t);
    }
    fpr.push(0.0);
    tpr.push(0.0);
    thresholds.push(unique[unique.len() - 1] + 1.0);

    RocCurve { fpr, tpr, thresholds }
}

/// Precision-recall curve coordinates over the unique observed values in
/// descending threshold order.
pub fn pr_curve(group1: ArrayView1<f64>, group2: ArrayView1<f64>, base_rate: f64) -> PrCurve {
    let g1s = sorted_vec(group1);
    let g2s = sorted_vec(group2);
    let thresholds: Vec<f64> = group1
        .iter()
        .chain(group2.iter())
        .copied()
        .sorted_by(|a, b| b.total_cmp(a))
        .dedup()
        .collect();

    let mut precision = Vec::with_capacity(thresholds.len());
    let mut recall = Vec::with_capacity(thresholds.len());
    for &t in &thresholds {
        let sens = frac_at_or_above(&g2s, t);
        let spec = frac_below(&g1s, t);

        let numerator = sens * base_rate;
        let denominator = numerator + (1.0 - spec) * (1.0 - base_rate);
        precision.push(if denominator > 0.0 { numerator / denominator } else { 1.0 });
        recall.push(sens);
    }

    PrCurve { precision, recall, thresholds }
}

/// Every metric computed for one dataset; one of these per bootstrap
/// resample feeds the percentile intervals.
#[derive(Debug, Clone, Copy)]
struct MetricSet {
    cohens_d: f64,
    point_biserial_r: f64,
    eta_squared: f64,
    odds_ratio: f64,
    log_odds_ratio: f64,
    cohens_u3: f64,
    roc_auc: f64,
    pr_auc: f64,
    threshold_value: f64,
    thr: ThresholdMetrics,
}

fn metric_set(
    group1: ArrayView1<f64>,
    group2: ArrayView1<f64>,
    base_rate: f64,
    threshold_prob: f64,
) -> MetricSet {
    let (or, log_or) = odds_ratio(group1, group2);
    let threshold = threshold_from_pt_kde(group1, group2, base_rate, threshold_prob);
    MetricSet {
        cohens_d: cohens_d(group1, group2),
        point_biserial_r: point_biserial_r(group1, group2),
        eta_squared: eta_squared(group1, group2),
        odds_ratio: or,
        log_odds_ratio: log_or,
        cohens_u3: cohens_u3(group1, group2),
        roc_auc: roc_auc(group1, group2),
        pr_auc: pr_auc(group1, group2, base_rate),
        threshold_value: threshold,
        thr: threshold_metrics_empirical(group1, group2, threshold, base_rate, threshold_prob),
    }
}

/// Bootstrap settings for confidence-interval estimation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Number of resamples. Zero disables the bootstrap; every interval
    /// collapses to its point estimate.
    pub n_bootstrap: usize,
    /// Confidence level for the percentile intervals.
    pub ci_level: f64,
    /// Master seed. A fixed seed reproduces the exact intervals at any
    /// thread count: resample `i` always derives its generator from
    /// `seed + i`.
    pub seed: Option<u64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        BootstrapConfig { n_bootstrap: 1000, ci_level: 0.95, seed: None }
    }
}

/// A reliability adjustment applied to both groups before re-estimation.
///
/// The underlying transforms are deterministic rescales and mean shifts
/// (see the reliability module); they simulate a different measurement or
/// label reliability, they do not remove noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityShift {
    pub r1_current: f64,
    pub r1_target: f64,
    pub r2_current: f64,
    pub r2_target: f64,
    /// Optional label-reliability adjustment applied after the ICC rescale.
    pub kappa: Option<KappaShift>,
    pub center: Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KappaShift {
    pub current: f64,
    pub target: f64,
}

impl ReliabilityShift {
    /// Same current/target reliability for both groups.
    pub fn shared(current: f64, target: f64) -> Self {
        ReliabilityShift {
            r1_current: current,
            r1_target: target,
            r2_current: current,
            r2_target: target,
            kappa: None,
            center: Center::Mean,
        }
    }

    /// Independent reliabilities per group.
    pub fn per_group(
        r1_current: f64,
        r1_target: f64,
        r2_current: f64,
        r2_target: f64,
    ) -> Self {
        ReliabilityShift {
            r1_current,
            r1_target,
            r2_current,
            r2_target,
            kappa: None,
            center: Center::Mean,
        }
    }

    pub fn with_kappa(mut self, current: f64, target: f64) -> Self {
        self.kappa = Some(KappaShift { current, target });
        self
    }

    pub fn with_center(mut self, center: Center) -> Self {
        self.center = center;
        self
    }
}

/// An empirical two-group analysis: control and case measurements plus the
/// declared real-world prevalence and decision threshold probability.
#[derive(Debug, Clone)]
pub struct BinaryStudy {
    group1: Array1<f64>,
    group2: Array1<f64>,
    base_rate: f64,
    threshold_prob: f64,
    config: BootstrapConfig,
}

impl BinaryStudy {
    pub fn new(
        group1: Array1<f64>,
        group2: Array1<f64>,
        base_rate: f64,
        threshold_prob: f64,
        config: BootstrapConfig,
    ) -> Result<Self, Error> {
        if group1.is_empty() {
            return Err(InputError::EmptyGroup("group1").into());
        }
        if group2.is_empty() {
            return Err(InputError::EmptyGroup("group2").into());
        }
        if !group1.iter().all(|v| v.is_finite()) {
            return Err(InputError::NonFinite("group1").into());
        }
        if !group2.iter().all(|v| v.is_finite()) {
            return Err(InputError::NonFinite("group2").into());
        }
        check_base_rate(base_rate)?;
        check_threshold_prob(threshold_prob)?;
        if !(config.ci_level > 0.0 && config.ci_level < 1.0) {
            return Err(DomainError::CiLevel(config.ci_level).into());
        }

        Ok(BinaryStudy { group1, group2, base_rate, threshold_prob, config })
    }

    /// The full metric battery with bootstrap confidence intervals, plus
    /// ROC/PR curve coordinates.
    pub fn compute(&self) -> BinaryResults {
        let point =
            metric_set(self.group1.view(), self.group2.view(), self.base_rate, self.threshold_prob);
        let replicates = self.bootstrap_replicates();

        let alpha = 1.0 - self.config.ci_level;
        let lo_pct = 100.0 * (alpha / 2.0);
        let hi_pct = 100.0 * (1.0 - alpha / 2.0);

        // Percentile interval over the finite replicate values; a metric
        // with no finite replicate collapses to its point estimate.
        let with_ci = |select: fn(&MetricSet) -> f64| -> MetricWithCi {
            let estimate = select(&point);
            let mut values: Vec<f64> =
                replicates.iter().map(select).filter(|v| v.is_finite()).collect();
            if values.is_empty() {
                return MetricWithCi::point(estimate);
            }
            values.sort_unstable_by(f64::total_cmp);
            MetricWithCi {
                estimate,
                ci_lower: stats::percentile_of_sorted(&values, lo_pct),
                ci_upper: stats::percentile_of_sorted(&values, hi_pct),
            }
        };

        BinaryResults {
            cohens_d: with_ci(|m| m.cohens_d),
            cohens_u3: with_ci(|m| m.cohens_u3),
            point_biserial_r: with_ci(|m| m.point_biserial_r),
            eta_squared: with_ci(|m| m.eta_squared),
            odds_ratio: with_ci(|m| m.odds_ratio),
            log_odds_ratio: with_ci(|m| m.log_odds_ratio),
            roc_auc: with_ci(|m| m.roc_auc),
            pr_auc: with_ci(|m| m.pr_auc),
            threshold_value: point.threshold_value,
            sensitivity: with_ci(|m| m.thr.sensitivity),
            specificity: with_ci(|m| m.thr.specificity),
            ppv: with_ci(|m| m.thr.ppv),
            npv: with_ci(|m| m.thr.npv),
            accuracy: with_ci(|m| m.thr.accuracy),
            balanced_accuracy: with_ci(|m| m.thr.balanced_accuracy),
            f1: with_ci(|m| m.thr.f1),
            mcc: with_ci(|m| m.thr.mcc),
            lr_plus: with_ci(|m| m.thr.lr_plus),
            lr_minus: with_ci(|m| m.thr.lr_minus),
            dor: with_ci(|m| m.thr.dor),
            youden_j: with_ci(|m| m.thr.youden_j),
            g_mean: with_ci(|m| m.thr.g_mean),
            kappa_statistic: with_ci(|m| m.thr.kappa_statistic),
            post_test_prob_plus: with_ci(|m| m.thr.post_test_prob_plus),
            post_test_prob_minus: with_ci(|m| m.thr.post_test_prob_minus),
            delta_nb: with_ci(|m| m.thr.delta_nb),
            roc_curve: roc_curve(self.group1.view(), self.group2.view()),
            pr_curve: pr_curve(self.group1.view(), self.group2.view(), self.base_rate),
            n_group1: self.group1.len(),
            n_group2: self.group2.len(),
            base_rate: self.base_rate,
            threshold_prob: self.threshold_prob,
        }
    }

    /// Threshold-dependent metrics at a different decision probability,
    /// without rerunning the bootstrap.
    pub fn compute_at_threshold(&self, threshold_prob: f64) -> Result<ThresholdMetrics, Error> {
        check_threshold_prob(threshold_prob)?;
        let threshold = threshold_from_pt_kde(
            self.group1.view(),
            self.group2.view(),
            self.base_rate,
            threshold_prob,
        );
        Ok(threshold_metrics_empirical(
            self.group1.view(),
            self.group2.view(),
            threshold,
            self.base_rate,
            threshold_prob,
        ))
    }

    /// The full battery after a deterministic reliability transformation of
    /// both groups.
    pub fn compute_at_reliability(&self, shift: &ReliabilityShift) -> Result<BinaryResults, Error> {
        let g1 = transform_for_target_reliability(
            self.group1.view(),
            shift.r1_current,
            shift.r1_target,
            shift.center,
        )?;
        let g2 = transform_for_target_reliability(
            self.group2.view(),
            shift.r2_current,
            shift.r2_target,
            shift.center,
        )?;

        let (g1, g2) = match shift.kappa {
            Some(kappa) => transform_groups_for_target_kappa(
                g1.view(),
                g2.view(),
                kappa.current,
                kappa.target,
            )?,
            None => (g1, g2),
        };

        let study =
            BinaryStudy::new(g1, g2, self.base_rate, self.threshold_prob, self.config)?;
        Ok(study.compute())
    }

    fn bootstrap_replicates(&self) -> Vec<MetricSet> {
        if self.config.n_bootstrap == 0 {
            return Vec::new();
        }
        let master = self.config.seed.unwrap_or_else(|| rand::thread_rng().next_u64());
        log::debug!(
            "running {} bootstrap resamples (master seed {master})",
            self.config.n_bootstrap
        );

        (0..self.config.n_bootstrap)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(master.wrapping_add(i as u64));
                let g1 = resample(self.group1.view(), &mut rng);
                let g2 = resample(self.group2.view(), &mut rng);
                metric_set(g1.view(), g2.view(), self.base_rate, self.threshold_prob)
            })
            .collect()
    }
}

fn resample(data: ArrayView1<f64>, rng: &mut StdRng) -> Array1<f64> {
    let n = data.len();
    Array1::from_iter((0..n).map(|_| data[rng.gen_range(0..n)]))
}

/// Convenience entry point: metric battery with CIs from two raw samples.
pub fn empirical_binary(
    group1: Array1<f64>,
    group2: Array1<f64>,
    base_rate: f64,
    threshold_prob: f64,
    config: BootstrapConfig,
) -> Result<BinaryResults, Error> {
    Ok(BinaryStudy::new(group1, group2, base_rate, threshold_prob, config)?.compute())
}

/// Convenience entry point: metric battery after a reliability transform.
pub fn empirical_binary_deattenuated(
    group1: Array1<f64>,
    group2: Array1<f64>,
    base_rate: f64,
    threshold_prob: f64,
    shift: &ReliabilityShift,
    config: BootstrapConfig,
) -> Result<BinaryResults, Error> {
    BinaryStudy::new(group1, group2, base_rate, threshold_prob, config)?
        .compute_at_reliability(shift)
}
