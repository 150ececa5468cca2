//! Large-sample agreement between the analytic engine and the empirical
//! estimator, plus end-to-end behavior of the reliability transforms.

use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use prognos::continuous::ContinuousStudy;
use prognos::discrimination::roc_auc_parametric;
use prognos::empirical::{BinaryStudy, BootstrapConfig, ReliabilityShift};
use prognos::parametric::{ParametricBinaryConfig, parametric_binary};
use prognos::reliability::Center;

fn gaussian_sample(n: usize, mean: f64, sd: f64, rng: &mut StdRng) -> Array1<f64> {
    let normal = Normal::new(mean, sd).unwrap();
    Array1::from_iter((0..n).map(|_| normal.sample(rng)))
}

#[test]
fn empirical_estimates_converge_to_the_analytic_engine() {
    let true_d = 0.8;
    let base_rate = 0.1;
    let mut rng = StdRng::seed_from_u64(42);

    // 10,000 observations at the declared prevalence.
    let group1 = gaussian_sample(9_000, 0.0, 1.0, &mut rng);
    let group2 = gaussian_sample(1_000, true_d, 1.0, &mut rng);

    let config = BootstrapConfig { n_bootstrap: 50, ci_level: 0.95, seed: Some(7) };
    let study = BinaryStudy::new(group1, group2, base_rate, 0.5, config).unwrap();
    let empirical = study.compute();

    let analytic = roc_auc_parametric(true_d, 1.0, 1.0);
    let rel_err = (empirical.roc_auc.estimate - analytic).abs() / analytic;
    assert!(
        rel_err < 0.05,
        "ROC-AUC off by {rel_err:.4}: {:.4} vs {analytic:.4}",
        empirical.roc_auc.estimate
    );

    let d_rel_err = (empirical.cohens_d.estimate - true_d).abs() / true_d;
    assert!(d_rel_err < 0.1, "recovered d off by {d_rel_err:.4}");

    // The bootstrap interval should bracket the analytic value.
    assert!(empirical.roc_auc.ci_lower <= analytic + 0.02);
    assert!(empirical.roc_auc.ci_upper >= analytic - 0.02);
}

#[test]
fn threshold_dependent_metrics_converge_as_well() {
    let true_d = 0.8;
    let base_rate = 0.1;
    let mut rng = StdRng::seed_from_u64(1234);

    let group1 = gaussian_sample(9_000, 0.0, 1.0, &mut rng);
    let group2 = gaussian_sample(1_000, true_d, 1.0, &mut rng);

    let config = BootstrapConfig { n_bootstrap: 0, ci_level: 0.95, seed: None };
    let empirical = BinaryStudy::new(group1, group2, base_rate, 0.5, config)
        .unwrap()
        .compute();

    let analytic = parametric_binary(&ParametricBinaryConfig::new(true_d, base_rate)).unwrap();
    let m = &analytic.threshold_metrics;

    assert!((empirical.sensitivity.estimate - m.sensitivity).abs() < 0.05);
    assert!((empirical.specificity.estimate - m.specificity).abs() < 0.05);
    assert!((empirical.ppv.estimate - m.ppv).abs() < 0.05);
    assert!((empirical.youden_j.estimate - m.youden_j).abs() < 0.08);
    assert!((empirical.pr_auc.estimate - analytic.pr_auc).abs() < 0.05);
}

#[test]
fn deattenuating_sampled_groups_recovers_separation() {
    let mut rng = StdRng::seed_from_u64(99);

    // Observed data at reliability 0.6: noise inflates each group's spread.
    let sigma_obs = 1.0 / 0.6_f64.sqrt();
    let group1 = gaussian_sample(2_000, 0.0, sigma_obs, &mut rng);
    let group2 = gaussian_sample(2_000, 0.8, sigma_obs, &mut rng);

    let config = BootstrapConfig { n_bootstrap: 0, ci_level: 0.95, seed: None };
    let study = BinaryStudy::new(group1, group2, 0.1, 0.5, config).unwrap();

    let before = study.compute();
    let after = study
        .compute_at_reliability(&ReliabilityShift::shared(0.6, 1.0))
        .unwrap();

    assert!(
        after.cohens_d.estimate > before.cohens_d.estimate,
        "de-attenuation must strictly increase the estimated d"
    );
    assert!(after.roc_auc.estimate >= before.roc_auc.estimate - 1e-6);

    // Shrinking each group around its own mean by sqrt(0.6) divides the
    // pooled SD by the same factor, so d scales by 1/sqrt(0.6).
    let expected = before.cohens_d.estimate / 0.6_f64.sqrt();
    assert!((after.cohens_d.estimate - expected).abs() < 1e-6);
}

#[test]
fn fixed_seed_bootstrap_is_reproducible_end_to_end() {
    let mut rng = StdRng::seed_from_u64(5);
    let group1 = gaussian_sample(300, 0.0, 1.0, &mut rng);
    let group2 = gaussian_sample(300, 0.8, 1.0, &mut rng);

    let config = BootstrapConfig { n_bootstrap: 100, ci_level: 0.95, seed: Some(2024) };
    let first = BinaryStudy::new(group1.clone(), group2.clone(), 0.1, 0.5, config)
        .unwrap()
        .compute();
    let second = BinaryStudy::new(group1, group2, 0.1, 0.5, config)
        .unwrap()
        .compute();

    assert_eq!(first, second);
}

#[test]
fn continuous_pipeline_detects_a_correlated_predictor() {
    let mut rng = StdRng::seed_from_u64(77);
    let noise = Normal::new(0.0, 1.0).unwrap();

    let n = 2_000;
    let x = gaussian_sample(n, 0.0, 1.0, &mut rng);
    // Y = 0.5 X + e gives a population correlation near 0.45.
    let y = Array1::from_iter(x.iter().map(|&xi| 0.5 * xi + noise.sample(&mut rng)));

    let config = BootstrapConfig { n_bootstrap: 0, ci_level: 0.95, seed: None };
    let study = ContinuousStudy::new(x, y, 0.1, 0.2, config).unwrap();
    let results = study.compute();

    assert!(results.cohens_d.estimate > 0.3);
    assert!(results.roc_auc.estimate > 0.6);
    assert_eq!(results.n_group1 + results.n_group2, n);

    // The split must survive a predictor reliability change untouched.
    let shifted = study.compute_at_reliability(0.7, 1.0, Center::Mean).unwrap();
    assert_eq!(shifted.n_group1, results.n_group1);
    assert_eq!(shifted.n_group2, results.n_group2);
    assert!((shifted.roc_auc.estimate - results.roc_auc.estimate).abs() < 1e-9);
}
