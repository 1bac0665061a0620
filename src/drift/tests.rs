use crate::drift::{
    compute_categorical_drift, compute_numeric_drift, summarize_breaches, AggregateRule, DriftReport,
    DriftThresholds, FeatureKind,
};
use crate::synthetic::{binary_categories, normal_vec};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::str::FromStr;

fn report(breach: bool) -> DriftReport {
    DriftReport {
        breach,
        ..DriftReport::undefined(FeatureKind::Numeric)
    }
}

#[test]
fn test_numeric_drift_detects_shift() {
    let mut rng = StdRng::seed_from_u64(0);
    let base = normal_vec(&mut rng, 2000, 0.0, 1.0);
    let curr = normal_vec(&mut rng, 2000, 1.0, 1.3);
    let res = compute_numeric_drift(&base, &curr, &DriftThresholds::default());
    assert!(res.breach);
    assert!(res.p_value.unwrap() < 0.05);
    assert!(res.psi.unwrap() > 0.25);
}

#[test]
fn test_numeric_drift_identical_samples_do_not_breach() {
    let mut rng = StdRng::seed_from_u64(1);
    let base = normal_vec(&mut rng, 1000, 0.0, 1.0);
    let res = compute_numeric_drift(&base, &base, &DriftThresholds::default());
    assert!(!res.breach);
    assert_eq!(res.statistic, Some(0.0));
    assert_eq!(res.p_value, Some(1.0));
    assert!(res.js_divergence.unwrap() < 1e-9);
    assert!(res.psi.unwrap().abs() < 1e-9);
}

#[test]
fn test_numeric_drift_empty_after_nan_is_undefined() {
    let base = vec![f64::NAN, f64::NAN];
    let curr = vec![1.0, 2.0];
    let res = compute_numeric_drift(&base, &curr, &DriftThresholds::default());
    assert_eq!(res, DriftReport::undefined(FeatureKind::Numeric));
    let res = compute_numeric_drift(&curr, &[], &DriftThresholds::default());
    assert!(!res.breach);
    assert!(res.p_value.is_none());
}

#[test]
fn test_numeric_drift_ignores_nan_rows() {
    let mut rng = StdRng::seed_from_u64(2);
    let base = normal_vec(&mut rng, 500, 0.0, 1.0);
    let mut with_nan = base.clone();
    with_nan.extend([f64::NAN; 50]);
    let res = compute_numeric_drift(&base, &with_nan, &DriftThresholds::default());
    assert_eq!(res.statistic, Some(0.0));
    assert!(!res.breach);
}

#[test]
fn test_numeric_drift_constant_baseline() {
    let base = vec![3.0; 100];
    let curr = vec![3.0; 100];
    let res = compute_numeric_drift(&base, &curr, &DriftThresholds::default());
    assert!(res.js_divergence.unwrap() < 1e-9);
    assert!(!res.breach);
}

#[test]
fn test_numeric_breach_is_disjunction_of_metrics() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        let shift = rng.gen::<f64>() * 0.6;
        let scale = 0.8 + rng.gen::<f64>() * 0.6;
        let n = 50 + (rng.gen::<f64>() * 400.0) as usize;
        let base = normal_vec(&mut rng, n, 0.0, 1.0);
        let curr = normal_vec(&mut rng, n, shift, scale);
        let thresholds = DriftThresholds {
            ks_pvalue_lt: rng.gen::<f64>() * 0.2,
            js_divergence_gt: rng.gen::<f64>() * 0.3,
            psi_gt: rng.gen::<f64>() * 0.5,
            chi2_pvalue_lt: 0.05,
        };
        let res = compute_numeric_drift(&base, &curr, &thresholds);
        let expected = res.p_value.unwrap() < thresholds.ks_pvalue_lt
            || res.js_divergence.unwrap() > thresholds.js_divergence_gt
            || res.psi.unwrap() > thresholds.psi_gt;
        assert_eq!(res.breach, expected);
    }
}

#[test]
fn test_categorical_drift_detects_shift() {
    let mut rng = StdRng::seed_from_u64(4);
    let base = binary_categories(&mut rng, 2000, 0.7);
    let curr = binary_categories(&mut rng, 2000, 0.5);
    let res = compute_categorical_drift(&base, &curr, &DriftThresholds::default());
    assert_eq!(res.kind, FeatureKind::Categorical);
    assert!(res.breach);
    assert!(res.p_value.unwrap() < 0.05);
}

#[test]
fn test_categorical_drift_identical_samples() {
    let base = vec!["A", "B", "A", "C"];
    let res = compute_categorical_drift(&base, &base, &DriftThresholds::default());
    assert!(!res.breach);
    assert!(res.statistic.unwrap() < 1e-12);
    assert!(res.p_value.unwrap() > 0.999);
}

#[test]
fn test_categorical_drift_unseen_category() {
    let base = vec!["A"; 50].into_iter().chain(vec!["B"; 50]).collect::<Vec<_>>();
    let curr = vec!["A"; 40]
        .into_iter()
        .chain(vec!["B"; 40])
        .chain(vec!["C"; 20])
        .collect::<Vec<_>>();
    let res = compute_categorical_drift(&base, &curr, &DriftThresholds::default());
    // `C` is missing from the baseline, it shifts the proportions but is
    // left out of the chi-square test.
    assert!(res.statistic.unwrap() < 1e-12);
    assert!(res.psi.unwrap() > 0.25);
    assert!(res.breach);
}

#[test]
fn test_categorical_drift_single_category_has_undefined_p_value() {
    let base = vec!["A"; 10];
    let res = compute_categorical_drift(&base, &base, &DriftThresholds::default());
    assert!(res.p_value.is_none());
    assert!(!res.breach);
}

#[test]
fn test_categorical_drift_empty_input() {
    let base: Vec<String> = vec![];
    let curr = vec!["A".to_string()];
    let res = compute_categorical_drift(&base, &curr, &DriftThresholds::default());
    assert_eq!(res, DriftReport::undefined(FeatureKind::Categorical));
}

#[test]
fn test_summarize_breaches() {
    let reports = vec![report(true), report(false), report(false)];
    assert!(summarize_breaches(&reports, AggregateRule::Any));
    assert!(!summarize_breaches(&reports, AggregateRule::Majority));

    let tie = vec![report(true), report(false)];
    assert!(summarize_breaches(&tie, AggregateRule::Majority));

    let none = vec![report(false), report(false)];
    assert!(!summarize_breaches(&none, AggregateRule::Any));

    let empty: Vec<DriftReport> = vec![];
    assert!(!summarize_breaches(&empty, AggregateRule::Any));
    assert!(!summarize_breaches(&empty, AggregateRule::Majority));
}

#[test]
fn test_aggregate_rule_from_str() {
    assert_eq!(AggregateRule::from_str("majority").unwrap(), AggregateRule::Majority);
    assert_eq!(AggregateRule::from_str("any").unwrap(), AggregateRule::Any);
    assert!(AggregateRule::from_str("all").is_err());
}
