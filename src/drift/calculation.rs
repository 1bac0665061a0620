use crate::constants::{EPSILON, JS_HISTOGRAM_BINS, PSI_QUANTILE_BINS};
use crate::drift::report::{AggregateRule, DriftReport, DriftThresholds, FeatureKind};
use crate::drift::stats::{
    chisquare, edge_counts, equal_width_counts, jensen_shannon_divergence, ks_2samp_sorted, normalize,
    population_stability_index,
};
use crate::utils::{drop_nan, quantile_sorted, sorted};
use hashbrown::HashMap;

/// Calculate drift statistics for a numeric feature.
///
/// NaN values are dropped from both inputs first. When either input is empty
/// afterwards, every statistic is undefined and the feature does not breach.
///
/// # Arguments
///
/// * `baseline` - Values of the feature in the reference data.
/// * `current` - Values of the feature in the batch under test.
/// * `thresholds` - Breach thresholds, the KS p-value threshold applies.
pub fn compute_numeric_drift(baseline: &[f64], current: &[f64], thresholds: &DriftThresholds) -> DriftReport {
    let base = sorted(&drop_nan(baseline));
    let curr = sorted(&drop_nan(current));
    if base.is_empty() || curr.is_empty() {
        return DriftReport::undefined(FeatureKind::Numeric);
    }

    let (ks_stat, ks_p) = ks_2samp_sorted(&base, &curr);
    let js = histogram_js_divergence(&base, &curr);
    let psi = quantile_psi(&base, &curr);

    DriftReport::from_values(FeatureKind::Numeric, ks_stat, ks_p, js, psi, thresholds)
}

// JS divergence over equal width bins spanning the baseline range.
fn histogram_js_divergence(base: &[f64], curr: &[f64]) -> f64 {
    let (mut lo, mut hi) = (base[0], base[base.len() - 1]);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let base_hist = equal_width_counts(base, lo, hi, JS_HISTOGRAM_BINS);
    let curr_hist = equal_width_counts(curr, lo, hi, JS_HISTOGRAM_BINS);
    jensen_shannon_divergence(&normalize(&base_hist), &normalize(&curr_hist))
}

// PSI over bins cut at the baseline quantiles, open ended on both sides.
fn quantile_psi(base: &[f64], curr: &[f64]) -> f64 {
    let mut edges: Vec<f64> = (0..=PSI_QUANTILE_BINS)
        .map(|i| quantile_sorted(base, i as f64 / PSI_QUANTILE_BINS as f64))
        .collect();
    edges[0] = f64::NEG_INFINITY;
    edges[PSI_QUANTILE_BINS] = f64::INFINITY;
    let expected = normalize(&edge_counts(base, &edges));
    let actual = normalize(&edge_counts(curr, &edges));
    population_stability_index(&expected, &actual)
}

/// Calculate drift statistics for a categorical feature.
///
/// The vocabulary is the union of the categories seen in either input.
/// The chi-square test only uses categories present in the baseline, with the
/// expected counts rescaled to the observed total.
///
/// # Arguments
///
/// * `baseline` - Categories of the feature in the reference data.
/// * `current` - Categories of the feature in the batch under test.
/// * `thresholds` - Breach thresholds, the chi-square p-value threshold applies.
pub fn compute_categorical_drift<S: AsRef<str>>(
    baseline: &[S],
    current: &[S],
    thresholds: &DriftThresholds,
) -> DriftReport {
    if baseline.is_empty() || current.is_empty() {
        return DriftReport::undefined(FeatureKind::Categorical);
    }
    let base_counts = value_counts(baseline);
    let curr_counts = value_counts(current);

    let mut vocabulary: Vec<&str> = base_counts.keys().chain(curr_counts.keys()).copied().collect();
    vocabulary.sort_unstable();
    vocabulary.dedup();

    let expected: Vec<f64> = vocabulary
        .iter()
        .map(|c| *base_counts.get(c).unwrap_or(&0) as f64)
        .collect();
    let observed: Vec<f64> = vocabulary
        .iter()
        .map(|c| *curr_counts.get(c).unwrap_or(&0) as f64)
        .collect();

    let e_prop = normalize(&expected);
    let o_prop = normalize(&observed);
    let js = jensen_shannon_divergence(&e_prop, &o_prop);
    let psi = population_stability_index(&e_prop, &o_prop);
    let (chi2, p) = rescaled_chisquare(&expected, &observed);

    DriftReport::from_values(FeatureKind::Categorical, chi2, p, js, psi, thresholds)
}

fn value_counts<S: AsRef<str>>(values: &[S]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for v in values {
        *counts.entry(v.as_ref()).or_insert(0) += 1;
    }
    counts
}

fn rescaled_chisquare(expected: &[f64], observed: &[f64]) -> (f64, f64) {
    let (e, o): (Vec<f64>, Vec<f64>) = expected
        .iter()
        .zip(observed)
        .filter(|(e, _)| **e > 0.0)
        .map(|(e, o)| (*e, *o))
        .unzip();
    let e_sum: f64 = e.iter().sum();
    let o_sum: f64 = o.iter().sum();
    if e_sum == 0.0 || o_sum == 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let scale = o_sum / (e_sum + EPSILON);
    let f_exp: Vec<f64> = e.iter().map(|v| v * scale).collect();
    chisquare(&o, &f_exp)
}

/// Combine per feature breaches into a single decision.
///
/// An empty set of reports never breaches.
pub fn summarize_breaches<'a, I>(reports: I, rule: AggregateRule) -> bool
where
    I: IntoIterator<Item = &'a DriftReport>,
{
    let (n, breaches) = reports
        .into_iter()
        .fold((0usize, 0usize), |(n, b), r| (n + 1, b + usize::from(r.breach)));
    if n == 0 {
        return false;
    }
    match rule {
        AggregateRule::Any => breaches > 0,
        AggregateRule::Majority => breaches as f64 >= n as f64 / 2.0,
    }
}
