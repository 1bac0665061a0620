//! Drift report and threshold types.
use crate::errors::DriftWatchError;
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn default_ks_pvalue_lt() -> f64 {
    0.05
}
fn default_js_divergence_gt() -> f64 {
    0.1
}
fn default_psi_gt() -> f64 {
    0.25
}
fn default_chi2_pvalue_lt() -> f64 {
    0.05
}

/// Thresholds above (divergences) or below (p-values) which a
/// feature is considered in breach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftThresholds {
    #[serde(default = "default_ks_pvalue_lt")]
    pub ks_pvalue_lt: f64,
    #[serde(default = "default_js_divergence_gt")]
    pub js_divergence_gt: f64,
    #[serde(default = "default_psi_gt")]
    pub psi_gt: f64,
    #[serde(default = "default_chi2_pvalue_lt")]
    pub chi2_pvalue_lt: f64,
}

impl Default for DriftThresholds {
    fn default() -> Self {
        DriftThresholds {
            ks_pvalue_lt: default_ks_pvalue_lt(),
            js_divergence_gt: default_js_divergence_gt(),
            psi_gt: default_psi_gt(),
            chi2_pvalue_lt: default_chi2_pvalue_lt(),
        }
    }
}

/// The type of test applied to a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Kolmogorov-Smirnov, histogram JS divergence, quantile PSI.
    Numeric,
    /// Chi-square goodness of fit, proportion JS divergence and PSI.
    Categorical,
}

/// Drift statistics of one feature for one batch.
///
/// `None` marks a statistic that is undefined for the inputs, e.g. because
/// one of them was empty. Undefined statistics never cause a breach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub kind: FeatureKind,
    /// KS statistic for numeric features, chi-square statistic for categorical ones.
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
    pub js_divergence: Option<f64>,
    pub psi: Option<f64>,
    pub breach: bool,
}

impl DriftReport {
    /// Report with every statistic undefined.
    pub fn undefined(kind: FeatureKind) -> Self {
        DriftReport {
            kind,
            statistic: None,
            p_value: None,
            js_divergence: None,
            psi: None,
            breach: false,
        }
    }

    /// Build a report from raw values, mapping NaN to `None` and applying
    /// the disjunctive breach rule.
    pub fn from_values(
        kind: FeatureKind,
        statistic: f64,
        p_value: f64,
        js_divergence: f64,
        psi: f64,
        thresholds: &DriftThresholds,
    ) -> Self {
        let p_threshold = match kind {
            FeatureKind::Numeric => thresholds.ks_pvalue_lt,
            FeatureKind::Categorical => thresholds.chi2_pvalue_lt,
        };
        let defined = |v: f64| if v.is_nan() { None } else { Some(v) };
        let (statistic, p_value, js_divergence, psi) =
            (defined(statistic), defined(p_value), defined(js_divergence), defined(psi));
        let breach = p_value.is_some_and(|p| p < p_threshold)
            || js_divergence.is_some_and(|js| js > thresholds.js_divergence_gt)
            || psi.is_some_and(|v| v > thresholds.psi_gt);
        DriftReport {
            kind,
            statistic,
            p_value,
            js_divergence,
            psi,
            breach,
        }
    }
}

/// How per feature breaches are combined into a batch level decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateRule {
    /// Any breaching feature flags the batch.
    #[default]
    Any,
    /// At least half of the features must breach.
    Majority,
}

impl FromStr for AggregateRule {
    type Err = DriftWatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(AggregateRule::Any),
            "majority" => Ok(AggregateRule::Majority),
            _ => Err(DriftWatchError::ParseString(
                s.to_string(),
                "AggregateRule".to_string(),
                items_to_strings(vec!["any", "majority"]),
            )),
        }
    }
}

impl fmt::Display for AggregateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateRule::Any => write!(f, "any"),
            AggregateRule::Majority => write!(f, "majority"),
        }
    }
}
