//! Monitor configuration.
use crate::concept::ConceptDriftConfig;
use crate::drift::{AggregateRule, DriftThresholds};
use crate::errors::DriftWatchError;
use crate::model::ModelType;
use crate::utils::{items_to_strings, validate_float_parameter, validate_positive_int_parameter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which batch level flag feeds the hysteresis counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrainOn {
    DataDrift,
    ConceptDrift,
    #[default]
    Either,
}

impl RetrainOn {
    pub fn trigger(&self, data_drift: bool, concept_drift: bool) -> bool {
        match self {
            RetrainOn::DataDrift => data_drift,
            RetrainOn::ConceptDrift => concept_drift,
            RetrainOn::Either => data_drift || concept_drift,
        }
    }
}

impl FromStr for RetrainOn {
    type Err = DriftWatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data_drift" => Ok(RetrainOn::DataDrift),
            "concept_drift" => Ok(RetrainOn::ConceptDrift),
            "either" => Ok(RetrainOn::Either),
            _ => Err(DriftWatchError::ParseString(
                s.to_string(),
                "RetrainOn".to_string(),
                items_to_strings(vec!["data_drift", "concept_drift", "either"]),
            )),
        }
    }
}

impl fmt::Display for RetrainOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrainOn::DataDrift => write!(f, "data_drift"),
            RetrainOn::ConceptDrift => write!(f, "concept_drift"),
            RetrainOn::Either => write!(f, "either"),
        }
    }
}

/// How the baseline is rebuilt from the triggering batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrainStrategy {
    /// Old baseline rows followed by the batch rows.
    #[default]
    Append,
    /// The batch alone.
    Replace,
}

impl FromStr for RetrainStrategy {
    type Err = DriftWatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(RetrainStrategy::Append),
            "replace" => Ok(RetrainStrategy::Replace),
            _ => Err(DriftWatchError::ParseString(
                s.to_string(),
                "RetrainStrategy".to_string(),
                items_to_strings(vec!["append", "replace"]),
            )),
        }
    }
}

impl fmt::Display for RetrainStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrainStrategy::Append => write!(f, "append"),
            RetrainStrategy::Replace => write!(f, "replace"),
        }
    }
}

fn default_retrain_enabled() -> bool {
    true
}
fn default_min_drift_windows() -> usize {
    2
}
fn default_target() -> String {
    "y".to_string()
}
fn default_numeric_columns() -> Vec<String> {
    vec!["f1".to_string(), "f2".to_string(), "f3".to_string()]
}
fn default_cat_columns() -> Vec<String> {
    vec!["cat".to_string()]
}
fn default_model_type() -> String {
    ModelType::LogisticRegression.to_string()
}
fn default_test_size() -> f64 {
    0.2
}
fn default_random_state() -> u64 {
    42
}
fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

/// Everything the control loop needs to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub thresholds: DriftThresholds,
    #[serde(default)]
    pub aggregate_rule: AggregateRule,
    #[serde(default)]
    pub retrain_on: RetrainOn,
    #[serde(default = "default_retrain_enabled")]
    pub retrain_enabled: bool,
    /// Consecutive triggering batches required before retraining.
    #[serde(default = "default_min_drift_windows")]
    pub min_drift_windows: usize,
    #[serde(default)]
    pub strategy: RetrainStrategy,
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default = "default_numeric_columns")]
    pub numeric_columns: Vec<String>,
    #[serde(default = "default_cat_columns")]
    pub cat_columns: Vec<String>,
    #[serde(default = "default_model_type")]
    pub model_type: String,
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    #[serde(default = "default_random_state")]
    pub random_state: u64,
    /// Directory of the model artifacts and the registry table.
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    #[serde(default)]
    pub concept_drift: ConceptDriftConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            thresholds: DriftThresholds::default(),
            aggregate_rule: AggregateRule::default(),
            retrain_on: RetrainOn::default(),
            retrain_enabled: default_retrain_enabled(),
            min_drift_windows: default_min_drift_windows(),
            strategy: RetrainStrategy::default(),
            target: default_target(),
            numeric_columns: default_numeric_columns(),
            cat_columns: default_cat_columns(),
            model_type: default_model_type(),
            test_size: default_test_size(),
            random_state: default_random_state(),
            models_dir: default_models_dir(),
            concept_drift: ConceptDriftConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Parse a json configuration, filling absent keys with defaults.
    pub fn from_json(json_str: &str) -> Result<Self, DriftWatchError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| DriftWatchError::Configuration(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DriftWatchError> {
        let json_str = fs::read_to_string(path.as_ref())
            .map_err(|e| DriftWatchError::UnableToRead(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_json(&json_str)
    }

    pub fn validate(&self) -> Result<(), DriftWatchError> {
        ModelType::from_str(&self.model_type)
            .map_err(|_| DriftWatchError::Configuration(format!("Unsupported model_type: {}", self.model_type)))?;
        validate_positive_int_parameter(self.min_drift_windows, "min_drift_windows")?;
        validate_float_parameter(self.test_size, 0.0, 1.0, "test_size")?;
        if self.numeric_columns.is_empty() && self.cat_columns.is_empty() {
            return Err(DriftWatchError::Configuration("no feature columns configured".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrain_on_trigger() {
        assert!(RetrainOn::DataDrift.trigger(true, false));
        assert!(!RetrainOn::DataDrift.trigger(false, true));
        assert!(RetrainOn::ConceptDrift.trigger(false, true));
        assert!(RetrainOn::Either.trigger(false, true));
        assert!(!RetrainOn::Either.trigger(false, false));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(RetrainOn::from_str("concept_drift").unwrap(), RetrainOn::ConceptDrift);
        assert!(RetrainOn::from_str("always").is_err());
        assert_eq!(RetrainStrategy::from_str("replace").unwrap(), RetrainStrategy::Replace);
        assert!(matches!(
            RetrainStrategy::from_str("merge"),
            Err(DriftWatchError::ParseString(..))
        ));
    }

    #[test]
    fn test_config_from_json() {
        let cfg = MonitorConfig::from_json(
            r#"{
                "retrain_on": "data_drift",
                "strategy": "replace",
                "min_drift_windows": 3,
                "thresholds": {"psi_gt": 0.2},
                "concept_drift": {"detector": "pagehinkley"}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.retrain_on, RetrainOn::DataDrift);
        assert_eq!(cfg.strategy, RetrainStrategy::Replace);
        assert_eq!(cfg.min_drift_windows, 3);
        assert_eq!(cfg.thresholds.psi_gt, 0.2);
        assert_eq!(cfg.thresholds.ks_pvalue_lt, 0.05);
        assert_eq!(cfg.aggregate_rule, AggregateRule::Any);
        assert_eq!(cfg.concept_drift.detector, "pagehinkley");
        assert_eq!(cfg.target, "y");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            MonitorConfig::from_json(r#"{"retrain_on": "sometimes"}"#),
            Err(DriftWatchError::Configuration(_))
        ));
        let cfg = MonitorConfig {
            model_type: "svm".to_string(),
            ..MonitorConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(DriftWatchError::Configuration(_))));
        let cfg = MonitorConfig {
            min_drift_windows: 0,
            ..MonitorConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
