//! Model
//!
//! The fixed classifier pipeline used by the monitor: preprocessing followed
//! by a linear model, persisted as a single json artifact.
pub mod logistic;
pub mod preprocess;
pub mod split;

use crate::data::Frame;
use crate::errors::DriftWatchError;
use crate::utils::items_to_strings;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use logistic::LogisticRegression;
pub use preprocess::{OneHotEncoder, Preprocessor, StandardScaler};
pub use split::{Sampler, StratifiedSampler};

/// Supported classifier types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    LogisticRegression,
}

impl FromStr for ModelType {
    type Err = DriftWatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logistic_regression" => Ok(ModelType::LogisticRegression),
            _ => Err(DriftWatchError::ParseString(
                s.to_string(),
                "ModelType".to_string(),
                items_to_strings(vec!["logistic_regression"]),
            )),
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelType::LogisticRegression => write!(f, "logistic_regression"),
        }
    }
}

/// A fitted pipeline: preprocessing and a binary linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    pub model_type: ModelType,
    pub target: String,
    pub numeric_cols: Vec<String>,
    pub cat_cols: Vec<String>,
    pub preprocessor: Preprocessor,
    pub estimator: LogisticRegression,
}

impl Classifier {
    /// Fit the pipeline on the rows of `data`.
    ///
    /// * `data` - Frame holding the feature columns and the target.
    /// * `target` - Name of the binary label column.
    /// * `numeric_cols` - Columns that are standard scaled.
    /// * `cat_cols` - Columns that are one-hot encoded.
    pub fn fit(
        data: &Frame,
        target: &str,
        numeric_cols: &[String],
        cat_cols: &[String],
        model_type: ModelType,
    ) -> Result<Self, DriftWatchError> {
        let y: Vec<f64> = data.labels(target)?.into_iter().map(f64::from).collect();
        let preprocessor = Preprocessor::fit(data, numeric_cols, cat_cols)?;
        let design = preprocessor.transform(data)?;
        let mut estimator = match model_type {
            ModelType::LogisticRegression => LogisticRegression::new(preprocessor.n_features(), 1.0),
        };
        estimator.fit(&design, &y);
        Ok(Classifier {
            model_type,
            target: target.to_string(),
            numeric_cols: numeric_cols.to_vec(),
            cat_cols: cat_cols.to_vec(),
            preprocessor,
            estimator,
        })
    }

    /// Probability of the positive class for each row of `data`.
    pub fn predict_proba(&self, data: &Frame) -> Result<Vec<f64>, DriftWatchError> {
        let design = self.preprocessor.transform(data)?;
        Ok(self.estimator.predict_proba(&design))
    }

    /// Predicted label for each row, thresholded at 0.5.
    pub fn predict(&self, data: &Frame) -> Result<Vec<u8>, DriftWatchError> {
        Ok(self
            .predict_proba(data)?
            .into_iter()
            .map(|p| u8::from(p >= 0.5))
            .collect())
    }
}

/// IO
pub trait ModelIO: Serialize + DeserializeOwned + Sized {
    /// Save a model as a json object to a file.
    ///
    /// * `path` - Path to save the model.
    fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), DriftWatchError> {
        fs::write(path, self.json_dump()?).map_err(|e| DriftWatchError::UnableToWrite(e.to_string()))
    }

    /// Dump a model as a json object
    fn json_dump(&self) -> Result<String, DriftWatchError> {
        serde_json::to_string(self).map_err(|e| DriftWatchError::UnableToWrite(e.to_string()))
    }

    /// Load a model from a json string.
    fn from_json(json_str: &str) -> Result<Self, DriftWatchError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| DriftWatchError::UnableToRead(e.to_string()))
    }

    /// Load a model from a path to a json model object.
    ///
    /// * `path` - Path to load the model from.
    fn load_model<P: AsRef<Path>>(path: P) -> Result<Self, DriftWatchError> {
        let json_str = fs::read_to_string(path).map_err(|e| DriftWatchError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl ModelIO for Classifier {}
