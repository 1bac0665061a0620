//! Registry
//!
//! Versioned storage of fitted classifiers. Every saved model gets a
//! `model_v{N}.json` artifact and one row in an append-only csv table.
use crate::constants::{MODEL_FILE_EXTENSION, MODEL_FILE_PREFIX, REGISTRY_FILE_NAME};
use crate::data::Frame;
use crate::errors::DriftWatchError;
use crate::metric::{accuracy_score, roc_auc_score};
use crate::model::{Classifier, ModelIO, ModelType, Sampler, StratifiedSampler};
use crate::utils::validate_float_parameter;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;

fn serialize_cols<S: Serializer>(cols: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&cols.join(","))
}

fn deserialize_cols<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        Ok(Vec::new())
    } else {
        Ok(s.split(',').map(str::to_string).collect())
    }
}

/// One row of the registry table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub version: u32,
    pub path: String,
    pub model_type: String,
    pub timestamp: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub auc: f64,
    pub accuracy: f64,
    #[serde(serialize_with = "serialize_cols", deserialize_with = "deserialize_cols")]
    pub numeric_cols: Vec<String>,
    #[serde(serialize_with = "serialize_cols", deserialize_with = "deserialize_cols")]
    pub cat_cols: Vec<String>,
    pub notes: String,
}

/// Version encoded in an artifact file name, `None` for any other file.
pub fn parse_artifact_version(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix(MODEL_FILE_PREFIX)?
        .strip_suffix(MODEL_FILE_EXTENSION)?
        .strip_suffix('.')?
        .parse::<u32>()
        .ok()
}

/// A directory holding model artifacts and the registry table.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    dir: PathBuf,
}

impl ModelRegistry {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        ModelRegistry {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn registry_path(&self) -> PathBuf {
        self.dir.join(REGISTRY_FILE_NAME)
    }

    pub fn artifact_path(&self, version: u32) -> PathBuf {
        self.dir
            .join(format!("{}{}.{}", MODEL_FILE_PREFIX, version, MODEL_FILE_EXTENSION))
    }

    /// All registry rows in file order. An absent table is empty.
    pub fn read_registry(&self) -> Result<Vec<ModelVersion>, DriftWatchError> {
        let path = self.registry_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&path)
            .map_err(|e| DriftWatchError::UnableToRead(format!("{}: {}", path.display(), e)))?;
        reader
            .deserialize::<ModelVersion>()
            .map(|r| r.map_err(|e| DriftWatchError::UnableToRead(format!("{}: {}", path.display(), e))))
            .collect()
    }

    /// Versions of the artifacts present in the directory, unsorted.
    fn artifact_versions(&self) -> Result<Vec<u32>, DriftWatchError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.dir).map_err(|e| DriftWatchError::UnableToRead(e.to_string()))?;
        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DriftWatchError::UnableToRead(e.to_string()))?;
            if let Some(v) = entry.file_name().to_str().and_then(parse_artifact_version) {
                versions.push(v);
            }
        }
        Ok(versions)
    }

    /// Version the next saved model gets.
    ///
    /// The registry table decides when it has rows. Otherwise the artifact
    /// names are scanned, skipping anything that is not `model_v{N}.json`.
    /// An empty store starts at 1.
    pub fn next_version(&self) -> Result<u32, DriftWatchError> {
        let rows = self.read_registry()?;
        let latest = match rows.iter().map(|r| r.version).max() {
            Some(v) => Some(v),
            None => self.artifact_versions()?.into_iter().max(),
        };
        Ok(latest.map_or(1, |v| v + 1))
    }

    /// Fit the classifier pipeline, evaluate it on a stratified held out
    /// split, then persist the artifact and append its registry row.
    ///
    /// * `data` - Training rows with features and target.
    /// * `model_type` - Only `logistic_regression` is supported.
    /// * `test_size` - Share of every class held out for evaluation.
    /// * `random_state` - Seed of the split.
    /// * `notes` - Free text stored with the row.
    #[allow(clippy::too_many_arguments)]
    pub fn train_and_save(
        &self,
        data: &Frame,
        target: &str,
        numeric_cols: &[String],
        cat_cols: &[String],
        model_type: &str,
        test_size: f64,
        random_state: u64,
        notes: &str,
    ) -> Result<(PathBuf, ModelVersion), DriftWatchError> {
        let model_type = ModelType::from_str(model_type)
            .map_err(|_| DriftWatchError::Configuration(format!("Unsupported model_type: {}", model_type)))?;
        validate_float_parameter(test_size, 0.0, 1.0, "test_size")?;

        let labels = data.labels(target)?;
        if !(labels.contains(&0) && labels.contains(&1)) {
            return Err(DriftWatchError::InvalidData(format!(
                "target column {} must contain both classes",
                target
            )));
        }

        let index: Vec<usize> = (0..labels.len()).collect();
        let mut rng = StdRng::seed_from_u64(random_state);
        let (train_idx, test_idx) = StratifiedSampler::new(&labels, test_size).sample(&mut rng, &index);
        let train = data.take(&train_idx);
        let test = data.take(&test_idx);

        let model = Classifier::fit(&train, target, numeric_cols, cat_cols, model_type)?;
        let (auc, accuracy) = if test.is_empty() {
            (f64::NAN, f64::NAN)
        } else {
            let y: Vec<f64> = test_idx.iter().map(|&i| f64::from(labels[i])).collect();
            let proba = model.predict_proba(&test)?;
            let yhat: Vec<f64> = model.predict(&test)?.into_iter().map(f64::from).collect();
            (roc_auc_score(&y, &proba), accuracy_score(&y, &yhat))
        };

        fs::create_dir_all(&self.dir).map_err(|e| DriftWatchError::UnableToWrite(e.to_string()))?;
        let mut version = self.next_version()?;
        while self.artifact_path(version).exists() {
            warn!(
                "Unregistered artifact {} already exists, skipping version {}",
                self.artifact_path(version).display(),
                version
            );
            version += 1;
        }
        let path = self.artifact_path(version);
        self.write_artifact(&model, &path)?;

        let row = ModelVersion {
            version,
            path: path.display().to_string(),
            model_type: model_type.to_string(),
            timestamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            train_rows: train_idx.len(),
            test_rows: test_idx.len(),
            auc,
            accuracy,
            numeric_cols: numeric_cols.to_vec(),
            cat_cols: cat_cols.to_vec(),
            notes: notes.to_string(),
        };
        if let Err(e) = self.append_row(&row) {
            // An artifact without a row would be overwritten by the next save.
            let _ = fs::remove_file(&path);
            return Err(e);
        }
        info!(
            "Saved model v{} to {} (auc {:.4}, accuracy {:.4})",
            version,
            path.display(),
            auc,
            accuracy
        );
        Ok((path, row))
    }

    fn write_artifact(&self, model: &Classifier, path: &Path) -> Result<(), DriftWatchError> {
        let tmp = path.with_extension(format!("{}.tmp", MODEL_FILE_EXTENSION));
        model.save_model(&tmp)?;
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            DriftWatchError::UnableToWrite(e.to_string())
        })
    }

    fn append_row(&self, row: &ModelVersion) -> Result<(), DriftWatchError> {
        let path = self.registry_path();
        let write_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| DriftWatchError::UnableToWrite(format!("{}: {}", path.display(), e)))?;
        let mut writer = csv::WriterBuilder::new().has_headers(write_header).from_writer(file);
        writer
            .serialize(row)
            .map_err(|e| DriftWatchError::UnableToWrite(e.to_string()))?;
        writer.flush().map_err(|e| DriftWatchError::UnableToWrite(e.to_string()))
    }

    /// The model with the highest registered version, `None` when there is
    /// none. Artifact names are only scanned when the table has no rows.
    pub fn load_latest_model(&self) -> Result<Option<Classifier>, DriftWatchError> {
        let rows = self.read_registry()?;
        let latest = match rows.iter().map(|r| r.version).max() {
            Some(v) => Some(v),
            None => self.artifact_versions()?.into_iter().max(),
        };
        match latest {
            Some(v) => self.load_model(v).map(Some),
            None => Ok(None),
        }
    }

    pub fn load_model(&self, version: u32) -> Result<Classifier, DriftWatchError> {
        Classifier::load_model(self.artifact_path(version))
    }
}
