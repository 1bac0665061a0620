//! Monitor
//!
//! The control loop. Every batch is compared to the current baseline, the
//! live model's errors are fed to the concept drift detector, and a
//! hysteresis counter decides when to retrain and swap baseline and model.
pub mod config;

use crate::alert::AlertSink;
use crate::chart::ChartSink;
use crate::concept::ConceptDriftDetector;
use crate::data::{Batch, Column, Frame};
use crate::drift::{compute_categorical_drift, compute_numeric_drift, summarize_breaches, DriftReport};
use crate::errors::DriftWatchError;
use crate::ingestion::BatchSource;
use crate::model::Classifier;
use crate::registry::{ModelRegistry, ModelVersion};
use crate::utils::fmt_vec_output;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

pub use config::{MonitorConfig, RetrainOn, RetrainStrategy};

/// Load the baseline frame. A missing file means the run cannot start.
pub fn load_baseline<P: AsRef<Path>>(path: P) -> Result<Frame, DriftWatchError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DriftWatchError::DataUnavailable(format!(
            "Baseline not found: {}",
            path.display()
        )));
    }
    Frame::from_csv_path(path)
}

/// Configured feature columns that exist in `baseline`, numeric then categorical.
fn present_columns(config: &MonitorConfig, baseline: &Frame) -> (Vec<String>, Vec<String>) {
    let keep = |cols: &[String]| -> Vec<String> { cols.iter().filter(|c| baseline.has_column(c)).cloned().collect() };
    (keep(&config.numeric_columns), keep(&config.cat_columns))
}

/// Train and register the first model on the baseline.
pub fn init_model(config: &MonitorConfig, baseline: &Frame) -> Result<(PathBuf, ModelVersion), DriftWatchError> {
    config.validate()?;
    let (numeric_cols, cat_cols) = present_columns(config, baseline);
    ModelRegistry::new(&config.models_dir).train_and_save(
        baseline,
        &config.target,
        &numeric_cols,
        &cat_cols,
        &config.model_type,
        config.test_size,
        config.random_state,
        "Initial model",
    )
}

/// Hysteresis counter of consecutive triggering batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetrainState {
    pub consecutive_breach_count: usize,
}

impl RetrainState {
    pub fn observe(&mut self, trigger: bool) {
        if trigger {
            self.consecutive_breach_count += 1;
        } else {
            self.consecutive_breach_count = 0;
        }
    }

    pub fn reset(&mut self) {
        self.consecutive_breach_count = 0;
    }
}

/// Per window history of the monitored metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    /// JS divergence of every feature, `NaN` when undefined or absent.
    pub js_divergence: Vec<(String, Vec<f64>)>,
    pub data_drift: Vec<bool>,
    pub concept_drift: Vec<bool>,
}

impl History {
    fn new(features: &[String]) -> Self {
        History {
            js_divergence: features.iter().map(|f| (f.clone(), Vec::new())).collect(),
            data_drift: Vec::new(),
            concept_drift: Vec::new(),
        }
    }

    pub fn windows(&self) -> usize {
        self.data_drift.len()
    }
}

/// Everything the loop mutates between batches.
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub baseline: Frame,
    pub model: Option<Classifier>,
    pub retrain: RetrainState,
    pub history: History,
}

/// Batch level drift flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchVerdict {
    pub data_drift: bool,
    pub concept_drift: bool,
    pub trigger: bool,
}

/// A completed retrain.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrainEvent {
    pub window: usize,
    /// The flag that caused the retrain, `either` when neither was set.
    pub reason: RetrainOn,
    pub path: PathBuf,
    pub version: ModelVersion,
}

/// Result of one step of the loop.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub index: usize,
    pub source: String,
    pub reports: Vec<(String, DriftReport)>,
    pub verdict: BatchVerdict,
    /// Error bits fed to the concept detector before it fired or the batch ended.
    pub rows_checked: usize,
    pub consecutive_breach_count: usize,
    pub retrain: Option<RetrainEvent>,
}

/// Totals of a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub windows: usize,
    pub data_drift_windows: usize,
    pub concept_drift_windows: usize,
    pub retrains: Vec<RetrainEvent>,
}

pub struct Monitor {
    config: MonitorConfig,
    numeric_cols: Vec<String>,
    cat_cols: Vec<String>,
    registry: ModelRegistry,
    detector: ConceptDriftDetector,
    alerts: Box<dyn AlertSink>,
    chart: Box<dyn ChartSink>,
    last_index: usize,
    state: MonitorState,
}

impl Monitor {
    /// Set up a run over `baseline`.
    ///
    /// Fails on invalid configuration or an empty baseline. The latest
    /// registered model is loaded when there is one; without it concept
    /// drift is not checked until the first retrain.
    pub fn new(
        config: MonitorConfig,
        baseline: Frame,
        alerts: Box<dyn AlertSink>,
        chart: Box<dyn ChartSink>,
    ) -> Result<Self, DriftWatchError> {
        config.validate()?;
        let detector = ConceptDriftDetector::new(&config.concept_drift)?;
        if baseline.is_empty() {
            return Err(DriftWatchError::DataUnavailable("baseline has no rows".to_string()));
        }
        let (numeric_cols, cat_cols) = present_columns(&config, &baseline);
        let registry = ModelRegistry::new(&config.models_dir);
        let model = registry.load_latest_model()?;
        if model.is_none() {
            warn!(
                "No model found in {}. Train one with init_model first.",
                registry.dir().display()
            );
        }
        let features: Vec<String> = numeric_cols.iter().chain(&cat_cols).cloned().collect();
        info!(
            "Monitoring {} features with the {} detector",
            features.len(),
            detector.effective_variant()
        );
        Ok(Monitor {
            config,
            numeric_cols,
            cat_cols,
            registry,
            detector,
            alerts,
            chart,
            last_index: 0,
            state: MonitorState {
                baseline,
                model,
                retrain: RetrainState::default(),
                history: History::new(&features),
            },
        })
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn detector(&self) -> &ConceptDriftDetector {
        &self.detector
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Copy of `frame` where every column that is numeric in the baseline is
    /// numeric too. Cells that do not parse are read as missing.
    fn conform(&self, frame: &Frame) -> Result<Frame, DriftWatchError> {
        let mut conformed = frame.clone();
        for name in self.state.baseline.names() {
            let mismatched = matches!(
                (self.state.baseline.column(name), frame.column(name)),
                (Some(Column::Numeric(_)), Some(Column::Categorical(_)))
            );
            if mismatched {
                let unparsed = conformed.coerce_numeric(name)?;
                if unparsed > 0 {
                    warn!(
                        "Column {} has {} non numeric values, treated as missing",
                        name, unparsed
                    );
                }
            }
        }
        Ok(conformed)
    }

    fn feature_reports(&self, frame: &Frame) -> Vec<(String, DriftReport)> {
        let baseline = &self.state.baseline;
        let thresholds = &self.config.thresholds;
        let mut reports = Vec::new();
        for name in &self.numeric_cols {
            match (baseline.column(name), frame.column(name)) {
                (Some(Column::Numeric(b)), Some(Column::Numeric(c))) => {
                    reports.push((name.clone(), compute_numeric_drift(b, c, thresholds)));
                }
                (Some(_), Some(_)) => warn!("Feature {} is not numeric in the baseline, skipped", name),
                _ => debug!("Feature {} is absent from the batch", name),
            }
        }
        for name in &self.cat_cols {
            if let (Some(b), Some(c)) = (baseline.column(name), frame.column(name)) {
                let report = compute_categorical_drift(&b.to_categories(), &c.to_categories(), thresholds);
                reports.push((name.clone(), report));
            }
        }
        reports
    }

    /// Feed the model's errors on `frame` to the detector, stopping at the
    /// first detected change. Returns the flag and the rows fed.
    fn check_concept(&mut self, frame: &Frame) -> Result<(bool, usize), DriftWatchError> {
        let model = match &self.state.model {
            Some(m) if self.config.concept_drift.enabled && frame.has_column(&self.config.target) => m,
            _ => return Ok((false, 0)),
        };
        let y = frame.labels(&self.config.target)?;
        let y_pred = model.predict(frame)?;
        let mut fed = 0;
        for (pred, label) in y_pred.iter().zip(&y) {
            fed += 1;
            if self.detector.update(u8::from(pred != label)).change_detected {
                return Ok((true, fed));
            }
        }
        Ok((false, fed))
    }

    /// Rebuild the baseline, fit and register a model, then swap both in.
    /// Nothing in the state changes when any step fails.
    fn retrain(&mut self, window: usize, frame: &Frame, verdict: &BatchVerdict) -> Result<RetrainEvent, DriftWatchError> {
        let reason = if verdict.data_drift {
            RetrainOn::DataDrift
        } else if verdict.concept_drift {
            RetrainOn::ConceptDrift
        } else {
            RetrainOn::Either
        };
        let baseline = match self.config.strategy {
            RetrainStrategy::Append => self.state.baseline.append(frame)?,
            RetrainStrategy::Replace => frame.clone(),
        };
        let (path, version) = self.registry.train_and_save(
            &baseline,
            &self.config.target,
            &self.numeric_cols,
            &self.cat_cols,
            &self.config.model_type,
            self.config.test_size,
            self.config.random_state,
            &format!("Auto-retrain due to {} at window {}", reason, window),
        )?;
        let model = self.registry.load_model(version.version)?;

        self.state.baseline = baseline;
        self.state.model = Some(model);
        self.state.retrain.reset();
        info!(
            "Retrained on {} rows after {} at window {}",
            self.state.baseline.n_rows(),
            reason,
            window
        );
        self.alerts.notify(
            "Auto-Retraining Triggered",
            &format!("Reason: {} at window {}\nNew model: {}", reason, window, path.display()),
        );
        Ok(RetrainEvent {
            window,
            reason,
            path,
            version,
        })
    }

    fn record_history(&mut self, reports: &[(String, DriftReport)], verdict: &BatchVerdict) {
        let history = &mut self.state.history;
        for (name, series) in history.js_divergence.iter_mut() {
            let js = reports
                .iter()
                .find(|(n, _)| n == name)
                .and_then(|(_, r)| r.js_divergence)
                .unwrap_or(f64::NAN);
            series.push(js);
        }
        history.data_drift.push(verdict.data_drift);
        history.concept_drift.push(verdict.concept_drift);

        let js_threshold = Some(self.config.thresholds.js_divergence_gt);
        for (name, series) in &history.js_divergence {
            self.chart.record_series(&format!("js_{}", name), series, js_threshold);
        }
        let flags = |v: &[bool]| -> Vec<f64> { v.iter().map(|&b| f64::from(u8::from(b))).collect() };
        self.chart
            .record_series("data_drift_flags", &flags(&history.data_drift), None);
        self.chart
            .record_series("concept_drift_flags", &flags(&history.concept_drift), None);
    }

    /// Run one step of the loop on `batch`.
    ///
    /// Batches must arrive with strictly increasing indices. A failed
    /// retrain returns its error and keeps the previous baseline and model,
    /// with the counter still at its triggered value.
    pub fn process_batch(&mut self, batch: &Batch) -> Result<BatchOutcome, DriftWatchError> {
        if batch.index <= self.last_index {
            return Err(DriftWatchError::InvalidData(format!(
                "batch {} arrived after batch {}",
                batch.index, self.last_index
            )));
        }
        self.last_index = batch.index;

        let frame = self.conform(&batch.frame)?;
        let reports = self.feature_reports(&frame);
        let data_drift = summarize_breaches(reports.iter().map(|(_, r)| r), self.config.aggregate_rule);
        let (concept_drift, rows_checked) = self.check_concept(&frame)?;
        let trigger = self.config.retrain_on.trigger(data_drift, concept_drift);
        let verdict = BatchVerdict {
            data_drift,
            concept_drift,
            trigger,
        };
        let js: Vec<f64> = reports
            .iter()
            .map(|(_, r)| r.js_divergence.unwrap_or(f64::NAN))
            .collect();
        info!(
            "Window {} ({}): data drift {} | concept drift {} | js [{}]",
            batch.index,
            batch.source,
            data_drift,
            concept_drift,
            fmt_vec_output(&js)
        );

        self.state.retrain.observe(trigger);
        let consecutive_breach_count = self.state.retrain.consecutive_breach_count;
        let retrain = if self.config.retrain_enabled && consecutive_breach_count >= self.config.min_drift_windows {
            Some(self.retrain(batch.index, &frame, &verdict)?)
        } else {
            None
        };

        self.record_history(&reports, &verdict);
        Ok(BatchOutcome {
            index: batch.index,
            source: batch.source.clone(),
            reports,
            verdict,
            rows_checked,
            consecutive_breach_count,
            retrain,
        })
    }

    /// Process every batch of `source` in order.
    ///
    /// Fails with `DataUnavailable` when the source has no batches. Sends a
    /// summary alert at the end when any window drifted.
    pub fn run<S: BatchSource + ?Sized>(&mut self, source: &S) -> Result<RunSummary, DriftWatchError> {
        let mut retrains = Vec::new();
        let mut windows = 0;
        for batch in source.batches()? {
            let outcome = self.process_batch(&batch?)?;
            windows += 1;
            if let Some(event) = outcome.retrain {
                retrains.push(event);
            }
        }
        if windows == 0 {
            return Err(DriftWatchError::DataUnavailable("no batches found in the source".to_string()));
        }

        let history = &self.state.history;
        let summary = RunSummary {
            windows,
            data_drift_windows: history.data_drift.iter().filter(|&&d| d).count(),
            concept_drift_windows: history.concept_drift.iter().filter(|&&d| d).count(),
            retrains,
        };
        if summary.data_drift_windows > 0 || summary.concept_drift_windows > 0 {
            self.alerts.notify(
                "Drift Monitoring Summary",
                &format!(
                    "Data drift windows: {}/{} | Concept drift windows: {}/{}",
                    summary.data_drift_windows,
                    history.windows(),
                    summary.concept_drift_windows,
                    history.windows()
                ),
            );
        }
        Ok(summary)
    }
}
