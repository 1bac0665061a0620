//! Concept Drift
//!
//! Online change detectors over a binary prediction error stream. A
//! [`ConceptDriftDetector`] wraps one of the variants and is fed one error
//! bit at a time, in row order.
pub mod adwin;
#[cfg(feature = "ddm")]
pub mod ddm;
pub mod kswin;
pub mod page_hinkley;

use crate::errors::DriftWatchError;
use crate::utils::{
    items_to_strings, validate_float_parameter, validate_positive_float_parameter, validate_positive_int_parameter,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use adwin::Adwin;
#[cfg(feature = "ddm")]
pub use ddm::Ddm;
pub use kswin::Kswin;
pub use page_hinkley::PageHinkley;

/// Outcome of feeding one observation to a detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectorSignal {
    /// A change was detected at this observation. Can fire again later.
    pub change_detected: bool,
    /// Intermediate warning level, only reported by variants that have one.
    pub warning_detected: bool,
}

/// A stateful online change detector.
pub trait ChangeDetector {
    /// Consume the next observation in temporal order.
    fn update(&mut self, x: f64) -> DetectorSignal;
}

/// The available change detection algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorVariant {
    Adwin,
    Ddm,
    PageHinkley,
    Kswin,
}

impl DetectorVariant {
    /// Whether the variant reports warnings in addition to changes.
    pub fn supports_warning(&self) -> bool {
        matches!(self, DetectorVariant::Ddm)
    }

    /// Whether the variant is compiled into this build.
    pub fn is_available(&self) -> bool {
        match self {
            DetectorVariant::Ddm => cfg!(feature = "ddm"),
            _ => true,
        }
    }

    /// Variant used when this one is not available.
    pub fn fallback(&self) -> Option<DetectorVariant> {
        match self {
            DetectorVariant::Ddm => Some(DetectorVariant::PageHinkley),
            _ => None,
        }
    }

    /// The variant to run given which variants `available` reports, either
    /// this one or its fallback.
    pub fn resolve<F: Fn(DetectorVariant) -> bool>(self, available: F) -> Result<DetectorVariant, DriftWatchError> {
        if available(self) {
            return Ok(self);
        }
        match self.fallback().filter(|f| available(*f)) {
            Some(fallback) => {
                warn!("{} not available in this build. Falling back to {}.", self, fallback);
                Ok(fallback)
            }
            None => Err(DriftWatchError::Configuration(format!(
                "Detector {} is not available in this build",
                self
            ))),
        }
    }
}

impl FromStr for DetectorVariant {
    type Err = DriftWatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "adwin" => Ok(DetectorVariant::Adwin),
            "ddm" => Ok(DetectorVariant::Ddm),
            "pagehinkley" => Ok(DetectorVariant::PageHinkley),
            "kswin" => Ok(DetectorVariant::Kswin),
            _ => Err(DriftWatchError::ParseString(
                s.to_string(),
                "DetectorVariant".to_string(),
                items_to_strings(vec!["adwin", "ddm", "pagehinkley", "kswin"]),
            )),
        }
    }
}

impl fmt::Display for DetectorVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectorVariant::Adwin => "adwin",
            DetectorVariant::Ddm => "ddm",
            DetectorVariant::PageHinkley => "pagehinkley",
            DetectorVariant::Kswin => "kswin",
        };
        write!(f, "{}", name)
    }
}

fn default_enabled() -> bool {
    true
}
fn default_detector() -> String {
    "adwin".to_string()
}
fn default_adwin_delta() -> f64 {
    0.002
}
fn default_ddm_warning_level() -> f64 {
    2.0
}
fn default_ddm_out_control_level() -> f64 {
    3.0
}
fn default_kswin_alpha() -> f64 {
    0.005
}
fn default_kswin_window_size() -> usize {
    100
}
fn default_kswin_stat_size() -> usize {
    30
}
fn default_ph_delta() -> f64 {
    0.005
}
fn default_ph_lambda() -> f64 {
    50.0
}
fn default_ph_alpha() -> f64 {
    0.999
}

/// Concept drift settings: the detector name and the hyperparameters of every variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptDriftConfig {
    /// Run the detector on labelled batches.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// One of `adwin`, `ddm`, `pagehinkley`, `kswin`.
    #[serde(default = "default_detector")]
    pub detector: String,
    /// ADWIN confidence, smaller values make the detector less sensitive.
    #[serde(default = "default_adwin_delta")]
    pub adwin_delta: f64,
    #[serde(default = "default_ddm_warning_level")]
    pub ddm_warning_level: f64,
    #[serde(default = "default_ddm_out_control_level")]
    pub ddm_out_control_level: f64,
    #[serde(default = "default_kswin_alpha")]
    pub kswin_alpha: f64,
    #[serde(default = "default_kswin_window_size")]
    pub kswin_window_size: usize,
    #[serde(default = "default_kswin_stat_size")]
    pub kswin_stat_size: usize,
    /// Seed of the KSWIN reference sampler.
    #[serde(default)]
    pub kswin_seed: u64,
    #[serde(default = "default_ph_delta")]
    pub ph_delta: f64,
    #[serde(default = "default_ph_lambda")]
    pub ph_lambda: f64,
    #[serde(default = "default_ph_alpha")]
    pub ph_alpha: f64,
}

impl Default for ConceptDriftConfig {
    fn default() -> Self {
        ConceptDriftConfig {
            enabled: default_enabled(),
            detector: default_detector(),
            adwin_delta: default_adwin_delta(),
            ddm_warning_level: default_ddm_warning_level(),
            ddm_out_control_level: default_ddm_out_control_level(),
            kswin_alpha: default_kswin_alpha(),
            kswin_window_size: default_kswin_window_size(),
            kswin_stat_size: default_kswin_stat_size(),
            kswin_seed: 0,
            ph_delta: default_ph_delta(),
            ph_lambda: default_ph_lambda(),
            ph_alpha: default_ph_alpha(),
        }
    }
}

impl ConceptDriftConfig {
    /// Validate the hyperparameters of the selected variant.
    pub fn validate(&self, variant: DetectorVariant) -> Result<(), DriftWatchError> {
        match variant {
            DetectorVariant::Adwin => validate_float_parameter(self.adwin_delta, f64::MIN_POSITIVE, 1.0, "adwin_delta"),
            DetectorVariant::Ddm => {
                validate_positive_float_parameter(self.ddm_warning_level, "ddm_warning_level")?;
                validate_float_parameter(
                    self.ddm_out_control_level,
                    self.ddm_warning_level,
                    f64::INFINITY,
                    "ddm_out_control_level",
                )
            }
            DetectorVariant::PageHinkley => {
                validate_positive_float_parameter(self.ph_delta, "ph_delta")?;
                validate_positive_float_parameter(self.ph_lambda, "ph_lambda")?;
                validate_float_parameter(self.ph_alpha, 0.0, 1.0, "ph_alpha")
            }
            DetectorVariant::Kswin => {
                validate_float_parameter(self.kswin_alpha, 0.0, 1.0, "kswin_alpha")?;
                validate_positive_int_parameter(self.kswin_stat_size, "kswin_stat_size")?;
                if self.kswin_stat_size >= self.kswin_window_size {
                    return Err(DriftWatchError::InvalidParameter(
                        "kswin_stat_size".to_string(),
                        format!("value smaller than kswin_window_size ({})", self.kswin_window_size),
                        self.kswin_stat_size.to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Concept drift detector, one per monitoring run.
pub struct ConceptDriftDetector {
    requested: DetectorVariant,
    effective: DetectorVariant,
    inner: Box<dyn ChangeDetector>,
}

impl ConceptDriftDetector {
    /// Build the detector named in `config`.
    ///
    /// Fails with a configuration error for an unknown name or invalid
    /// hyperparameters. A variant missing from this build is replaced by
    /// its fallback, see [`ConceptDriftDetector::effective_variant`].
    pub fn new(config: &ConceptDriftConfig) -> Result<Self, DriftWatchError> {
        let requested = DetectorVariant::from_str(&config.detector)
            .map_err(|_| DriftWatchError::Configuration(format!("Unsupported detector: {}", config.detector)))?;
        let effective = requested.resolve(|v| v.is_available())?;
        config
            .validate(effective)
            .map_err(|e| DriftWatchError::Configuration(e.to_string()))?;

        let inner: Box<dyn ChangeDetector> = match effective {
            DetectorVariant::Adwin => Box::new(Adwin::new(config.adwin_delta)),
            #[cfg(feature = "ddm")]
            DetectorVariant::Ddm => Box::new(Ddm::new(config.ddm_warning_level, config.ddm_out_control_level)),
            #[cfg(not(feature = "ddm"))]
            DetectorVariant::Ddm => unreachable!("ddm is replaced by its fallback when not compiled in"),
            DetectorVariant::PageHinkley => Box::new(PageHinkley::new(config.ph_delta, config.ph_lambda, config.ph_alpha)),
            DetectorVariant::Kswin => Box::new(Kswin::new(
                config.kswin_alpha,
                config.kswin_window_size,
                config.kswin_stat_size,
                config.kswin_seed,
            )),
        };
        Ok(ConceptDriftDetector {
            requested,
            effective,
            inner,
        })
    }

    /// Variant named in the configuration.
    pub fn requested_variant(&self) -> DetectorVariant {
        self.requested
    }

    /// Variant actually running, which differs from the requested one
    /// after a fallback substitution.
    pub fn effective_variant(&self) -> DetectorVariant {
        self.effective
    }

    /// Feed one prediction error bit (`1` = wrong, `0` = right).
    pub fn update(&mut self, error_bit: u8) -> DetectorSignal {
        let mut signal = self.inner.update(f64::from(error_bit.min(1)));
        if !self.effective.supports_warning() {
            signal.warning_detected = false;
        }
        signal
    }
}

#[cfg(test)]
mod tests;
