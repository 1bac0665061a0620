mod constants;

// Modules
pub mod alert;
pub mod chart;
pub mod concept;
pub mod data;
pub mod drift;
pub mod errors;
pub mod ingestion;
pub mod metric;
pub mod model;
pub mod monitor;
pub mod registry;
pub mod synthetic;
pub mod utils;

// Individual classes, and functions
pub use concept::{ConceptDriftConfig, ConceptDriftDetector, DetectorVariant};
pub use data::{Batch, Column, Frame};
pub use drift::{compute_categorical_drift, compute_numeric_drift, summarize_breaches, DriftReport};
pub use errors::DriftWatchError;
pub use model::{Classifier, ModelIO};
pub use monitor::{init_model, Monitor, MonitorConfig};
pub use registry::{ModelRegistry, ModelVersion};
