//! Drift Detection Logic
//!
//! This module provides per feature data drift statistics comparing a batch
//! against the baseline, and the rule combining them into a batch decision.

pub mod calculation;
pub mod report;
pub mod stats;

pub use calculation::{compute_categorical_drift, compute_numeric_drift, summarize_breaches};
pub use report::{AggregateRule, DriftReport, DriftThresholds, FeatureKind};

#[cfg(test)]
mod tests;
