//! Errors
//!
//! Custom error types used throughout the `driftwatch` crate.
use thiserror::Error;

/// Errors that can occur while monitoring, training or versioning models.
#[derive(Debug, Error)]
pub enum DriftWatchError {
    /// Unsupported detector variant, model type or other invalid setting.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Baseline or batches are not available, the run cannot start.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
    /// The data cannot be used for the requested operation.
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Unable to write an artifact, registry row or series to file.
    #[error("Unable to write to file: {0}")]
    UnableToWrite(String),
    /// Unable to read an artifact, registry or batch from file.
    #[error("Unable to read from file {0}")]
    UnableToRead(String),
}
