//! SDK error types

use faultline_core::CoreError;
use faultline_detector::DetectorError;
use faultline_runtime::RuntimeError;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Rule set, feature space or generator error
    #[error("Definition error: {0}")]
    CoreError(#[from] CoreError),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] RuntimeError),

    /// Detector error
    #[error("Detector error: {0}")]
    DetectorError(#[from] DetectorError),

    /// Report serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
