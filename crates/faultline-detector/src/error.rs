//! Detector error types

use faultline_core::CoreError;
use faultline_runtime::RuntimeError;
use thiserror::Error;

/// Detector error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    /// Too few usable rows for the requested analysis
    #[error("Insufficient data for {stage}: need at least {required} rows, got {actual}")]
    InsufficientData {
        stage: String,
        required: usize,
        actual: usize,
    },

    /// An algorithm cannot run on this input (constant or non-finite data)
    #[error("Degenerate input for {algorithm}: {message}")]
    Degenerate { algorithm: String, message: String },

    /// Invalid detector parameter
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Scenario generation failed
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Evaluation failed
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl DetectorError {
    pub fn insufficient(stage: impl Into<String>, required: usize, actual: usize) -> Self {
        DetectorError::InsufficientData {
            stage: stage.into(),
            required,
            actual,
        }
    }

    pub fn degenerate(algorithm: impl Into<String>, message: impl Into<String>) -> Self {
        DetectorError::Degenerate {
            algorithm: algorithm.into(),
            message: message.into(),
        }
    }
}

/// Result type for detector operations
pub type Result<T> = std::result::Result<T, DetectorError>;
