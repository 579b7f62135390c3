//! Runtime error types

use thiserror::Error;

/// Runtime error
///
/// Raised per evaluation. The executor captures these on the affected
/// scenario's result instead of aborting the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// An ordering operator was applied to values that cannot be ordered
    #[error(
        "Type mismatch in rule '{rule_id}' condition #{condition} on feature '{feature}': {message}"
    )]
    TypeMismatch {
        rule_id: String,
        condition: usize,
        feature: String,
        message: String,
    },

    /// A feature the executor requires is absent from the scenario
    #[error("Missing required feature: {0}")]
    MissingFeature(String),

    /// NaN or infinite feature value
    #[error("Non-finite value for feature '{feature}': {value}")]
    NonFiniteValue { feature: String, value: f64 },

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
