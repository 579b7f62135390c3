//! Error types for Faultline Core

use thiserror::Error;

/// Core error type
///
/// Raised once, when a rule set or feature space is constructed. None of these
/// are recoverable by the component that raised them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A rule or condition definition is malformed
    #[error("Validation error in rule '{rule_id}'{}: {message}", condition_suffix(.condition))]
    Validation {
        rule_id: String,
        condition: Option<usize>,
        message: String,
    },

    /// The rule-set document is structurally incomplete
    #[error("Schema error at '{field}': {message}")]
    Schema { field: String, message: String },

    /// A feature declaration or generator parameter is invalid
    #[error("Configuration error for '{target}': {message}")]
    Configuration { target: String, message: String },
}

fn condition_suffix(condition: &Option<usize>) -> String {
    match condition {
        Some(index) => format!(" condition #{}", index),
        None => String::new(),
    }
}

impl CoreError {
    /// Validation error attached to a whole rule
    pub fn rule(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation {
            rule_id: rule_id.into(),
            condition: None,
            message: message.into(),
        }
    }

    /// Validation error attached to one condition of a rule
    pub fn condition(rule_id: impl Into<String>, index: usize, message: impl Into<String>) -> Self {
        CoreError::Validation {
            rule_id: rule_id.into(),
            condition: Some(index),
            message: message.into(),
        }
    }

    /// Schema error for a missing or malformed document field
    pub fn schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Schema {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Configuration error for a feature or generator parameter
    pub fn configuration(target: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Configuration {
            target: target.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
