//! Faultline Core - Core types and definitions for the Faultline stress-testing engine
//!
//! This crate provides the fundamental types shared by every Faultline component:
//! - Value types for scenario and condition data
//! - Rule AST definitions (rule sets, rules, conditions, decisions)
//! - The external rule-set document shape and its load-time validation
//! - Feature-space declarations and scenarios
//! - Error types

pub mod ast;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use ast::{
    Condition, ConditionValue, Connective, Decision, Operator, Rule, RuleSet, RuleSetDocument,
    RuleSetSummary,
};
pub use error::{CoreError, Result};
pub use types::{
    Distribution, FeatureKind, FeatureSpec, Perturbation, PerturbationMode, Scenario,
    ScenarioStrategy, Value,
};
