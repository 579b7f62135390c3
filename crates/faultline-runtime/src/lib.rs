//! Faultline Runtime - Rule engine and decision executor
//!
//! This crate evaluates validated rule sets against input records and runs
//! whole scenario batches through them, collecting audit trails, activation
//! statistics and decision-boundary pairs.

pub mod engine;
pub mod error;
pub mod executor;
pub mod result;

// Re-export main types
pub use engine::{evaluate, EvalState, Record, RuleEngine};
pub use error::{Result, RuntimeError};
pub use executor::{
    BoundaryIndex, BoundaryPair, ConflictPair, DecisionExecutor, DecisionTransition,
    ExecutedBatch, ExecutionResult, ExecutionSummary, ExecutorConfig, RuleActivation,
};
pub use result::{AuditTrail, ConditionTrace, Evaluation, RuleTrace};
