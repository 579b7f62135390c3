//! Decision executor module
//!
//! Batch execution, aggregate statistics and boundary search.

mod batch;
mod boundary;
mod config;
mod decision_executor;
mod similarity;
mod stats;

pub use batch::{ExecutedBatch, ExecutionResult};
pub use boundary::{BoundaryIndex, BoundaryPair, DecisionTransition};
pub use config::ExecutorConfig;
pub use decision_executor::DecisionExecutor;
pub use similarity::ConflictPair;
pub use stats::{BatchStats, ExecutionSummary, RuleActivation};
