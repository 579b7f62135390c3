//! Evaluation results and audit trails

pub mod evaluation;
pub mod trace;

pub use evaluation::Evaluation;
pub use trace::{AuditTrail, ConditionTrace, RuleTrace};
