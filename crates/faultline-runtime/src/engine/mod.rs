//! Rule engine module
//!
//! Provides the deterministic evaluator of a rule set against one record.

mod operators;
mod record;
mod rule_engine;
mod state;


pub use record::Record;
pub use rule_engine::{evaluate, RuleEngine};
pub use state::EvalState;
