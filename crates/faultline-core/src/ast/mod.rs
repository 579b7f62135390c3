//! Abstract Syntax Tree (AST) definitions for Faultline
//!
//! This module contains the AST node definitions for:
//! - Operators
//! - Rules, conditions and decisions
//! - Rule sets
//! - The external rule-set document

pub mod document;
pub mod operator;
pub mod rule;
pub mod ruleset;

pub use document::{ConditionDocument, DecisionDocument, RuleDocument, RuleSetDocument};
pub use operator::Operator;
pub use rule::{Condition, ConditionValue, Connective, Decision, Rule};
pub use ruleset::{RuleSet, RuleSetBuilder, RuleSetSummary};
