//! Audit trail types
//!
//! These structures capture every condition of every evaluated rule, whether
//! or not it changed the chain's value, so a trail explains what would have
//! mattered for a different record.

use faultline_core::{Condition, Connective, Value};
use serde::{Deserialize, Serialize};

/// Trace of a single condition evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionTrace {
    /// Position of the condition within its rule
    pub index: usize,

    /// The condition rendered as text (e.g., "credit_score > 700")
    pub expression: String,

    pub feature: String,

    /// The operator symbol
    pub operator: String,

    /// The record's value, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,

    /// The condition evaluated false because the feature was absent
    #[serde(default)]
    pub missing: bool,

    /// The evaluation result
    pub result: bool,

    /// Connective joining this condition to the next
    pub connective: Connective,
}

impl ConditionTrace {
    /// Create a condition trace
    pub fn new(index: usize, condition: &Condition, actual: Option<Value>, result: bool) -> Self {
        Self {
            index,
            expression: condition.to_string(),
            feature: condition.feature.clone(),
            operator: condition.operator.symbol().to_string(),
            missing: actual.is_none(),
            actual,
            result,
            connective: condition.connective,
        }
    }
}

/// Trace of a single rule evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTrace {
    /// The rule ID
    pub rule_id: String,

    pub rule_name: String,

    pub priority: i32,

    /// Whether the full condition chain was true
    pub matched: bool,

    pub stop_on_match: bool,

    /// Detailed condition evaluation traces, in declaration order
    pub conditions: Vec<ConditionTrace>,
}

impl RuleTrace {
    /// Create a new rule trace
    pub fn new(rule_id: impl Into<String>, rule_name: impl Into<String>, priority: i32) -> Self {
        Self {
            rule_id: rule_id.into(),
            rule_name: rule_name.into(),
            priority,
            matched: false,
            stop_on_match: false,
            conditions: Vec::new(),
        }
    }

    /// Add a condition trace
    pub fn add_condition(mut self, condition: ConditionTrace) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Set the match outcome
    pub fn with_matched(mut self, matched: bool, stop_on_match: bool) -> Self {
        self.matched = matched;
        self.stop_on_match = stop_on_match;
        self
    }
}

/// Ordered record of one decision
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditTrail {
    /// Every evaluated rule, in evaluation order
    pub rules: Vec<RuleTrace>,

    /// No rule fired and the default decision was used
    pub no_match: bool,

    /// Evaluation ended on a stopping rule
    pub stopped_early: bool,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, trace: RuleTrace) {
        self.rules.push(trace);
    }

    /// Ids of every rule that fired, in order
    pub fn fired(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|r| r.matched)
            .map(|r| r.rule_id.as_str())
    }

    pub fn rule(&self, rule_id: &str) -> Option<&RuleTrace> {
        self.rules.iter().find(|r| r.rule_id == rule_id)
    }
}
