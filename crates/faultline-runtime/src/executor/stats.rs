//! Batch aggregates
//!
//! Counters are folded in one result at a time, in batch order, by the
//! executor that owns the batch.

use super::ExecutionResult;
use faultline_core::RuleSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running aggregates of one batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub executed: usize,
    pub errors: usize,
    /// Scenarios resolved by the default decision
    pub default_resolved: usize,
    /// Times each rule fired (deciding or not)
    pub rule_fired: BTreeMap<String, usize>,
    /// Times each rule produced the final decision
    pub rule_decided: BTreeMap<String, usize>,
    /// Final outcomes, seeded with every declared outcome
    pub outcome_counts: BTreeMap<String, usize>,
    pub confidence_sum: f64,
    pub confidence_sq_sum: f64,
}

impl BatchStats {
    /// Empty aggregates with declared rules and outcomes at zero
    pub fn for_ruleset(ruleset: &RuleSet) -> Self {
        let mut stats = Self::default();
        for rule in ruleset.rules() {
            stats.rule_fired.insert(rule.id.clone(), 0);
            stats.rule_decided.insert(rule.id.clone(), 0);
        }
        for outcome in ruleset.outcomes() {
            stats.outcome_counts.insert(outcome, 0);
        }
        stats
    }

    /// Fold one result in
    pub fn record(&mut self, result: &ExecutionResult) {
        self.total += 1;
        let Some(eval) = &result.evaluation else {
            self.errors += 1;
            return;
        };
        self.executed += 1;

        for rule_id in eval.trail.fired() {
            *self.rule_fired.entry(rule_id.to_string()).or_insert(0) += 1;
        }
        match &eval.decided_by {
            Some(rule_id) => *self.rule_decided.entry(rule_id.clone()).or_insert(0) += 1,
            None => self.default_resolved += 1,
        }
        *self
            .outcome_counts
            .entry(eval.decision.outcome.clone())
            .or_insert(0) += 1;

        let c = eval.decision.confidence;
        self.confidence_sum += c;
        self.confidence_sq_sum += c * c;
    }

    pub fn mean_confidence(&self) -> f64 {
        if self.executed == 0 {
            0.0
        } else {
            self.confidence_sum / self.executed as f64
        }
    }

    /// Population variance of decision confidence
    pub fn confidence_variance(&self) -> f64 {
        if self.executed == 0 {
            return 0.0;
        }
        let n = self.executed as f64;
        let mean = self.confidence_sum / n;
        (self.confidence_sq_sum / n - mean * mean).max(0.0)
    }

    pub fn coverage_gap_rate(&self) -> f64 {
        if self.executed == 0 {
            0.0
        } else {
            self.default_resolved as f64 / self.executed as f64
        }
    }
}

/// Activation statistics of one rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleActivation {
    pub rule_id: String,
    pub rule_name: String,
    pub priority: i32,
    /// Outcome the rule decides
    pub outcome: String,
    pub fired: usize,
    pub decided: usize,
    /// `fired / executed`
    pub fire_rate: f64,
    /// `decided / executed`
    pub decision_rate: f64,
}

pub(crate) fn rule_activations(ruleset: &RuleSet, stats: &BatchStats) -> Vec<RuleActivation> {
    let executed = stats.executed.max(1) as f64;
    let mut activations: Vec<RuleActivation> = ruleset
        .rules()
        .iter()
        .map(|rule| {
            let fired = stats.rule_fired.get(&rule.id).copied().unwrap_or(0);
            let decided = stats.rule_decided.get(&rule.id).copied().unwrap_or(0);
            RuleActivation {
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                priority: rule.priority,
                outcome: rule.decision.outcome.clone(),
                fired,
                decided,
                fire_rate: fired as f64 / executed,
                decision_rate: decided as f64 / executed,
            }
        })
        .collect();
    // Most active first; evaluation order breaks ties
    activations.sort_by(|a, b| b.fired.cmp(&a.fired));
    activations
}

/// Overview of an executed batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total: usize,
    pub executed: usize,
    pub errors: usize,
    pub default_resolved: usize,
    pub coverage_gap_rate: f64,
    pub mean_confidence: f64,
    pub outcome_counts: BTreeMap<String, usize>,
    /// Rules that never fired in this batch
    pub dormant_rules: Vec<String>,
}

impl ExecutionSummary {
    pub(crate) fn from_stats(stats: &BatchStats) -> Self {
        Self {
            total: stats.total,
            executed: stats.executed,
            errors: stats.errors,
            default_resolved: stats.default_resolved,
            coverage_gap_rate: stats.coverage_gap_rate(),
            mean_confidence: stats.mean_confidence(),
            outcome_counts: stats.outcome_counts.clone(),
            dormant_rules: stats
                .rule_fired
                .iter()
                .filter(|(_, count)| **count == 0)
                .map(|(id, _)| id.clone())
                .collect(),
        }
    }
}
