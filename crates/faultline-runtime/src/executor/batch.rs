//! Executed batches
//!
//! An [`ExecutedBatch`] owns the results of one executor run. Results are
//! read-only; derived statistics are computed on first request and memoized
//! on the batch itself.

use super::boundary::{self, BoundaryIndex, BoundaryPair, DecisionTransition};
use super::config::ExecutorConfig;
use super::similarity::{self, ConflictPair};
use super::stats::{self, BatchStats, ExecutionSummary, RuleActivation};
use crate::result::Evaluation;
use faultline_core::{RuleSet, Scenario};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Result of executing one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Position in the input batch
    pub index: usize,

    pub scenario: Scenario,

    /// Present when evaluation succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,

    /// Present when evaluation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn outcome(&self) -> Option<&str> {
        self.evaluation.as_ref().map(|e| e.outcome())
    }

    pub fn confidence(&self) -> Option<f64> {
        self.evaluation.as_ref().map(|e| e.confidence())
    }

    /// Rule that produced the final decision, if any
    pub fn decided_by(&self) -> Option<&str> {
        self.evaluation
            .as_ref()
            .and_then(|e| e.decided_by.as_deref())
    }
}

/// Results of one batch plus their aggregates
#[derive(Debug)]
pub struct ExecutedBatch {
    results: Vec<ExecutionResult>,
    stats: BatchStats,
    ruleset: Arc<RuleSet>,
    config: ExecutorConfig,
    /// Declared range width per feature, when the feature space is known
    spans: BTreeMap<String, f64>,
    activations: OnceLock<Vec<RuleActivation>>,
    boundaries: OnceLock<BoundaryIndex>,
}

impl ExecutedBatch {
    pub(crate) fn new(
        ruleset: Arc<RuleSet>,
        config: ExecutorConfig,
        spans: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            stats: BatchStats::for_ruleset(&ruleset),
            results: Vec::new(),
            ruleset,
            config,
            spans,
            activations: OnceLock::new(),
            boundaries: OnceLock::new(),
        }
    }

    /// Append a result and fold it into the aggregates
    pub(crate) fn push(&mut self, result: ExecutionResult) {
        self.stats.record(&result);
        self.results.push(result);
    }

    pub fn results(&self) -> &[ExecutionResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<ExecutionResult> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn ruleset(&self) -> &Arc<RuleSet> {
        &self.ruleset
    }

    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }

    pub fn spans(&self) -> &BTreeMap<String, f64> {
        &self.spans
    }

    /// Successfully evaluated results
    pub fn successes(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.iter().filter(|r| r.evaluation.is_some())
    }

    /// Results carrying an error
    pub fn errors(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.iter().filter(|r| r.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.stats.errors
    }

    pub fn outcome_counts(&self) -> &BTreeMap<String, usize> {
        &self.stats.outcome_counts
    }

    /// Epsilon used for boundary pairs along `feature`
    pub fn epsilon_for(&self, feature: &str) -> f64 {
        match self.spans.get(feature) {
            Some(span) if *span > 0.0 => self.config.relative_epsilon * span,
            _ => self.config.epsilon,
        }
    }

    /// Fire and decision rates per rule, most active first
    pub fn rule_activation_stats(&self) -> &[RuleActivation] {
        self.activations
            .get_or_init(|| stats::rule_activations(&self.ruleset, &self.stats))
    }

    /// Adjacent scenario pairs straddling a decision boundary
    pub fn boundary_pairs(&self) -> &[BoundaryPair] {
        &self.boundary_index().pairs
    }

    /// Boundary pairs together with the number of pairs examined
    pub fn boundary_index(&self) -> &BoundaryIndex {
        self.boundaries.get_or_init(|| {
            boundary::find_boundary_pairs(&self.results, |f| self.epsilon_for(f), &self.config)
        })
    }

    /// Share of each outcome among executed scenarios
    pub fn decision_distribution(&self) -> BTreeMap<String, f64> {
        let executed = self.stats.executed.max(1) as f64;
        self.stats
            .outcome_counts
            .iter()
            .map(|(outcome, count)| (outcome.clone(), *count as f64 / executed))
            .collect()
    }

    pub fn execution_summary(&self) -> ExecutionSummary {
        ExecutionSummary::from_stats(&self.stats)
    }

    /// Outcome changes along a sorted sweep of one feature
    pub fn decision_boundaries(&self, feature: &str) -> Vec<DecisionTransition> {
        boundary::decision_transitions(&self.results, feature)
    }

    /// Similar scenarios (mean relative difference ≤ `threshold`) with
    /// different outcomes
    pub fn conflicting_scenarios(&self, threshold: f64) -> Vec<ConflictPair> {
        similarity::find_conflicts(&self.results, threshold, &self.spans, &self.config)
    }
}
