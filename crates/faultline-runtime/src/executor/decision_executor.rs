//! Decision executor
//!
//! Runs the rule engine over scenario batches, strictly in input order,
//! containing per-scenario failures in the affected result.

use super::batch::{ExecutedBatch, ExecutionResult};
use super::config::ExecutorConfig;
use crate::engine::RuleEngine;
use crate::error::{Result, RuntimeError};
use crate::result::Evaluation;
use faultline_core::{FeatureSpec, RuleSet, Scenario, Value};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Batch executor over one immutable rule set
#[derive(Debug, Clone)]
pub struct DecisionExecutor {
    engine: RuleEngine,
    config: ExecutorConfig,
    /// Features every scenario must carry; empty means no requirement
    features: Arc<Vec<FeatureSpec>>,
}

impl DecisionExecutor {
    pub fn new(ruleset: impl Into<Arc<RuleSet>>) -> Self {
        Self {
            engine: RuleEngine::new(ruleset),
            config: ExecutorConfig::default(),
            features: Arc::new(Vec::new()),
        }
    }

    /// Set the configuration
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Declare the feature space: every feature becomes required and
    /// boundary epsilons scale with declared ranges
    pub fn with_feature_space(mut self, features: Vec<FeatureSpec>) -> Self {
        self.features = Arc::new(features);
        self
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn ruleset(&self) -> &Arc<RuleSet> {
        self.engine.ruleset()
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn feature_space(&self) -> &[FeatureSpec] {
        &self.features
    }

    /// Evaluate one scenario, checking required features first
    pub fn evaluate(&self, scenario: &Scenario) -> Result<Evaluation> {
        for spec in self.features.iter() {
            match scenario.get(&spec.name) {
                None | Some(Value::Null) => {
                    return Err(RuntimeError::MissingFeature(spec.name.clone()))
                }
                Some(_) => {}
            }
        }
        self.engine.evaluate(scenario)
    }

    /// Execute one scenario into a result; errors are captured in-band
    pub fn execute(&self, index: usize, scenario: Scenario) -> ExecutionResult {
        match self.evaluate(&scenario) {
            Ok(evaluation) => ExecutionResult {
                index,
                scenario,
                evaluation: Some(evaluation),
                error: None,
            },
            Err(e) => {
                tracing::debug!("Scenario '{}' failed: {}", scenario.id, e);
                ExecutionResult {
                    index,
                    scenario,
                    evaluation: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Execute a batch sequentially, in input order
    pub fn execute_batch(&self, scenarios: Vec<Scenario>) -> ExecutedBatch {
        let mut batch = self.empty_batch();
        for (index, scenario) in scenarios.into_iter().enumerate() {
            batch.push(self.execute(index, scenario));
        }
        self.log_batch(&batch);
        batch
    }

    /// Execute a batch split into `partitions` chunks on the rayon pool.
    ///
    /// Results are concatenated in original order, so the batch is identical
    /// to [`execute_batch`](Self::execute_batch) on the same input.
    pub fn execute_partitioned(&self, scenarios: Vec<Scenario>, partitions: usize) -> ExecutedBatch {
        let partitions = partitions.max(1);
        let chunk_size = scenarios.len().div_ceil(partitions).max(1);

        let mut chunks: Vec<Vec<(usize, Scenario)>> = Vec::with_capacity(partitions);
        let mut current = Vec::with_capacity(chunk_size);
        for item in scenarios.into_iter().enumerate() {
            current.push(item);
            if current.len() == chunk_size {
                chunks.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }

        let executed: Vec<Vec<ExecutionResult>> = chunks
            .into_par_iter()
            .map(|chunk| {
                chunk
                    .into_iter()
                    .map(|(index, scenario)| self.execute(index, scenario))
                    .collect()
            })
            .collect();

        let mut batch = self.empty_batch();
        for result in executed.into_iter().flatten() {
            batch.push(result);
        }
        self.log_batch(&batch);
        batch
    }

    fn empty_batch(&self) -> ExecutedBatch {
        let spans: BTreeMap<String, f64> = self
            .features
            .iter()
            .filter(|f| f.is_numeric())
            .map(|f| (f.name.clone(), f.span()))
            .collect();
        ExecutedBatch::new(Arc::clone(self.ruleset()), self.config.clone(), spans)
    }

    fn log_batch(&self, batch: &ExecutedBatch) {
        let stats = batch.stats();
        tracing::info!(
            "Executed {} scenarios against '{}': {} errors, {} default-resolved",
            stats.total,
            self.ruleset().name(),
            stats.errors,
            stats.default_resolved
        );
    }
}
