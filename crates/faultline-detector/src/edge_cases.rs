//! High-impact edge cases

use crate::anomaly::AnomalyResult;
use faultline_runtime::ExecutedBatch;
use serde::{Deserialize, Serialize};

const ANOMALY_WEIGHT: f64 = 0.5;
const EXTREMITY_WEIGHT: f64 = 0.3;
const RARITY_WEIGHT: f64 = 0.2;

/// A flagged scenario ranked by how much it matters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeCase {
    pub index: usize,
    pub scenario_id: String,
    pub outcome: String,
    pub confidence: f64,
    pub decided_by: Option<String>,
    pub anomaly_score: f64,
    /// Anomaly score min-max normalized over the batch
    pub normalized_score: f64,
    /// `|2c - 1|`: 1.0 for fully certain decisions, 0.0 for coin flips
    pub confidence_extremity: f64,
    /// One minus the outcome's share of executed scenarios
    pub rarity: f64,
    pub impact: f64,
}

/// Rank flagged anomalies by impact, highest first, keeping `top_k`
pub fn rank_edge_cases(batch: &ExecutedBatch, anomalies: &AnomalyResult, top_k: usize) -> Vec<EdgeCase> {
    let executed = batch.stats().executed.max(1) as f64;
    let counts = batch.outcome_counts();
    let normalized = anomalies.normalized_scores();
    let results = batch.results();

    let mut cases: Vec<EdgeCase> = anomalies
        .indices
        .iter()
        .enumerate()
        .filter(|(position, _)| anomalies.flagged[*position])
        .filter_map(|(position, &index)| {
            let result = &results[index];
            let evaluation = result.evaluation.as_ref()?;
            let confidence = evaluation.confidence();
            let outcome = evaluation.outcome().to_string();
            let share = counts.get(&outcome).copied().unwrap_or(0) as f64 / executed;

            let confidence_extremity = (2.0 * confidence - 1.0).abs();
            let rarity = 1.0 - share;
            let impact = ANOMALY_WEIGHT * normalized[position]
                + EXTREMITY_WEIGHT * confidence_extremity
                + RARITY_WEIGHT * rarity;

            Some(EdgeCase {
                index,
                scenario_id: result.scenario.id.clone(),
                outcome,
                confidence,
                decided_by: evaluation.decided_by.clone(),
                anomaly_score: anomalies.scores[position],
                normalized_score: normalized[position],
                confidence_extremity,
                rarity,
                impact,
            })
        })
        .collect();

    cases.sort_by(|a, b| b.impact.total_cmp(&a.impact).then(a.index.cmp(&b.index)));
    cases.truncate(top_k);
    cases
}
