//! Decision-boundary search
//!
//! A boundary pair is two scenarios whose feature maps agree everywhere
//! except one numeric feature, where they differ by less than that feature's
//! epsilon, yet resolve to different outcomes.

use super::config::ExecutorConfig;
use super::ExecutionResult;
use faultline_core::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Two adjacent scenarios on opposite sides of a decision boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPair {
    /// Batch index of the scenario with the lower value
    pub first: usize,
    pub second: usize,
    pub first_id: String,
    pub second_id: String,
    /// The one feature the scenarios differ in
    pub feature: String,
    pub first_value: f64,
    pub second_value: f64,
    pub delta: f64,
    pub first_outcome: String,
    pub second_outcome: String,
}

/// All boundary pairs of a batch plus the search effort
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryIndex {
    pub pairs: Vec<BoundaryPair>,
    /// Candidate pairs compared
    pub examined: usize,
}

impl BoundaryIndex {
    /// `pairs / examined`, 0 when nothing was examined
    pub fn density(&self) -> f64 {
        if self.examined == 0 {
            0.0
        } else {
            self.pairs.len() as f64 / self.examined as f64
        }
    }
}

/// One outcome change along a sorted sweep of a feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTransition {
    pub feature: String,
    pub value_before: f64,
    pub value_after: f64,
    pub gap: f64,
    pub outcome_before: String,
    pub outcome_after: String,
    pub rule_before: Option<String>,
    pub rule_after: Option<String>,
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) if n.is_finite() => Some(*n),
        _ => None,
    }
}

/// Key identifying every feature except `skip`
fn rest_key(values: &BTreeMap<String, Value>, skip: &str) -> String {
    values
        .iter()
        .filter(|(name, _)| name.as_str() != skip)
        .map(|(name, value)| format!("{}={}", name, value.canonical_key()))
        .collect::<Vec<_>>()
        .join(";")
}

pub(crate) fn find_boundary_pairs<F>(
    results: &[ExecutionResult],
    epsilon_for: F,
    config: &ExecutorConfig,
) -> BoundaryIndex
where
    F: Fn(&str) -> f64,
{
    // (varying feature, key of the rest) -> (result position, value)
    let mut groups: BTreeMap<(String, String), Vec<(usize, f64)>> = BTreeMap::new();
    for (pos, result) in results.iter().enumerate() {
        if result.evaluation.is_none() {
            continue;
        }
        let values = &result.scenario.values;
        for (feature, value) in values {
            if let Some(x) = numeric(value) {
                groups
                    .entry((feature.clone(), rest_key(values, feature)))
                    .or_default()
                    .push((pos, x));
            }
        }
    }

    let mut index = BoundaryIndex::default();
    for ((feature, _), mut members) in groups {
        if members.len() < 2 {
            continue;
        }
        members.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        let epsilon = epsilon_for(&feature);
        let window = if members.len() <= config.full_scan_limit {
            members.len()
        } else {
            config.neighbor_radius.max(1)
        };

        for i in 0..members.len() {
            let upper = (i + 1 + window).min(members.len());
            for j in (i + 1)..upper {
                index.examined += 1;
                let (pa, va) = members[i];
                let (pb, vb) = members[j];
                let delta = vb - va;
                if delta <= 0.0 || delta >= epsilon {
                    continue;
                }
                let (Some(ea), Some(eb)) = (&results[pa].evaluation, &results[pb].evaluation) else {
                    continue;
                };
                if ea.decision.outcome != eb.decision.outcome {
                    index.pairs.push(BoundaryPair {
                        first: results[pa].index,
                        second: results[pb].index,
                        first_id: results[pa].scenario.id.clone(),
                        second_id: results[pb].scenario.id.clone(),
                        feature: feature.clone(),
                        first_value: va,
                        second_value: vb,
                        delta,
                        first_outcome: ea.decision.outcome.clone(),
                        second_outcome: eb.decision.outcome.clone(),
                    });
                }
            }
        }
    }

    index
        .pairs
        .sort_by_key(|p| (p.first.min(p.second), p.first.max(p.second)));
    tracing::debug!(
        "Boundary search examined {} pairs, found {}",
        index.examined,
        index.pairs.len()
    );
    index
}

pub(crate) fn decision_transitions(
    results: &[ExecutionResult],
    feature: &str,
) -> Vec<DecisionTransition> {
    let mut points: Vec<(f64, &ExecutionResult)> = results
        .iter()
        .filter(|r| r.evaluation.is_some())
        .filter_map(|r| r.scenario.get(feature).and_then(numeric).map(|x| (x, r)))
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.index.cmp(&b.1.index)));

    points
        .windows(2)
        .filter_map(|w| {
            let (vb, before) = w[0];
            let (va, after) = w[1];
            let eb = before.evaluation.as_ref()?;
            let ea = after.evaluation.as_ref()?;
            (eb.decision.outcome != ea.decision.outcome).then(|| DecisionTransition {
                feature: feature.to_string(),
                value_before: vb,
                value_after: va,
                gap: va - vb,
                outcome_before: eb.decision.outcome.clone(),
                outcome_after: ea.decision.outcome.clone(),
                rule_before: eb.decided_by.clone(),
                rule_after: ea.decided_by.clone(),
            })
        })
        .collect()
}
