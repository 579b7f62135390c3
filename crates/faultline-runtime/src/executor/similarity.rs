//! Similar-input conflict search

use super::config::ExecutorConfig;
use super::ExecutionResult;
use faultline_core::{Scenario, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Two similar scenarios with different outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictPair {
    pub first: usize,
    pub second: usize,
    pub first_id: String,
    pub second_id: String,
    pub first_outcome: String,
    pub second_outcome: String,
    pub first_rule: Option<String>,
    pub second_rule: Option<String>,
    /// Mean relative feature difference
    pub distance: f64,
    /// Mean per-feature similarity in [0, 1]
    pub similarity: f64,
}

/// Relative difference of two numbers, scaled by the larger magnitude
fn relative_diff(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale == 0.0 {
        0.0
    } else {
        (a - b).abs() / scale
    }
}

/// (mean relative difference, mean similarity) over shared features
fn compare(a: &Scenario, b: &Scenario) -> Option<(f64, f64)> {
    let mut diff = 0.0;
    let mut count = 0usize;
    for (name, va) in &a.values {
        let Some(vb) = b.values.get(name) else {
            continue;
        };
        count += 1;
        diff += match (va, vb) {
            (Value::Number(x), Value::Number(y)) => relative_diff(*x, *y),
            _ if va.loose_eq(vb) => 0.0,
            _ => 1.0,
        };
    }
    (count > 0).then(|| {
        let distance = diff / count as f64;
        (distance, 1.0 - distance.min(1.0))
    })
}

/// Sort key placing similar scenarios near each other
fn projection(scenario: &Scenario, spans: &BTreeMap<String, f64>) -> f64 {
    scenario
        .values
        .iter()
        .filter_map(|(name, v)| match v {
            Value::Number(x) if x.is_finite() => {
                let span = spans.get(name).copied().filter(|s| *s > 0.0).unwrap_or(1.0);
                Some(x / span)
            }
            _ => None,
        })
        .sum()
}

pub(crate) fn find_conflicts(
    results: &[ExecutionResult],
    threshold: f64,
    spans: &BTreeMap<String, f64>,
    config: &ExecutorConfig,
) -> Vec<ConflictPair> {
    let mut candidates: Vec<&ExecutionResult> =
        results.iter().filter(|r| r.evaluation.is_some()).collect();

    let window = if candidates.len() <= config.full_scan_limit {
        candidates.len()
    } else {
        candidates.sort_by(|a, b| {
            projection(&a.scenario, spans)
                .total_cmp(&projection(&b.scenario, spans))
                .then(a.index.cmp(&b.index))
        });
        config.neighbor_radius.max(1)
    };

    let mut conflicts = Vec::new();
    for i in 0..candidates.len() {
        let upper = (i + 1 + window).min(candidates.len());
        for j in (i + 1)..upper {
            let (a, b) = (candidates[i], candidates[j]);
            let (Some(ea), Some(eb)) = (&a.evaluation, &b.evaluation) else {
                continue;
            };
            if ea.decision.outcome == eb.decision.outcome {
                continue;
            }
            let Some((distance, similarity)) = compare(&a.scenario, &b.scenario) else {
                continue;
            };
            if distance <= threshold {
                let (lo, hi) = if a.index <= b.index { (a, b) } else { (b, a) };
                let (elo, ehi) = if a.index <= b.index { (ea, eb) } else { (eb, ea) };
                conflicts.push(ConflictPair {
                    first: lo.index,
                    second: hi.index,
                    first_id: lo.scenario.id.clone(),
                    second_id: hi.scenario.id.clone(),
                    first_outcome: elo.decision.outcome.clone(),
                    second_outcome: ehi.decision.outcome.clone(),
                    first_rule: elo.decided_by.clone(),
                    second_rule: ehi.decided_by.clone(),
                    distance,
                    similarity,
                });
            }
        }
    }
    conflicts.sort_by_key(|c| (c.first, c.second));
    conflicts
}
