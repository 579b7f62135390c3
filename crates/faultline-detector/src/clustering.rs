//! Failure clustering
//!
//! Results matching a [`FailurePredicate`] are clustered in the standardized
//! feature space; each cluster is then summarized from the raw scenarios.

use crate::algorithms::Clusterer;
use crate::matrix::FeatureMatrix;
use faultline_core::Value;
use faultline_runtime::{ExecutedBatch, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which results count as failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailurePredicate {
    /// Outcomes that are failures outright
    pub outcomes: BTreeSet<String>,

    /// Decisions below this confidence are failures
    pub max_confidence: Option<f64>,

    /// Default-resolved results (no rule fired) are failures
    pub include_default: bool,
}

impl Default for FailurePredicate {
    fn default() -> Self {
        Self {
            outcomes: BTreeSet::new(),
            max_confidence: Some(0.5),
            include_default: true,
        }
    }
}

impl FailurePredicate {
    /// Failures are exactly the given outcomes
    pub fn outcomes<I, S>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outcomes: outcomes.into_iter().map(Into::into).collect(),
            max_confidence: None,
            include_default: false,
        }
    }

    pub fn with_max_confidence(mut self, threshold: f64) -> Self {
        self.max_confidence = Some(threshold);
        self
    }

    pub fn with_default(mut self, include: bool) -> Self {
        self.include_default = include;
        self
    }

    pub fn matches(&self, result: &ExecutionResult) -> bool {
        let Some(evaluation) = &result.evaluation else {
            return false;
        };
        self.outcomes.contains(evaluation.outcome())
            || self
                .max_confidence
                .is_some_and(|t| evaluation.confidence() < t)
            || (self.include_default && evaluation.is_default())
    }
}

/// A group of similar failing scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureCluster {
    pub cluster_id: usize,

    /// Batch indices of the members
    pub members: Vec<usize>,

    pub member_ids: Vec<String>,

    pub size: usize,

    /// Numeric features averaged, other features by mode
    pub centroid: BTreeMap<String, Value>,

    pub outcome_counts: BTreeMap<String, usize>,

    pub dominant_outcome: String,

    pub mean_confidence: f64,

    /// Rules that decided at least one member
    pub rules_involved: Vec<String>,
}

/// Outcome of clustering a batch's failures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusteringResult {
    pub clusters: Vec<FailureCluster>,

    /// Failures considered
    pub failures: usize,

    /// Failures left unclustered
    pub noise: usize,
}

impl ClusteringResult {
    pub fn clustered(&self) -> usize {
        self.clusters.iter().map(|c| c.size).sum()
    }
}

/// Cluster the failing rows of `matrix`. Too few failures, or a clusterer
/// error, yields no clusters.
pub fn cluster_failures(
    batch: &ExecutedBatch,
    matrix: &FeatureMatrix,
    predicate: &FailurePredicate,
    clusterer: &dyn Clusterer,
    min_failures: usize,
) -> ClusteringResult {
    let results = batch.results();
    let positions: Vec<usize> = (0..matrix.n_rows())
        .filter(|&p| predicate.matches(&results[matrix.batch_index(p)]))
        .collect();
    let failures = positions.len();

    if failures < min_failures {
        tracing::warn!(
            "Only {} failing scenarios, need {} to cluster; no clusters reported",
            failures,
            min_failures
        );
        return ClusteringResult {
            clusters: Vec::new(),
            failures,
            noise: failures,
        };
    }

    let subset = matrix.select(&positions);
    let labels = match clusterer.fit_transform(&subset) {
        Ok(labels) => labels,
        Err(e) => {
            tracing::warn!("{} failed, no clusters reported: {}", clusterer.name(), e);
            return ClusteringResult {
                clusters: Vec::new(),
                failures,
                noise: failures,
            };
        }
    };

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut noise = 0;
    for (position, label) in labels.iter().enumerate() {
        match label {
            Some(cluster) => groups
                .entry(*cluster)
                .or_default()
                .push(subset.batch_index(position)),
            None => noise += 1,
        }
    }

    let clusters: Vec<FailureCluster> = groups
        .into_iter()
        .map(|(cluster_id, members)| summarize(cluster_id, members, results))
        .collect();

    tracing::debug!(
        "{} found {} failure clusters among {} failures ({} noise)",
        clusterer.name(),
        clusters.len(),
        failures,
        noise
    );

    ClusteringResult {
        clusters,
        failures,
        noise,
    }
}

fn summarize(cluster_id: usize, members: Vec<usize>, results: &[ExecutionResult]) -> FailureCluster {
    let rows: Vec<&ExecutionResult> = members.iter().map(|&i| &results[i]).collect();

    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut rules = BTreeSet::new();
    let mut confidence = 0.0;
    for row in &rows {
        if let Some(outcome) = row.outcome() {
            *outcome_counts.entry(outcome.to_string()).or_default() += 1;
        }
        if let Some(rule) = row.decided_by() {
            rules.insert(rule.to_string());
        }
        confidence += row.confidence().unwrap_or(0.0);
    }

    FailureCluster {
        cluster_id,
        member_ids: rows.iter().map(|r| r.scenario.id.clone()).collect(),
        size: members.len(),
        centroid: centroid(&rows),
        dominant_outcome: mode(outcome_counts.iter().map(|(k, v)| (k.clone(), *v))).unwrap_or_default(),
        mean_confidence: confidence / rows.len().max(1) as f64,
        outcome_counts,
        rules_involved: rules.into_iter().collect(),
        members,
    }
}

fn centroid(rows: &[&ExecutionResult]) -> BTreeMap<String, Value> {
    let mut columns: BTreeMap<&str, Vec<&Value>> = BTreeMap::new();
    for row in rows {
        for (name, value) in &row.scenario.values {
            if !value.is_null() {
                columns.entry(name.as_str()).or_default().push(value);
            }
        }
    }

    columns
        .into_iter()
        .filter_map(|(name, values)| {
            let numbers: Vec<f64> = values.iter().filter_map(|v| v.as_number()).collect();
            let value = if numbers.len() == values.len() {
                Value::Number(numbers.iter().sum::<f64>() / numbers.len() as f64)
            } else {
                let mut counts: BTreeMap<String, (usize, &Value)> = BTreeMap::new();
                for &v in &values {
                    counts.entry(v.canonical_key()).or_insert((0, v)).0 += 1;
                }
                let best = mode(counts.iter().map(|(k, (n, _))| (k.clone(), *n)))?;
                counts.get(&best)?.1.clone()
            };
            Some((name.to_string(), value))
        })
        .collect()
}

/// Most frequent key; ties go to the smallest key
fn mode(counts: impl Iterator<Item = (String, usize)>) -> Option<String> {
    counts
        .fold(None, |best: Option<(String, usize)>, (key, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((key, n)),
        })
        .map(|(key, _)| key)
}
