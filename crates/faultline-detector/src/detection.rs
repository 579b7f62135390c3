//! Detection reports

use crate::anomaly::AnomalyResult;
use crate::clustering::{ClusteringResult, FailureCluster};
use crate::edge_cases::EdgeCase;
use crate::instability::{InstabilityAnalysis, InstabilityFinding};
use faultline_core::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single detected problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Detection {
    /// Scenarios flagged by one outlier detector; `score` is the lowest
    /// flagged score
    Anomaly {
        method: String,
        score: f64,
        scenario_ids: Vec<String>,
    },

    FailureCluster {
        cluster_id: usize,
        member_ids: Vec<String>,
        centroid: BTreeMap<String, Value>,
    },

    Instability(InstabilityFinding),
}

/// Everything the detector found in one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Global isolation-based anomalies
    pub anomalies: AnomalyResult,

    /// Local density anomalies
    pub local_anomalies: AnomalyResult,

    pub clustering: ClusteringResult,

    pub edge_cases: Vec<EdgeCase>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instability: Option<InstabilityAnalysis>,

    /// Scenario id per batch index, for the scored rows
    #[serde(skip)]
    pub(crate) scenario_ids: BTreeMap<usize, String>,
}

/// Aggregate counts of a [`DetectionReport`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub total_anomalies: usize,
    pub total_local_anomalies: usize,
    pub total_clusters: usize,
    pub clustered_failures: usize,
    pub unclustered_failures: usize,
    pub clusters: Vec<ClusterSummary>,
    pub edge_cases: usize,
    pub total_unstable_scenarios: usize,
    pub avg_instability_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_id: usize,
    pub size: usize,
    pub dominant_outcome: String,
    pub mean_confidence: f64,
}

impl From<&FailureCluster> for ClusterSummary {
    fn from(cluster: &FailureCluster) -> Self {
        Self {
            cluster_id: cluster.cluster_id,
            size: cluster.size,
            dominant_outcome: cluster.dominant_outcome.clone(),
            mean_confidence: cluster.mean_confidence,
        }
    }
}

impl DetectionReport {
    /// Attach instability findings
    pub fn with_instability(mut self, instability: InstabilityAnalysis) -> Self {
        self.instability = Some(instability);
        self
    }

    pub fn clusters(&self) -> &[FailureCluster] {
        &self.clustering.clusters
    }

    /// Mean instability score, 0.0 when instability was not probed
    pub fn instability_score(&self) -> f64 {
        self.instability
            .as_ref()
            .map(InstabilityAnalysis::mean_score)
            .unwrap_or(0.0)
    }

    pub fn summary(&self) -> DetectionSummary {
        DetectionSummary {
            total_anomalies: self.anomalies.flagged_count(),
            total_local_anomalies: self.local_anomalies.flagged_count(),
            total_clusters: self.clustering.clusters.len(),
            clustered_failures: self.clustering.clustered(),
            unclustered_failures: self.clustering.noise,
            clusters: self.clustering.clusters.iter().map(ClusterSummary::from).collect(),
            edge_cases: self.edge_cases.len(),
            total_unstable_scenarios: self
                .instability
                .as_ref()
                .map(InstabilityAnalysis::unstable_count)
                .unwrap_or(0),
            avg_instability_score: self.instability_score(),
        }
    }

    /// Flattened list: anomalies per detector, then clusters, then flipped
    /// probes
    pub fn detections(&self) -> Vec<Detection> {
        let mut out = Vec::new();
        for result in [&self.anomalies, &self.local_anomalies] {
            let scenario_ids: Vec<String> = result
                .flagged_indices()
                .into_iter()
                .filter_map(|i| self.scenario_ids.get(&i).cloned())
                .collect();
            if !scenario_ids.is_empty() {
                out.push(Detection::Anomaly {
                    method: result.method.clone(),
                    score: result.threshold,
                    scenario_ids,
                });
            }
        }
        for cluster in &self.clustering.clusters {
            out.push(Detection::FailureCluster {
                cluster_id: cluster.cluster_id,
                member_ids: cluster.member_ids.clone(),
                centroid: cluster.centroid.clone(),
            });
        }
        if let Some(instability) = &self.instability {
            out.extend(instability.flips().cloned().map(Detection::Instability));
        }
        out
    }
}
