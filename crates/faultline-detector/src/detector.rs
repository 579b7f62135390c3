//! Failure detector orchestration

use crate::algorithms::{Clusterer, Dbscan, IsolationForest, LocalOutlierFactor, OutlierScorer};
use crate::anomaly::AnomalyResult;
use crate::clustering::{self, ClusteringResult};
use crate::config::DetectorConfig;
use crate::detection::DetectionReport;
use crate::edge_cases::{self, EdgeCase};
use crate::error::{DetectorError, Result};
use crate::instability::{self, InstabilityAnalysis, MagnitudeSweep, ProbeSettings};
use crate::matrix::FeatureMatrix;
use faultline_core::Scenario;
use faultline_runtime::{DecisionExecutor, ExecutedBatch};
use faultline_scenario::ScenarioGenerator;

/// Runs every detection stage over an executed batch.
///
/// The outlier scorers and the clusterer are trait objects; the defaults are
/// an isolation forest, a local outlier factor and DBSCAN built from the
/// [`DetectorConfig`].
pub struct FailureDetector {
    config: DetectorConfig,
    global: Box<dyn OutlierScorer>,
    local: Box<dyn OutlierScorer>,
    clusterer: Box<dyn Clusterer>,
}

impl FailureDetector {
    /// Create a detector with the default algorithms
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            global: Box::new(IsolationForest::new(config.trees, config.subsample, config.seed)),
            local: Box::new(LocalOutlierFactor::new(config.lof_neighbors)),
            clusterer: Box::new(Dbscan::new(config.dbscan_eps, config.dbscan_min_samples)),
            config,
        })
    }

    /// Replace the global outlier scorer
    pub fn with_outlier_scorer(mut self, scorer: impl OutlierScorer + 'static) -> Self {
        self.global = Box::new(scorer);
        self
    }

    /// Replace the local outlier scorer
    pub fn with_local_scorer(mut self, scorer: impl OutlierScorer + 'static) -> Self {
        self.local = Box::new(scorer);
        self
    }

    /// Replace the failure clusterer
    pub fn with_clusterer(mut self, clusterer: impl Clusterer + 'static) -> Self {
        self.clusterer = Box::new(clusterer);
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn matrix(&self, batch: &ExecutedBatch) -> Result<FeatureMatrix> {
        let matrix = FeatureMatrix::from_batch(batch);
        let required = self.config.required_rows();
        if matrix.n_rows() < required {
            return Err(DetectorError::insufficient("batch", required, matrix.n_rows()));
        }
        Ok(matrix)
    }

    /// Global anomalies of a batch
    pub fn detect_anomalies(&self, batch: &ExecutedBatch) -> Result<AnomalyResult> {
        let matrix = self.matrix(batch)?;
        self.score(self.global.as_ref(), &matrix)
    }

    /// Local density anomalies of a batch
    pub fn detect_local_anomalies(&self, batch: &ExecutedBatch) -> Result<AnomalyResult> {
        let matrix = self.matrix(batch)?;
        self.score(self.local.as_ref(), &matrix)
    }

    /// Clusters of failing scenarios
    pub fn discover_failure_clusters(&self, batch: &ExecutedBatch) -> Result<ClusteringResult> {
        let matrix = self.matrix(batch)?;
        Ok(self.cluster(batch, &matrix))
    }

    /// Flagged anomalies ranked by impact
    pub fn find_edge_cases(&self, batch: &ExecutedBatch) -> Result<Vec<EdgeCase>> {
        let anomalies = self.detect_anomalies(batch)?;
        Ok(edge_cases::rank_edge_cases(batch, &anomalies, self.config.edge_case_top_k))
    }

    /// Run anomaly detection, clustering and edge-case ranking
    pub fn analyze(&self, batch: &ExecutedBatch) -> Result<DetectionReport> {
        let matrix = self.matrix(batch)?;

        let anomalies = self.score_or_empty(self.global.as_ref(), &matrix)?;
        let local_anomalies = self.score_or_empty(self.local.as_ref(), &matrix)?;
        let clustering = self.cluster(batch, &matrix);
        let edge_cases =
            edge_cases::rank_edge_cases(batch, &anomalies, self.config.edge_case_top_k);

        tracing::info!(
            "Detected {} anomalies, {} local anomalies, {} failure clusters in {} rows",
            anomalies.flagged_count(),
            local_anomalies.flagged_count(),
            clustering.clusters.len(),
            matrix.n_rows()
        );

        let results = batch.results();
        Ok(DetectionReport {
            anomalies,
            local_anomalies,
            clustering,
            edge_cases,
            instability: None,
            scenario_ids: matrix
                .batch_indices()
                .iter()
                .map(|&i| (i, results[i].scenario.id.clone()))
                .collect(),
        })
    }

    /// Probe each base scenario with perturbed neighbors
    pub fn detect_instability(
        &self,
        executor: &DecisionExecutor,
        generator: &ScenarioGenerator,
        base_scenarios: &[Scenario],
        magnitude: f64,
    ) -> Result<InstabilityAnalysis> {
        instability::detect_instability(
            executor,
            generator,
            base_scenarios,
            magnitude,
            &self.probe_settings(),
        )
    }

    /// Flip rate of one base across increasing magnitudes
    pub fn magnitude_sweep(
        &self,
        executor: &DecisionExecutor,
        generator: &ScenarioGenerator,
        base: &Scenario,
        magnitudes: &[f64],
    ) -> Result<MagnitudeSweep> {
        instability::magnitude_sweep(
            executor,
            generator,
            base,
            magnitudes,
            self.config.probes,
            self.config.seed,
        )
    }

    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            probes: self.config.probes,
            refine_steps: self.config.refine_steps,
            seed: self.config.seed,
        }
    }

    fn score(&self, scorer: &dyn OutlierScorer, matrix: &FeatureMatrix) -> Result<AnomalyResult> {
        let scores = scorer.fit_transform(matrix)?;
        AnomalyResult::from_scores(
            scorer.name(),
            matrix.batch_indices().to_vec(),
            scores,
            self.config.contamination,
        )
    }

    /// Degenerate input degrades to an empty result
    fn score_or_empty(
        &self,
        scorer: &dyn OutlierScorer,
        matrix: &FeatureMatrix,
    ) -> Result<AnomalyResult> {
        match self.score(scorer, matrix) {
            Ok(result) => Ok(result),
            Err(e @ DetectorError::Configuration(_)) => Err(e),
            Err(e) => {
                tracing::warn!("{} skipped: {}", scorer.name(), e);
                Ok(AnomalyResult::empty(scorer.name()))
            }
        }
    }

    fn cluster(&self, batch: &ExecutedBatch, matrix: &FeatureMatrix) -> ClusteringResult {
        clustering::cluster_failures(
            batch,
            matrix,
            &self.config.failure,
            self.clusterer.as_ref(),
            self.config.dbscan_min_samples,
        )
    }
}

impl std::fmt::Debug for FailureDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureDetector")
            .field("config", &self.config)
            .field("global", &self.global.name())
            .field("local", &self.local.name())
            .field("clusterer", &self.clusterer.name())
            .finish()
    }
}
