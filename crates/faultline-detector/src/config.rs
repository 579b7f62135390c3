//! Detector configuration

use crate::clustering::FailurePredicate;
use crate::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};

/// Parameters of every detection stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Seed of every randomized detector
    pub seed: u64,

    /// Expected share of anomalies; the top `ceil(contamination * n)` scores
    /// are flagged
    pub contamination: f64,

    /// Isolation forest size
    pub trees: usize,

    /// Rows drawn per isolation tree
    pub subsample: usize,

    /// Neighbors considered by the local outlier factor
    pub lof_neighbors: usize,

    /// DBSCAN neighborhood radius in standardized units
    pub dbscan_eps: f64,

    /// DBSCAN core-point threshold, the point itself included
    pub dbscan_min_samples: usize,

    /// Smallest batch the detector accepts
    pub min_batch_size: usize,

    /// Perturbed neighbors per base scenario
    pub probes: usize,

    /// Bisection steps tightening the minimal flipping magnitude
    pub refine_steps: usize,

    /// Edge cases reported
    pub edge_case_top_k: usize,

    /// Which results count as failures for clustering
    pub failure: FailurePredicate,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            contamination: 0.1,
            trees: 100,
            subsample: 256,
            lof_neighbors: 20,
            dbscan_eps: 0.5,
            dbscan_min_samples: 5,
            min_batch_size: 10,
            probes: 10,
            refine_steps: 4,
            edge_case_top_k: 10,
            failure: FailurePredicate::default(),
        }
    }
}

impl DetectorConfig {
    /// Rows required before any batch analysis runs
    pub fn required_rows(&self) -> usize {
        self.min_batch_size
            .max(self.lof_neighbors + 1)
            .max(self.dbscan_min_samples)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(DetectorError::Configuration(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }
        if self.trees == 0 || self.subsample < 2 {
            return Err(DetectorError::Configuration(
                "isolation forest needs at least one tree and a subsample of 2".to_string(),
            ));
        }
        if self.lof_neighbors == 0 || self.dbscan_min_samples == 0 {
            return Err(DetectorError::Configuration(
                "neighbor counts must be at least 1".to_string(),
            ));
        }
        if !(self.dbscan_eps > 0.0 && self.dbscan_eps.is_finite()) {
            return Err(DetectorError::Configuration(format!(
                "dbscan eps must be positive, got {}",
                self.dbscan_eps
            )));
        }
        if self.probes == 0 {
            return Err(DetectorError::Configuration(
                "probes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the contamination
    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    /// Set the failure predicate
    pub fn with_failure(mut self, failure: FailurePredicate) -> Self {
        self.failure = failure;
        self
    }
}
