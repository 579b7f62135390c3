//! Statistical detectors
//!
//! Every detector implements one of two capability traits so the
//! [`FailureDetector`](crate::FailureDetector) can swap algorithms without
//! touching the orchestration.

pub mod dbscan;
pub mod isolation_forest;
pub mod lof;

pub use dbscan::Dbscan;
pub use isolation_forest::IsolationForest;
pub use lof::LocalOutlierFactor;

use crate::error::Result;
use crate::matrix::FeatureMatrix;

/// Scores every row; higher means more anomalous
pub trait OutlierScorer: Send + Sync {
    /// Detector name used in reports
    fn name(&self) -> &str;

    /// One score per matrix row
    fn fit_transform(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>>;
}

/// Assigns rows to clusters; `None` is noise
pub trait Clusterer: Send + Sync {
    fn name(&self) -> &str;

    /// One label per matrix row
    fn fit_transform(&self, matrix: &FeatureMatrix) -> Result<Vec<Option<usize>>>;
}

/// Squared Euclidean distance between two vectors.
#[inline]
pub(crate) fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
