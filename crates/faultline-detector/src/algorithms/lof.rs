//! Local outlier factor

use super::{squared_euclidean, OutlierScorer};
use crate::error::{DetectorError, Result};
use crate::matrix::FeatureMatrix;

/// Smoothing added to the mean reachability distance so duplicate points
/// keep a finite density
const REACH_EPSILON: f64 = 1e-10;

/// LOF with `k` neighbors, capped at `n - 1`. Scores near 1.0 are inliers.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalOutlierFactor {
    pub neighbors: usize,
}

impl LocalOutlierFactor {
    pub fn new(neighbors: usize) -> Self {
        Self { neighbors }
    }
}

impl OutlierScorer for LocalOutlierFactor {
    fn name(&self) -> &str {
        "local_outlier_factor"
    }

    fn fit_transform(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>> {
        let n = matrix.n_rows();
        let k = self.neighbors.min(n.saturating_sub(1));
        if k == 0 {
            return Err(DetectorError::insufficient(self.name(), 2, n));
        }
        if !matrix.is_finite() {
            return Err(DetectorError::degenerate(self.name(), "matrix holds non-finite values"));
        }
        let rows = matrix.rows();

        let distances: Vec<Vec<f64>> = rows
            .iter()
            .map(|a| rows.iter().map(|b| squared_euclidean(a, b).sqrt()).collect())
            .collect();

        // k nearest neighbors of each point, nearest first, ties by index
        let knn: Vec<Vec<usize>> = (0..n)
            .map(|i| {
                let mut others: Vec<usize> = (0..n).filter(|&j| j != i).collect();
                others.sort_by(|&a, &b| distances[i][a].total_cmp(&distances[i][b]).then(a.cmp(&b)));
                others.truncate(k);
                others
            })
            .collect();

        let k_distance: Vec<f64> = (0..n).map(|i| distances[i][knn[i][k - 1]]).collect();

        let lrd: Vec<f64> = (0..n)
            .map(|i| {
                let reach: f64 = knn[i]
                    .iter()
                    .map(|&o| k_distance[o].max(distances[i][o]))
                    .sum();
                1.0 / (reach / k as f64 + REACH_EPSILON)
            })
            .collect();

        Ok((0..n)
            .map(|i| knn[i].iter().map(|&o| lrd[o] / lrd[i]).sum::<f64>() / k as f64)
            .collect())
    }
}
