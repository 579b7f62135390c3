//! DBSCAN density-based clustering

use super::{squared_euclidean, Clusterer};
use crate::error::{DetectorError, Result};
use crate::matrix::FeatureMatrix;
use std::collections::VecDeque;

/// DBSCAN over standardized rows
#[derive(Debug, Clone, PartialEq)]
pub struct Dbscan {
    /// Neighborhood radius (Euclidean distance)
    pub eps: f64,
    /// Neighbors, the point itself included, needed for a core point
    pub min_samples: usize,
}

impl Dbscan {
    pub fn new(eps: f64, min_samples: usize) -> Self {
        Self { eps, min_samples }
    }
}

impl Clusterer for Dbscan {
    fn name(&self) -> &str {
        "dbscan"
    }

    fn fit_transform(&self, matrix: &FeatureMatrix) -> Result<Vec<Option<usize>>> {
        if !matrix.is_finite() {
            return Err(DetectorError::degenerate(self.name(), "matrix holds non-finite values"));
        }
        Ok(dbscan(matrix.rows(), self.eps, self.min_samples))
    }
}

/// Cluster label per point, `None` for noise. Cluster ids are assigned in
/// order of their first core point.
pub fn dbscan(points: &[Vec<f64>], eps: f64, min_samples: usize) -> Vec<Option<usize>> {
    let n = points.len();
    let eps_sq = eps * eps;

    // Pairwise neighbor lists, each point counting itself
    let neighbors: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| squared_euclidean(&points[i], &points[j]) <= eps_sq)
                .collect()
        })
        .collect();

    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut current_cluster = 0usize;

    for i in 0..n {
        if visited[i] {
            continue;
        }
        visited[i] = true;

        if neighbors[i].len() < min_samples {
            // Tentatively noise; a later cluster may claim it as a border point
            continue;
        }

        labels[i] = Some(current_cluster);
        let mut queue: VecDeque<usize> = neighbors[i].iter().copied().filter(|&j| j != i).collect();

        while let Some(j) = queue.pop_front() {
            if labels[j].is_none() {
                labels[j] = Some(current_cluster);
            }
            if visited[j] {
                continue;
            }
            visited[j] = true;

            if neighbors[j].len() >= min_samples {
                for &nb in &neighbors[j] {
                    if labels[nb].is_none() {
                        queue.push_back(nb);
                    }
                }
            }
        }

        current_cluster += 1;
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_blobs_and_noise() {
        let points = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![5.0, 5.0],
            vec![5.1, 5.0],
            vec![5.0, 5.1],
            vec![20.0, 20.0],
        ];
        let labels = dbscan(&points, 0.5, 3);
        assert_eq!(labels[0], Some(0));
        assert_eq!(labels[1], Some(0));
        assert_eq!(labels[2], Some(0));
        assert_eq!(labels[3], Some(1));
        assert_eq!(labels[5], Some(1));
        assert_eq!(labels[6], None);
    }

    #[test]
    fn test_border_point_joins_cluster() {
        // -0.05 and 0.28 have too few neighbors to be core points themselves
        let points = vec![vec![0.0], vec![0.05], vec![-0.05], vec![0.28]];
        let labels = dbscan(&points, 0.3, 4);
        assert_eq!(labels, vec![Some(0), Some(0), Some(0), Some(0)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(dbscan(&[], 0.5, 5).is_empty());
    }

    #[test]
    fn test_non_finite_rejected() {
        let m = FeatureMatrix::from_rows(vec!["x".into()], vec![vec![f64::NAN], vec![0.0]]);
        let err = Dbscan::new(0.5, 2).fit_transform(&m).unwrap_err();
        assert!(matches!(err, DetectorError::Degenerate { .. }));
    }
}
