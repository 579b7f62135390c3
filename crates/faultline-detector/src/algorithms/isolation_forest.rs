//! Isolation forest
//!
//! Random axis-aligned partitioning: anomalies are isolated in fewer splits,
//! so their mean path length over the forest is short. Scores follow
//! `2^(-E[h(x)] / c(psi))` and lie in `(0, 1]`.

use super::OutlierScorer;
use crate::error::{DetectorError, Result};
use crate::matrix::FeatureMatrix;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Seeded isolation forest
#[derive(Debug, Clone, PartialEq)]
pub struct IsolationForest {
    pub trees: usize,
    pub subsample: usize,
    pub seed: u64,
}

impl IsolationForest {
    pub fn new(trees: usize, subsample: usize, seed: u64) -> Self {
        Self {
            trees,
            subsample,
            seed,
        }
    }
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new(100, 256, 42)
    }
}

#[derive(Debug)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl OutlierScorer for IsolationForest {
    fn name(&self) -> &str {
        "isolation_forest"
    }

    fn fit_transform(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>> {
        let n = matrix.n_rows();
        let psi = self.subsample.min(n);
        if psi < 2 || self.trees == 0 {
            return Err(DetectorError::insufficient(self.name(), 2, n));
        }
        if !matrix.is_finite() {
            return Err(DetectorError::degenerate(self.name(), "matrix holds non-finite values"));
        }

        let rows = matrix.rows();
        let height_limit = (psi as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let forest: Vec<Node> = (0..self.trees)
            .map(|_| {
                let sample = index::sample(&mut rng, n, psi).into_vec();
                build(rows, sample, 0, height_limit, &mut rng)
            })
            .collect();

        let normalizer = average_path_length(psi);
        Ok(rows
            .iter()
            .map(|row| {
                let total: f64 = forest.iter().map(|tree| path_length(tree, row, 0)).sum();
                let mean = total / forest.len() as f64;
                2f64.powf(-mean / normalizer)
            })
            .collect())
    }
}

fn build(rows: &[Vec<f64>], sample: Vec<usize>, depth: usize, limit: usize, rng: &mut StdRng) -> Node {
    if depth >= limit || sample.len() <= 1 {
        return Node::Leaf { size: sample.len() };
    }

    // Only features that still vary inside this node can split it
    let candidates: Vec<(usize, f64, f64)> = (0..rows[sample[0]].len())
        .filter_map(|feature| {
            let (lo, hi) = sample.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                (lo.min(rows[i][feature]), hi.max(rows[i][feature]))
            });
            (hi > lo).then_some((feature, lo, hi))
        })
        .collect();
    if candidates.is_empty() {
        return Node::Leaf { size: sample.len() };
    }

    let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(lo..hi);
    let (left, right): (Vec<usize>, Vec<usize>) =
        sample.into_iter().partition(|&i| rows[i][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build(rows, left, depth + 1, limit, rng)),
        right: Box::new(build(rows, right, depth + 1, limit, rng)),
    }
}

fn path_length(node: &Node, row: &[f64], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if row[*feature] < *threshold {
                path_length(left, row, depth + 1)
            } else {
                path_length(right, row, depth + 1)
            }
        }
    }
}

/// Average path length of an unsuccessful binary-search-tree lookup over `n`
/// points
pub(crate) fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_with_outlier() -> FeatureMatrix {
        let mut rows: Vec<Vec<f64>> = (0..60)
            .map(|i| vec![(i % 10) as f64 * 0.1, (i / 10) as f64 * 0.1])
            .collect();
        rows.push(vec![25.0, -30.0]);
        FeatureMatrix::from_rows(vec!["a".into(), "b".into()], rows)
    }

    #[test]
    fn test_outlier_scores_highest() {
        let scores = IsolationForest::default()
            .fit_transform(&matrix_with_outlier())
            .unwrap();
        let top = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(top, Some(60));
        assert!(scores.iter().all(|s| *s > 0.0 && *s <= 1.0));
    }

    #[test]
    fn test_seeded_forest_is_deterministic() {
        let m = matrix_with_outlier();
        let a = IsolationForest::new(50, 32, 7).fit_transform(&m).unwrap();
        let b = IsolationForest::new(50, 32, 7).fit_transform(&m).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!((average_path_length(256) - 10.2448).abs() < 1e-3);
    }

    #[test]
    fn test_single_row_is_insufficient() {
        let m = FeatureMatrix::from_rows(vec!["a".into()], vec![vec![1.0]]);
        let err = IsolationForest::default().fit_transform(&m).unwrap_err();
        assert!(matches!(err, DetectorError::InsufficientData { .. }));
    }
}
