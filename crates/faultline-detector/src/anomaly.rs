//! Anomaly flagging

use crate::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};

/// Scores of one outlier detector over a batch, with the flagged rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// Detector that produced the scores
    pub method: String,

    /// Batch index of each scored row
    pub indices: Vec<usize>,

    /// Score per row, higher is more anomalous
    pub scores: Vec<f64>,

    /// Per-row flag
    pub flagged: Vec<bool>,

    /// Lowest flagged score, 0.0 when nothing is flagged
    pub threshold: f64,
}

impl AnomalyResult {
    /// Result of a detector that could not run
    pub fn empty(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            indices: Vec::new(),
            scores: Vec::new(),
            flagged: Vec::new(),
            threshold: 0.0,
        }
    }

    /// Build from scores, flagging the top `ceil(contamination * n)`
    pub fn from_scores(
        method: impl Into<String>,
        indices: Vec<usize>,
        scores: Vec<f64>,
        contamination: f64,
    ) -> Result<Self> {
        let flagged = flag_top(&scores, contamination)?;
        let threshold = scores
            .iter()
            .zip(&flagged)
            .filter(|(_, f)| **f)
            .map(|(s, _)| *s)
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.min(s))))
            .unwrap_or(0.0);
        Ok(Self {
            method: method.into(),
            indices,
            scores,
            flagged,
            threshold,
        })
    }

    /// Batch indices of flagged rows, in batch order
    pub fn flagged_indices(&self) -> Vec<usize> {
        self.indices
            .iter()
            .zip(&self.flagged)
            .filter(|(_, f)| **f)
            .map(|(i, _)| *i)
            .collect()
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.iter().filter(|f| **f).count()
    }

    /// Score of a batch index, if it was scored
    pub fn score_of(&self, batch_index: usize) -> Option<f64> {
        self.indices
            .iter()
            .position(|i| *i == batch_index)
            .map(|p| self.scores[p])
    }

    /// Scores min-max normalized into [0, 1]; all zero when constant
    pub fn normalized_scores(&self) -> Vec<f64> {
        let (lo, hi) = self
            .scores
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(*s), hi.max(*s)));
        let range = hi - lo;
        self.scores
            .iter()
            .map(|s| if range > 0.0 { (s - lo) / range } else { 0.0 })
            .collect()
    }
}

/// Flag the top `ceil(contamination * n)` scores; equal scores are taken in
/// index order
pub fn flag_top(scores: &[f64], contamination: f64) -> Result<Vec<bool>> {
    if !(contamination > 0.0 && contamination <= 0.5) {
        return Err(DetectorError::Configuration(format!(
            "contamination must be in (0, 0.5], got {}",
            contamination
        )));
    }
    let n = scores.len();
    // Tolerance keeps e.g. 0.1 * 300 from rounding up to 31
    let take = ((contamination * n as f64 - 1e-9).ceil().max(0.0) as usize).min(n);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

    let mut flagged = vec![false; n];
    for &i in order.iter().take(take) {
        flagged[i] = true;
    }
    Ok(flagged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_top_ceil() {
        let scores = vec![0.1, 0.9, 0.3, 0.8, 0.2];
        // ceil(0.3 * 5) = 2
        assert_eq!(
            flag_top(&scores, 0.3).unwrap(),
            vec![false, true, false, true, false]
        );
    }

    #[test]
    fn test_ties_broken_by_index() {
        let scores = vec![0.5, 0.5, 0.5, 0.5];
        assert_eq!(flag_top(&scores, 0.25).unwrap(), vec![true, false, false, false]);
    }

    #[test]
    fn test_contamination_out_of_range() {
        assert!(flag_top(&[1.0], 0.0).is_err());
        assert!(flag_top(&[1.0], 0.7).is_err());
    }

    #[test]
    fn test_result_threshold_and_indices() {
        let result =
            AnomalyResult::from_scores("test", vec![10, 11, 12, 13], vec![0.2, 0.7, 0.9, 0.1], 0.5)
                .unwrap();
        assert_eq!(result.flagged_indices(), vec![11, 12]);
        assert_eq!(result.threshold, 0.7);
        assert_eq!(result.score_of(12), Some(0.9));
        assert_eq!(result.normalized_scores()[3], 0.0);
        assert_eq!(result.normalized_scores()[2], 1.0);
    }
}
