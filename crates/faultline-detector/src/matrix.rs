//! Feature matrix
//!
//! Turns executed scenarios into a dense, standardized numeric matrix. One row
//! per successfully evaluated result, in batch order. Columns are the scenario
//! features (numeric as-is, everything else label-encoded over the sorted set
//! of observed values) followed by three decision signals.

use faultline_core::Value;
use faultline_runtime::ExecutedBatch;
use std::collections::{BTreeMap, BTreeSet};

/// Column holding 1.0 when a rule decided the outcome, 0.0 for the default
pub const FIRED_COLUMN: &str = "__fired";
/// Column holding the decision confidence
pub const CONFIDENCE_COLUMN: &str = "__confidence";
/// Column holding the label-encoded outcome
pub const OUTCOME_COLUMN: &str = "__outcome";

/// Dense row-major matrix with row provenance
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
    /// Batch index of each row
    indices: Vec<usize>,
}

impl FeatureMatrix {
    /// Wrap raw rows; every row must have one value per column
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        let indices = (0..rows.len()).collect();
        Self {
            columns,
            rows,
            indices,
        }
    }

    /// Encode and standardize the successful results of a batch
    pub fn from_batch(batch: &ExecutedBatch) -> Self {
        let successes: Vec<_> = batch.successes().collect();

        let mut features: BTreeMap<&str, Vec<Option<&Value>>> = BTreeMap::new();
        for name in successes
            .iter()
            .flat_map(|r| r.scenario.values.keys())
            .collect::<BTreeSet<_>>()
        {
            let column = successes
                .iter()
                .map(|r| r.scenario.values.get(name.as_str()).filter(|v| !v.is_null()))
                .collect();
            features.insert(name.as_str(), column);
        }

        let mut columns = Vec::with_capacity(features.len() + 3);
        let mut encoded: Vec<Vec<f64>> = Vec::with_capacity(features.len() + 3);
        for (name, values) in &features {
            columns.push(name.to_string());
            encoded.push(encode_column(values));
        }

        let outcome_codes = label_codes(successes.iter().filter_map(|r| r.outcome()));

        columns.push(FIRED_COLUMN.to_string());
        encoded.push(
            successes
                .iter()
                .map(|r| if r.decided_by().is_some() { 1.0 } else { 0.0 })
                .collect(),
        );
        columns.push(CONFIDENCE_COLUMN.to_string());
        encoded.push(
            successes
                .iter()
                .map(|r| r.confidence().unwrap_or(0.0))
                .collect(),
        );
        columns.push(OUTCOME_COLUMN.to_string());
        encoded.push(
            successes
                .iter()
                .map(|r| {
                    r.outcome()
                        .and_then(|o| outcome_codes.get(o))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect(),
        );

        let rows = (0..successes.len())
            .map(|i| encoded.iter().map(|column| column[i]).collect())
            .collect();

        let mut matrix = Self {
            columns,
            rows,
            indices: successes.iter().map(|r| r.index).collect(),
        };
        matrix.standardize();
        matrix
    }

    /// Z-score every column in place; zero-variance columns become 0
    pub fn standardize(&mut self) {
        let n = self.rows.len();
        if n == 0 {
            return;
        }
        for c in 0..self.columns.len() {
            let mean = self.rows.iter().map(|r| r[c]).sum::<f64>() / n as f64;
            let variance = self.rows.iter().map(|r| (r[c] - mean).powi(2)).sum::<f64>() / n as f64;
            let std = variance.sqrt();
            for row in &mut self.rows {
                row[c] = if std > f64::EPSILON {
                    (row[c] - mean) / std
                } else {
                    0.0
                };
            }
        }
    }

    /// Sub-matrix of the given row positions, provenance preserved
    pub fn select(&self, positions: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: positions.iter().map(|&p| self.rows[p].clone()).collect(),
            indices: positions.iter().map(|&p| self.indices[p]).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, position: usize) -> &[f64] {
        &self.rows[position]
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Batch index of the row at `position`
    pub fn batch_index(&self, position: usize) -> usize {
        self.indices[position]
    }

    pub fn batch_indices(&self) -> &[usize] {
        &self.indices
    }

    /// Returns true if every cell is finite
    pub fn is_finite(&self) -> bool {
        self.rows.iter().flatten().all(|v| v.is_finite())
    }
}

/// Numeric columns pass through with missing cells imputed by the column
/// mean; anything else is label-encoded by canonical key
fn encode_column(values: &[Option<&Value>]) -> Vec<f64> {
    let numeric = values
        .iter()
        .flatten()
        .all(|v| matches!(v, Value::Number(_)));

    if numeric {
        let present: Vec<f64> = values.iter().flatten().filter_map(|v| v.as_number()).collect();
        let mean = if present.is_empty() {
            0.0
        } else {
            present.iter().sum::<f64>() / present.len() as f64
        };
        return values
            .iter()
            .map(|v| v.and_then(Value::as_number).unwrap_or(mean))
            .collect();
    }

    let keys: Vec<Option<String>> = values.iter().map(|v| v.map(Value::canonical_key)).collect();
    let codes = label_codes(keys.iter().flatten().map(String::as_str));
    keys.iter()
        .map(|k| match k {
            Some(key) => codes.get(key.as_str()).copied().unwrap_or(-1.0),
            None => -1.0,
        })
        .collect()
}

/// Position of each distinct label in sorted order
fn label_codes<'a>(labels: impl Iterator<Item = &'a str>) -> BTreeMap<&'a str, f64> {
    labels
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(code, label)| (label, code as f64))
        .collect()
}
