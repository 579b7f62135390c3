//! Rule thresholds per feature
//!
//! Boundary and adversarial strategies aim at the values rules compare
//! against. The index is extracted once from a rule set's conditions.

use faultline_core::{RuleSet, Value};
use std::collections::BTreeMap;

/// Numeric thresholds and categorical values named by rules, per feature
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdIndex {
    numeric: BTreeMap<String, Vec<f64>>,
    categorical: BTreeMap<String, Vec<Value>>,
}

impl ThresholdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every literal compared against in `ruleset`
    pub fn from_ruleset(ruleset: &RuleSet) -> Self {
        let mut index = Self::new();
        for rule in ruleset.rules() {
            for condition in &rule.conditions {
                for literal in condition.value.literals() {
                    index.add(&condition.feature, literal);
                }
            }
        }
        index.normalize();
        index
    }

    /// Record one literal for `feature`
    pub fn add(&mut self, feature: &str, literal: &Value) {
        match literal {
            Value::Number(n) if n.is_finite() => {
                self.numeric.entry(feature.to_string()).or_default().push(*n)
            }
            Value::Number(_) | Value::Null | Value::Array(_) => {}
            other => match other.as_number() {
                Some(n) if n.is_finite() => {
                    self.numeric.entry(feature.to_string()).or_default().push(n)
                }
                _ => self
                    .categorical
                    .entry(feature.to_string())
                    .or_default()
                    .push(other.clone()),
            },
        }
    }

    fn normalize(&mut self) {
        for values in self.numeric.values_mut() {
            values.sort_by(f64::total_cmp);
            values.dedup();
        }
        for values in self.categorical.values_mut() {
            let mut unique: Vec<Value> = Vec::with_capacity(values.len());
            for value in values.drain(..) {
                if !unique.iter().any(|seen| seen.loose_eq(&value)) {
                    unique.push(value);
                }
            }
            *values = unique;
        }
    }

    /// Sorted numeric thresholds for `feature`
    pub fn numeric(&self, feature: &str) -> &[f64] {
        self.numeric.get(feature).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Categorical values named by rules for `feature`
    pub fn categorical(&self, feature: &str) -> &[Value] {
        self.categorical.get(feature).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }
}
