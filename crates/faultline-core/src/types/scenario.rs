//! Scenario types
//!
//! A scenario is one synthetic input record used to probe a rule set. Feature
//! values live in a `BTreeMap` so iteration order, and therefore every
//! derived computation, is deterministic.

use super::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Strategy that produced a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStrategy {
    Normal,
    Boundary,
    Adversarial,
    Grid,
    Perturbation,
}

impl ScenarioStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioStrategy::Normal => "normal",
            ScenarioStrategy::Boundary => "boundary",
            ScenarioStrategy::Adversarial => "adversarial",
            ScenarioStrategy::Grid => "grid",
            ScenarioStrategy::Perturbation => "perturbation",
        }
    }
}

impl fmt::Display for ScenarioStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a perturbation magnitude is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PerturbationMode {
    /// Fraction of the feature's declared range
    #[default]
    Relative,
    /// Raw units of the feature
    Absolute,
}

/// Record of how a perturbed scenario was derived from its origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    /// Requested magnitude
    pub magnitude: f64,

    pub mode: PerturbationMode,

    /// Effective magnitude per touched feature (overrides applied)
    #[serde(default)]
    pub scales: BTreeMap<String, f64>,

    /// Direction in `[-1, 1]` drawn for each numeric feature, before scaling
    #[serde(default)]
    pub directions: BTreeMap<String, f64>,

    /// Uniform draw in `[0, 1)` for each categorical feature; it flips when
    /// the draw is below `min(scale, 1)`
    #[serde(default)]
    pub draws: BTreeMap<String, f64>,

    /// Signed delta applied to each numeric feature (after clamping)
    pub deltas: BTreeMap<String, f64>,

    /// Categorical features that were flipped, with their new value
    pub flipped: BTreeMap<String, Value>,
}

impl Perturbation {
    /// Normalized distance of the perturbation: mean of |delta| / span over
    /// numeric features plus 1.0 per flipped category, divided by the number
    /// of features touched.
    pub fn distance(&self, spans: &BTreeMap<String, f64>) -> f64 {
        let mut total = 0.0;
        let mut count = 0usize;
        for (name, delta) in &self.deltas {
            let span = spans.get(name).copied().unwrap_or(0.0);
            if span > 0.0 {
                total += delta.abs() / span;
            }
            count += 1;
        }
        total += self.flipped.len() as f64;
        count += self.flipped.len();
        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }
}

/// One synthetic input record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,

    pub values: BTreeMap<String, Value>,

    pub strategy: ScenarioStrategy,

    /// Id of the scenario this one was derived from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perturbation: Option<Perturbation>,
}

impl Scenario {
    /// Create a scenario with no lineage
    pub fn new(id: impl Into<String>, strategy: ScenarioStrategy) -> Self {
        Self {
            id: id.into(),
            values: BTreeMap::new(),
            strategy,
            origin: None,
            perturbation: None,
        }
    }

    /// Build a scenario from explicit feature values, tagged `normal`
    pub fn from_values<K, V, I>(id: impl Into<String>, values: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut scenario = Self::new(id, ScenarioStrategy::Normal);
        for (k, v) in values {
            scenario.values.insert(k.into(), v.into());
        }
        scenario
    }

    /// Set a feature value
    pub fn with_value(mut self, feature: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(feature.into(), value.into());
        self
    }

    /// Set the origin id
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn get(&self, feature: &str) -> Option<&Value> {
        self.values.get(feature)
    }

    pub fn number(&self, feature: &str) -> Option<f64> {
        self.values.get(feature).and_then(Value::as_number)
    }
}
