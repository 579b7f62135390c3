//! Sampling strategies
//!
//! Each strategy appends to an output vector; scenario ids encode the
//! strategy and the position in the output so ids are unique per call.

mod adversarial;
mod boundary;
mod grid;
mod normal;

pub(crate) use adversarial::adversarial;
pub(crate) use boundary::boundary;
pub(crate) use grid::grid;
pub(crate) use normal::normal;

use crate::config::GeneratorConfig;
use crate::sampling;
use crate::thresholds::ThresholdIndex;
use faultline_core::{FeatureSpec, Scenario, ScenarioStrategy, Value};
use rand::Rng;
use std::collections::BTreeMap;

/// Read-only inputs shared by every strategy
pub(crate) struct Context<'a> {
    pub specs: &'a [FeatureSpec],
    pub thresholds: &'a ThresholdIndex,
    pub config: &'a GeneratorConfig,
}

impl Context<'_> {
    /// One typical value per feature
    pub fn background<R: Rng + ?Sized>(&self, rng: &mut R) -> BTreeMap<String, Value> {
        self.specs
            .iter()
            .map(|spec| (spec.name.clone(), sampling::sample(spec, rng)))
            .collect()
    }

    /// Thresholds of a numeric feature that fall inside its range
    pub fn thresholds_in_range(&self, spec: &FeatureSpec) -> Vec<f64> {
        let Some((lo, hi)) = spec.bounds() else {
            return Vec::new();
        };
        self.thresholds
            .numeric(&spec.name)
            .iter()
            .copied()
            .filter(|t| *t >= lo && *t <= hi)
            .collect()
    }
}

pub(crate) fn scenario_id(strategy: ScenarioStrategy, position: usize) -> String {
    format!("{}-{:06}", strategy.as_str(), position)
}

pub(crate) fn push(
    out: &mut Vec<Scenario>,
    strategy: ScenarioStrategy,
    values: BTreeMap<String, Value>,
) {
    let mut scenario = Scenario::new(scenario_id(strategy, out.len()), strategy);
    scenario.values = values;
    out.push(scenario);
}
