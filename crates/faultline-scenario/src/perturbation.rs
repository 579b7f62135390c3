//! Perturbation probes
//!
//! Every probe draws one direction per numeric feature and one uniform draw
//! per categorical feature, independently of the magnitude. For a fixed seed
//! a larger magnitude therefore moves each probe further along the same
//! direction and flips a superset of categories.

use faultline_core::{
    CoreError, FeatureSpec, Perturbation, PerturbationMode, Scenario, ScenarioStrategy, Value,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How far to move a base scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationSpec {
    pub magnitude: f64,

    #[serde(default)]
    pub mode: PerturbationMode,

    /// Per-feature magnitudes replacing `magnitude`
    #[serde(default)]
    pub overrides: BTreeMap<String, f64>,

    /// Restrict perturbation to these features; all when `None`
    #[serde(default)]
    pub only: Option<BTreeSet<String>>,
}

impl PerturbationSpec {
    /// Magnitude as a fraction of each feature's range
    pub fn relative(magnitude: f64) -> Self {
        Self {
            magnitude,
            mode: PerturbationMode::Relative,
            overrides: BTreeMap::new(),
            only: None,
        }
    }

    /// Magnitude in feature units
    pub fn absolute(magnitude: f64) -> Self {
        Self {
            mode: PerturbationMode::Absolute,
            ..Self::relative(magnitude)
        }
    }

    /// Override the magnitude of one feature
    pub fn with_override(mut self, feature: impl Into<String>, magnitude: f64) -> Self {
        self.overrides.insert(feature.into(), magnitude);
        self
    }

    /// Perturb only `feature` (may be called repeatedly)
    pub fn only(mut self, feature: impl Into<String>) -> Self {
        self.only
            .get_or_insert_with(BTreeSet::new)
            .insert(feature.into());
        self
    }

    /// Same spec at a different magnitude
    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = magnitude;
        self
    }

    pub(crate) fn validate(&self, specs: &[FeatureSpec]) -> crate::Result<()> {
        check_magnitude("magnitude", self.magnitude)?;
        for (feature, magnitude) in &self.overrides {
            check_magnitude(feature, *magnitude)?;
        }
        let named = self
            .overrides
            .keys()
            .chain(self.only.iter().flatten());
        for feature in named {
            if !specs.iter().any(|s| &s.name == feature) {
                return Err(CoreError::configuration(
                    feature,
                    "perturbed feature is not part of the feature space",
                ));
            }
        }
        Ok(())
    }

    fn includes(&self, feature: &str) -> bool {
        self.only.as_ref().map_or(true, |only| only.contains(feature))
    }

    fn scale_of(&self, feature: &str) -> f64 {
        self.overrides
            .get(feature)
            .copied()
            .unwrap_or(self.magnitude)
    }
}

fn check_magnitude(target: &str, magnitude: f64) -> crate::Result<()> {
    if magnitude.is_finite() && magnitude >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::configuration(
            target,
            format!("perturbation magnitude must be finite and >= 0, got {}", magnitude),
        ))
    }
}

/// Units one magnitude step represents for `spec`
fn unit(spec: &FeatureSpec, mode: PerturbationMode) -> f64 {
    match mode {
        PerturbationMode::Relative => spec.span(),
        PerturbationMode::Absolute => 1.0,
    }
}

/// Categories other than `current`
fn alternatives<'a>(spec: &'a FeatureSpec, current: &Value) -> Vec<&'a Value> {
    spec.categories
        .iter()
        .filter(|c| !c.loose_eq(current))
        .collect()
}

/// Draw `probes` perturbed copies of `base`
pub(crate) fn perturb<R: Rng + ?Sized>(
    specs: &[FeatureSpec],
    base: &Scenario,
    spec: &PerturbationSpec,
    probes: usize,
    rng: &mut R,
) -> Vec<Scenario> {
    (0..probes)
        .map(|p| {
            let mut record = Perturbation {
                magnitude: spec.magnitude,
                mode: spec.mode,
                scales: BTreeMap::new(),
                directions: BTreeMap::new(),
                draws: BTreeMap::new(),
                deltas: BTreeMap::new(),
                flipped: BTreeMap::new(),
            };
            let mut values = base.values.clone();

            for feature in specs {
                let Some(current) = base.get(&feature.name) else {
                    continue;
                };
                // Draws happen for every feature so that restricting or
                // rescaling one feature leaves the others unchanged
                let (u, pick) = if feature.is_numeric() {
                    (rng.gen_range(-1.0..=1.0), 0)
                } else {
                    (rng.gen::<f64>(), rng.gen_range(0..feature.categories.len().max(1)))
                };
                if !spec.includes(&feature.name) {
                    continue;
                }
                let scale = spec.scale_of(&feature.name);
                record.scales.insert(feature.name.clone(), scale);

                if feature.is_numeric() {
                    let Some(x) = current.as_number() else {
                        continue;
                    };
                    let moved = feature.clamp(x + u * scale * unit(feature, spec.mode));
                    record.directions.insert(feature.name.clone(), u);
                    record.deltas.insert(feature.name.clone(), moved - x);
                    values.insert(feature.name.clone(), Value::Number(moved));
                } else {
                    record.draws.insert(feature.name.clone(), u);
                    let others = alternatives(feature, current);
                    if u < scale.min(1.0) && !others.is_empty() {
                        let next = others[pick % others.len()].clone();
                        record.flipped.insert(feature.name.clone(), next.clone());
                        values.insert(feature.name.clone(), next);
                    }
                }
            }

            Scenario {
                id: format!("{}/p{}", base.id, p),
                values,
                strategy: ScenarioStrategy::Perturbation,
                origin: Some(base.id.clone()),
                perturbation: Some(record),
            }
        })
        .collect()
}

/// Re-apply a recorded perturbation of `base` at `magnitude`, along the same
/// directions and draws
pub(crate) fn rescale(
    specs: &[FeatureSpec],
    base: &Scenario,
    recorded: &Perturbation,
    magnitude: f64,
    id: String,
) -> Scenario {
    let factor = if recorded.magnitude > 0.0 {
        magnitude / recorded.magnitude
    } else {
        0.0
    };
    let mut values = base.values.clone();
    let mut record = Perturbation {
        magnitude,
        mode: recorded.mode,
        scales: BTreeMap::new(),
        directions: recorded.directions.clone(),
        draws: recorded.draws.clone(),
        deltas: BTreeMap::new(),
        flipped: BTreeMap::new(),
    };

    for feature in specs {
        let Some(scale) = recorded.scales.get(&feature.name).map(|s| s * factor) else {
            continue;
        };
        record.scales.insert(feature.name.clone(), scale);
        if let Some(u) = recorded.directions.get(&feature.name) {
            if let Some(x) = base.number(&feature.name) {
                let moved = feature.clamp(x + u * scale * unit(feature, recorded.mode));
                record.deltas.insert(feature.name.clone(), moved - x);
                values.insert(feature.name.clone(), Value::Number(moved));
            }
        } else if let (Some(u), Some(next)) = (
            recorded.draws.get(&feature.name),
            recorded.flipped.get(&feature.name),
        ) {
            if *u < scale.min(1.0) {
                record.flipped.insert(feature.name.clone(), next.clone());
                values.insert(feature.name.clone(), next.clone());
            }
        }
    }

    Scenario {
        id,
        values,
        strategy: ScenarioStrategy::Perturbation,
        origin: Some(base.id.clone()),
        perturbation: Some(record),
    }
}
