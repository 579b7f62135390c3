//! Scenario generator
//!
//! Holds a validated feature space, optional rule thresholds and strategy
//! tuning. Every call creates its own `StdRng` from the caller's seed.

use crate::config::{GeneratorConfig, Mixture};
use crate::perturbation::{self, PerturbationSpec};
use crate::strategy::{self, Context};
use crate::thresholds::ThresholdIndex;
use crate::Result;
use faultline_core::{CoreError, FeatureKind, FeatureSpec, Scenario};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Generation strategy of one call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Strategy {
    Normal,
    Boundary,
    Adversarial,
    /// Cartesian product of `levels` values per feature; `count` bounds it
    Grid { levels: usize },
    /// Normal, boundary and adversarial blocks sized by the mixture
    MonteCarlo(Mixture),
}

impl Strategy {
    /// Monte Carlo with the default 60/25/15 mixture
    pub fn monte_carlo() -> Self {
        Strategy::MonteCarlo(Mixture::default())
    }
}

/// Overview of a feature space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub total_features: usize,
    pub continuous_features: usize,
    pub discrete_features: usize,
    pub categorical_features: usize,
    pub features: Vec<FeatureSpec>,
}

/// Generator over one feature space
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    specs: Vec<FeatureSpec>,
    thresholds: ThresholdIndex,
    config: GeneratorConfig,
}

impl ScenarioGenerator {
    /// Validate the feature space and create a generator
    pub fn new(specs: Vec<FeatureSpec>) -> Result<Self> {
        if specs.is_empty() {
            return Err(CoreError::configuration("features", "feature space is empty"));
        }
        let mut seen = HashSet::new();
        for spec in &specs {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(CoreError::configuration(&spec.name, "duplicate feature name"));
            }
        }
        Ok(Self {
            specs,
            thresholds: ThresholdIndex::new(),
            config: GeneratorConfig::default(),
        })
    }

    /// Aim boundary and adversarial strategies at these thresholds
    pub fn with_thresholds(mut self, thresholds: ThresholdIndex) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the strategy tuning
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn specs(&self) -> &[FeatureSpec] {
        &self.specs
    }

    pub fn spec(&self, name: &str) -> Option<&FeatureSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn thresholds(&self) -> &ThresholdIndex {
        &self.thresholds
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn context(&self) -> Context<'_> {
        Context {
            specs: &self.specs,
            thresholds: &self.thresholds,
            config: &self.config,
        }
    }

    /// Generate `count` scenarios (for `Grid`, at most `count`)
    pub fn generate(&self, strategy: Strategy, count: usize, seed: u64) -> Result<Vec<Scenario>> {
        if count == 0 {
            return Err(CoreError::configuration("count", "count must be greater than 0"));
        }
        let ctx = self.context();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut out = Vec::with_capacity(count);

        match strategy {
            Strategy::Normal => strategy::normal(&ctx, count, &mut rng, &mut out),
            Strategy::Boundary => strategy::boundary(&ctx, count, &mut rng, &mut out),
            Strategy::Adversarial => strategy::adversarial(&ctx, count, &mut rng, &mut out),
            Strategy::Grid { levels } => strategy::grid(&ctx, levels, count, &mut out)?,
            Strategy::MonteCarlo(mixture) => {
                mixture.validate()?;
                let [normal, boundary, adversarial] = mixture.allocate(count);
                strategy::normal(&ctx, normal, &mut rng, &mut out);
                strategy::boundary(&ctx, boundary, &mut rng, &mut out);
                strategy::adversarial(&ctx, adversarial, &mut rng, &mut out);
            }
        }

        tracing::info!(
            "Generated {} scenarios with {:?} over {} features (seed {})",
            out.len(),
            strategy,
            self.specs.len(),
            seed
        );
        Ok(out)
    }

    /// Draw `probes` perturbed neighbors of `base`, each tagged with its
    /// origin and the recorded perturbation
    pub fn perturb(
        &self,
        base: &Scenario,
        spec: &PerturbationSpec,
        probes: usize,
        seed: u64,
    ) -> Result<Vec<Scenario>> {
        if probes == 0 {
            return Err(CoreError::configuration("probes", "probes must be greater than 0"));
        }
        spec.validate(&self.specs)?;
        let mut rng = StdRng::seed_from_u64(seed);
        Ok(perturbation::perturb(&self.specs, base, spec, probes, &mut rng))
    }

    /// Move `base` along the perturbation recorded on `perturbed`, at a new
    /// magnitude
    pub fn rescale(&self, base: &Scenario, perturbed: &Scenario, magnitude: f64) -> Result<Scenario> {
        let recorded = perturbed.perturbation.as_ref().ok_or_else(|| {
            CoreError::configuration(&perturbed.id, "scenario carries no perturbation record")
        })?;
        if !(magnitude.is_finite() && magnitude >= 0.0) {
            return Err(CoreError::configuration(
                &perturbed.id,
                format!("perturbation magnitude must be finite and >= 0, got {}", magnitude),
            ));
        }
        let id = format!("{}@{:.6}", perturbed.id, magnitude);
        Ok(perturbation::rescale(&self.specs, base, recorded, magnitude, id))
    }

    pub fn feature_summary(&self) -> FeatureSummary {
        let count = |kind: FeatureKind| self.specs.iter().filter(|s| s.kind == kind).count();
        FeatureSummary {
            total_features: self.specs.len(),
            continuous_features: count(FeatureKind::Continuous),
            discrete_features: count(FeatureKind::Discrete),
            categorical_features: count(FeatureKind::Categorical),
            features: self.specs.clone(),
        }
    }
}

/// One-off generation over `specs`
pub fn generate(
    strategy: Strategy,
    count: usize,
    specs: &[FeatureSpec],
    seed: u64,
) -> Result<Vec<Scenario>> {
    ScenarioGenerator::new(specs.to_vec())?.generate(strategy, count, seed)
}
