//! Analysis configuration

use crate::error::{Result, SdkError};
use crate::score::ScoringWeights;
use faultline_detector::DetectorConfig;
use faultline_runtime::ExecutorConfig;
use faultline_scenario::GeneratorConfig;
use serde::{Deserialize, Serialize};

/// Parameters of one stress-test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Scenarios generated per run
    pub scenario_count: usize,

    /// Seed of generation and of every randomized detector
    pub seed: u64,

    /// Execution partitions; 1 runs sequentially
    pub partitions: usize,

    /// Scenarios probed for instability, taken evenly across the batch
    pub instability_sample: usize,

    /// Relative magnitude of instability probes
    pub perturbation_magnitude: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scenario_count: 1000,
            seed: 42,
            partitions: 1,
            instability_sample: 20,
            perturbation_magnitude: 0.05,
        }
    }
}

/// Every tunable of the pipeline, grouped by component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub run: RunConfig,
    pub generator: GeneratorConfig,
    pub executor: ExecutorConfig,
    pub detector: DetectorConfig,
    pub scoring: ScoringWeights,
}

impl AnalysisConfig {
    /// Load configuration from `config/faultline.{toml,yaml,json}` and
    /// `FAULTLINE__*` environment variables, falling back to defaults
    pub fn load() -> anyhow::Result<Self> {
        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/faultline").required(false))
            .add_source(
                config::Environment::with_prefix("FAULTLINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(e) => {
                tracing::info!("No usable config source ({}), using default configuration", e);
                Ok(Self::default())
            }
        }
    }

    /// Check cross-component constraints
    pub fn validate(&self) -> Result<()> {
        self.run_checks()?;
        self.generator.mixture.validate()?;
        self.detector.validate()?;
        self.scoring.validate()
    }

    fn run_checks(&self) -> Result<()> {
        if self.run.scenario_count == 0 {
            return Err(SdkError::ConfigError(
                "run.scenario_count must be greater than 0".to_string(),
            ));
        }
        if self.run.partitions == 0 {
            return Err(SdkError::ConfigError(
                "run.partitions must be at least 1".to_string(),
            ));
        }
        if !(self.run.perturbation_magnitude.is_finite() && self.run.perturbation_magnitude > 0.0) {
            return Err(SdkError::ConfigError(format!(
                "run.perturbation_magnitude must be positive, got {}",
                self.run.perturbation_magnitude
            )));
        }
        Ok(())
    }

    /// Set the run seed, shared with the detector
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.run.seed = seed;
        self.detector.seed = seed;
        self
    }

    /// Set the scenario count
    pub fn with_scenario_count(mut self, count: usize) -> Self {
        self.run.scenario_count = count;
        self
    }

    /// Set the detector configuration
    pub fn with_detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    /// Set the scoring weights
    pub fn with_scoring(mut self, scoring: ScoringWeights) -> Self {
        self.scoring = scoring;
        self
    }
}
