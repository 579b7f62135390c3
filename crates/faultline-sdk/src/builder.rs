//! Builder pattern for StressTest

use crate::config::AnalysisConfig;
use crate::error::{Result, SdkError};
use crate::score::RiskScorer;
use crate::stress_test::StressTest;
use faultline_core::{FeatureSpec, RuleSet, RuleSetDocument};
use faultline_detector::FailureDetector;
use faultline_runtime::DecisionExecutor;
use faultline_scenario::{ScenarioGenerator, Strategy, ThresholdIndex};
use std::sync::Arc;

/// Builder for StressTest
///
/// # Example
///
/// ```rust,ignore
/// use faultline_sdk::StressTestBuilder;
///
/// let report = StressTestBuilder::new()
///     .with_document(document)
///     .with_feature_space(features)
///     .with_seed(42)
///     .with_scenario_count(500)
///     .build()?
///     .run()?;
///
/// println!("{}", report.risk);
/// ```
#[derive(Default)]
pub struct StressTestBuilder {
    ruleset: Option<RuleSet>,
    document: Option<RuleSetDocument>,
    features: Vec<FeatureSpec>,
    config: AnalysisConfig,
    strategy: Option<Strategy>,
    detector: Option<FailureDetector>,
}

impl StressTestBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a validated rule set
    pub fn with_ruleset(mut self, ruleset: RuleSet) -> Self {
        self.ruleset = Some(ruleset);
        self
    }

    /// Use a rule document; it is validated when the builder is built
    pub fn with_document(mut self, document: RuleSetDocument) -> Self {
        self.document = Some(document);
        self
    }

    /// Set the feature space
    pub fn with_feature_space(mut self, features: Vec<FeatureSpec>) -> Self {
        self.features = features;
        self
    }

    /// Add a feature
    pub fn add_feature(mut self, feature: FeatureSpec) -> Self {
        self.features.push(feature);
        self
    }

    /// Set the full analysis configuration
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the seed of generation and detection
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config = self.config.with_seed(seed);
        self
    }

    /// Set the number of generated scenarios
    pub fn with_scenario_count(mut self, count: usize) -> Self {
        self.config.run.scenario_count = count;
        self
    }

    /// Set execution partitions
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.config.run.partitions = partitions;
        self
    }

    /// Generate with a fixed strategy instead of the configured mixture
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Use a detector with custom algorithms
    pub fn with_detector(mut self, detector: FailureDetector) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Build the stress test
    pub fn build(self) -> Result<StressTest> {
        self.config.validate()?;

        let ruleset = match (self.ruleset, self.document) {
            (Some(ruleset), _) => ruleset,
            (None, Some(document)) => document.into_ruleset()?,
            (None, None) => {
                return Err(SdkError::ConfigError(
                    "a rule set or rule document is required".to_string(),
                ))
            }
        };
        let ruleset = Arc::new(ruleset);

        let generator = ScenarioGenerator::new(self.features.clone())?
            .with_thresholds(ThresholdIndex::from_ruleset(&ruleset))
            .with_config(self.config.generator.clone());

        let executor = DecisionExecutor::new(Arc::clone(&ruleset))
            .with_config(self.config.executor.clone())
            .with_feature_space(self.features);

        let detector = match self.detector {
            Some(detector) => detector,
            None => FailureDetector::new(self.config.detector.clone())?,
        };
        let scorer = RiskScorer::new(self.config.scoring)?;

        let strategy = self
            .strategy
            .unwrap_or(Strategy::MonteCarlo(self.config.generator.mixture));

        tracing::debug!(
            "Built stress test for '{}' over {} features",
            ruleset.name(),
            generator.specs().len()
        );

        Ok(StressTest::new(
            ruleset, generator, executor, detector, scorer, strategy, self.config,
        ))
    }
}
