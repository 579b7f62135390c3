//! Faultline SDK
//!
//! High-level API for stress-testing rule-based decision policies: build a
//! [`StressTest`] from a rule set and a feature space, run it, and read the
//! detections and the decomposed [`RiskReport`].

pub mod builder;
pub mod config;
pub mod error;
pub mod score;

// Re-export main types
pub use builder::StressTestBuilder;
pub use config::{AnalysisConfig, RunConfig};
pub use error::{Result, SdkError};
pub use score::{
    composite_score, normalized_gini, Metric, RiskInputs, RiskMetrics, RiskReport, RiskScorer,
    ScoringWeights, Severity, SubScore,
};
pub use stress_test::{StressReport, StressTest};

// Re-export commonly used types from dependencies
pub use faultline_core::{Decision, FeatureSpec, RuleSet, RuleSetDocument, Scenario, Value};
pub use faultline_detector::{DetectionReport, DetectorConfig, FailureDetector};
pub use faultline_runtime::{DecisionExecutor, ExecutedBatch, ExecutorConfig};
pub use faultline_scenario::{GeneratorConfig, ScenarioGenerator, Strategy};
