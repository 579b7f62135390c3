//! Faultline Scenario - Seeded scenario generation
//!
//! Produces populations of synthetic input records for a declared feature
//! space. Every strategy draws from a `StdRng` seeded by the caller, created
//! per call, so a fixed (seed, feature space) pair always yields the same
//! sequence.

pub mod config;
pub mod generator;
pub mod perturbation;
pub mod sampling;
pub mod strategy;
pub mod thresholds;

pub use config::{GeneratorConfig, Mixture};
pub use generator::{generate, FeatureSummary, ScenarioGenerator, Strategy};
pub use perturbation::PerturbationSpec;
pub use thresholds::ThresholdIndex;

/// Generation errors are core configuration errors
pub type Result<T> = std::result::Result<T, faultline_core::CoreError>;
