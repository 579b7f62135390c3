//! Type system for Faultline
//!
//! This module contains:
//! - Value types
//! - Feature-space declarations
//! - Scenarios and perturbation lineage

pub mod feature;
pub mod scenario;
pub mod value;

pub use feature::{Distribution, FeatureKind, FeatureSpec};
pub use scenario::{Perturbation, PerturbationMode, Scenario, ScenarioStrategy};
pub use value::Value;
