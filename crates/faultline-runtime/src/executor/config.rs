//! Executor configuration

use serde::{Deserialize, Serialize};

/// Tuning for batch execution and boundary-pair search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Absolute epsilon for features with no declared range
    pub epsilon: f64,

    /// Epsilon as a fraction of a feature's declared range
    pub relative_epsilon: f64,

    /// Sorted neighbors compared per scenario inside a group
    pub neighbor_radius: usize,

    /// Groups (and conflict searches) up to this size compare every pair
    pub full_scan_limit: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            relative_epsilon: 0.05,
            neighbor_radius: 32,
            full_scan_limit: 64,
        }
    }
}

impl ExecutorConfig {
    /// Set the absolute epsilon
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the relative epsilon
    pub fn with_relative_epsilon(mut self, fraction: f64) -> Self {
        self.relative_epsilon = fraction;
        self
    }

    /// Set the neighbor radius
    pub fn with_neighbor_radius(mut self, radius: usize) -> Self {
        self.neighbor_radius = radius;
        self
    }

    /// Set the full-scan limit
    pub fn with_full_scan_limit(mut self, limit: usize) -> Self {
        self.full_scan_limit = limit;
        self
    }
}
