//! Feature-space declarations
//!
//! A `FeatureSpec` describes one input dimension the scenario generator may
//! vary: its kind, its admissible range or categories, and how typical values
//! are distributed.

use super::value::Value;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Kind of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Continuous,
    Discrete,
    Categorical,
}

/// Sampling distribution for "typical" values of a numeric feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Distribution {
    #[default]
    Uniform,
    /// Gaussian, clamped to range. Defaults: mean = midpoint, std = range / 6
    Normal {
        #[serde(default)]
        mean: Option<f64>,
        #[serde(default)]
        std: Option<f64>,
    },
    /// Exponential offset from the range minimum. Default scale = range / 3
    Exponential {
        #[serde(default)]
        scale: Option<f64>,
    },
}

/// Declaration of one feature of the scenario space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,

    pub kind: FeatureKind,

    /// `[min, max]` for continuous and discrete features
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,

    /// Category set for categorical features
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Value>,

    #[serde(default)]
    pub distribution: Distribution,
}

impl FeatureSpec {
    /// Continuous feature over `[min, max]`
    pub fn continuous(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Continuous,
            range: Some((min, max)),
            categories: Vec::new(),
            distribution: Distribution::Uniform,
        }
    }

    /// Integer-valued feature over `[min, max]`
    pub fn discrete(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Discrete,
            range: Some((min as f64, max as f64)),
            categories: Vec::new(),
            distribution: Distribution::Uniform,
        }
    }

    /// Categorical feature over a fixed category set
    pub fn categorical<V: Into<Value>>(
        name: impl Into<String>,
        categories: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Categorical,
            range: None,
            categories: categories.into_iter().map(Into::into).collect(),
            distribution: Distribution::Uniform,
        }
    }

    /// Set the sampling distribution
    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, FeatureKind::Continuous | FeatureKind::Discrete)
    }

    /// `(min, max)` of a numeric feature; `None` for categorical features
    pub fn bounds(&self) -> Option<(f64, f64)> {
        if self.is_numeric() {
            self.range
        } else {
            None
        }
    }

    /// Width of a numeric range, 0 for categorical features
    pub fn span(&self) -> f64 {
        self.bounds().map(|(lo, hi)| hi - lo).unwrap_or(0.0)
    }

    /// Clamp (and for discrete features, round) a numeric value into range
    pub fn clamp(&self, value: f64) -> f64 {
        let Some((lo, hi)) = self.bounds() else {
            return value;
        };
        let clamped = value.clamp(lo, hi);
        match self.kind {
            FeatureKind::Discrete => clamped.round().clamp(lo.ceil(), hi.floor()),
            _ => clamped,
        }
    }

    /// Check the declaration is usable
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::configuration("<unnamed>", "feature name is empty"));
        }

        match self.kind {
            FeatureKind::Continuous | FeatureKind::Discrete => {
                let (lo, hi) = self.range.ok_or_else(|| {
                    CoreError::configuration(&self.name, "numeric feature requires a range")
                })?;
                if !lo.is_finite() || !hi.is_finite() {
                    return Err(CoreError::configuration(
                        &self.name,
                        format!("range bounds must be finite, got [{}, {}]", lo, hi),
                    ));
                }
                if lo > hi {
                    return Err(CoreError::configuration(
                        &self.name,
                        format!("range is inverted: min {} > max {}", lo, hi),
                    ));
                }
                if self.kind == FeatureKind::Discrete && lo.ceil() > hi.floor() {
                    return Err(CoreError::configuration(
                        &self.name,
                        format!("discrete range [{}, {}] contains no integer", lo, hi),
                    ));
                }
            }
            FeatureKind::Categorical => {
                if self.categories.is_empty() {
                    return Err(CoreError::configuration(
                        &self.name,
                        "categorical feature requires at least one category",
                    ));
                }
            }
        }

        match &self.distribution {
            Distribution::Normal { std: Some(std), .. } if !(*std > 0.0) => Err(
                CoreError::configuration(&self.name, format!("normal std must be > 0, got {}", std)),
            ),
            Distribution::Exponential { scale: Some(scale) } if !(*scale > 0.0) => {
                Err(CoreError::configuration(
                    &self.name,
                    format!("exponential scale must be > 0, got {}", scale),
                ))
            }
            _ => Ok(()),
        }
    }
}
