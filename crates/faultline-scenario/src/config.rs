//! Generator configuration

use faultline_core::CoreError;
use serde::{Deserialize, Serialize};

/// Share of each component in a Monte Carlo draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mixture {
    pub normal: f64,
    pub boundary: f64,
    pub adversarial: f64,
}

impl Default for Mixture {
    fn default() -> Self {
        Self {
            normal: 0.60,
            boundary: 0.25,
            adversarial: 0.15,
        }
    }
}

impl Mixture {
    pub fn new(normal: f64, boundary: f64, adversarial: f64) -> Self {
        Self {
            normal,
            boundary,
            adversarial,
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        let weights = [self.normal, self.boundary, self.adversarial];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(CoreError::configuration(
                "mixture",
                format!("weights must be finite and non-negative, got {:?}", weights),
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(CoreError::configuration("mixture", "weights sum to zero"));
        }
        Ok(())
    }

    /// Split `count` across (normal, boundary, adversarial) by largest remainder
    pub fn allocate(&self, count: usize) -> [usize; 3] {
        let weights = [self.normal, self.boundary, self.adversarial];
        let total: f64 = weights.iter().sum();
        // Nudge so shares like 0.15 * 100 are not floored to 14
        let exact: Vec<f64> = weights
            .iter()
            .map(|w| w / total * count as f64 + 1e-9)
            .collect();
        let mut sizes = [0usize; 3];
        for (size, share) in sizes.iter_mut().zip(&exact) {
            *size = share.floor() as usize;
        }

        let mut order: Vec<usize> = (0..3).collect();
        order.sort_by(|&a, &b| {
            let ra = exact[a] - exact[a].floor();
            let rb = exact[b] - exact[b].floor();
            rb.total_cmp(&ra).then(a.cmp(&b))
        });
        let assigned: usize = sizes.iter().sum();
        for &i in order.iter().take(count.saturating_sub(assigned)) {
            sizes[i] += 1;
        }
        sizes
    }
}

/// Strategy tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub mixture: Mixture,

    /// Offset from a rule threshold, as a fraction of range (discrete: 1 unit)
    pub threshold_offset: f64,

    /// Std of adversarial jitter around thresholds, as a fraction of range
    pub adversarial_jitter: f64,

    /// Features stacked near thresholds per adversarial scenario (at least)
    pub adversarial_min_features: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mixture: Mixture::default(),
            threshold_offset: 0.01,
            adversarial_jitter: 0.01,
            adversarial_min_features: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allocation() {
        assert_eq!(Mixture::default().allocate(100), [60, 25, 15]);
        assert_eq!(Mixture::default().allocate(10), [6, 3, 1]);
        let sizes = Mixture::default().allocate(7);
        assert_eq!(sizes.iter().sum::<usize>(), 7);
    }

    #[test]
    fn test_allocation_never_exceeds_count() {
        let mixtures = [
            Mixture::new(1.0, 1.0, 1.0),
            Mixture::new(0.1, 0.2, 0.7),
            Mixture::new(1.0, 0.0, 0.0),
            Mixture::new(1e-12, 1e-12, 1.0),
        ];
        for mixture in mixtures {
            for count in [0usize, 1, 2, 3, 7, 99, 1000] {
                let sizes = mixture.allocate(count);
                assert_eq!(sizes.iter().sum::<usize>(), count, "{:?} {}", mixture, count);
            }
        }
    }

    #[test]
    fn test_invalid_mixture() {
        assert!(Mixture::new(0.0, 0.0, 0.0).validate().is_err());
        assert!(Mixture::new(-1.0, 1.0, 1.0).validate().is_err());
        assert!(Mixture::new(1.0, 0.0, 0.0).validate().is_ok());
    }
}
