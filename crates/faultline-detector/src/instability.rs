//! Instability testing
//!
//! A base scenario is unstable when small perturbations of it change the
//! decision. Each base is probed with seeded perturbed neighbors which are
//! re-executed through the same [`DecisionExecutor`].

use crate::error::{DetectorError, Result};
use faultline_core::Scenario;
use faultline_runtime::DecisionExecutor;
use faultline_scenario::{PerturbationSpec, ScenarioGenerator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Probe parameters shared by every base scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Perturbed neighbors per base
    pub probes: usize,
    /// Bisection steps tightening the minimal flipping magnitude
    pub refine_steps: usize,
    pub seed: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            probes: 10,
            refine_steps: 4,
            seed: 42,
        }
    }
}

/// One probe compared with its base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstabilityFinding {
    pub base_id: String,
    pub perturbed_id: String,
    pub flipped: bool,
    /// Requested perturbation magnitude
    pub magnitude: f64,
    /// Normalized distance actually travelled
    pub distance: f64,
    pub base_outcome: String,
    /// `None` when the probe failed to evaluate
    pub perturbed_outcome: Option<String>,
}

/// Per-base summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstabilityReport {
    pub base_id: String,
    pub base_outcome: String,
    pub probes: usize,
    /// Probes that evaluated successfully
    pub evaluated: usize,
    pub flips: usize,
    /// flips / evaluated probes
    pub score: f64,
    /// Smallest magnitude observed to flip the decision
    pub minimal_flip_magnitude: Option<f64>,
}

impl InstabilityReport {
    pub fn is_unstable(&self) -> bool {
        self.flips > 0
    }
}

/// Findings and reports for a set of base scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstabilityAnalysis {
    pub magnitude: f64,
    pub findings: Vec<InstabilityFinding>,
    pub reports: Vec<InstabilityReport>,
    /// Bases that could not be evaluated
    pub skipped: Vec<String>,
}

impl InstabilityAnalysis {
    /// Mean instability score over probed bases, 0.0 when none
    pub fn mean_score(&self) -> f64 {
        if self.reports.is_empty() {
            return 0.0;
        }
        self.reports.iter().map(|r| r.score).sum::<f64>() / self.reports.len() as f64
    }

    pub fn unstable_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_unstable()).count()
    }

    pub fn report(&self, base_id: &str) -> Option<&InstabilityReport> {
        self.reports.iter().find(|r| r.base_id == base_id)
    }

    /// Findings whose decision flipped
    pub fn flips(&self) -> impl Iterator<Item = &InstabilityFinding> {
        self.findings.iter().filter(|f| f.flipped)
    }
}

/// Seed of the probes drawn around the base at `position`
pub fn derive_seed(seed: u64, position: usize) -> u64 {
    seed.wrapping_add((position as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Probe every base scenario at `magnitude` (relative to feature ranges)
pub fn detect_instability(
    executor: &DecisionExecutor,
    generator: &ScenarioGenerator,
    base_scenarios: &[Scenario],
    magnitude: f64,
    settings: &ProbeSettings,
) -> Result<InstabilityAnalysis> {
    if base_scenarios.is_empty() {
        return Err(DetectorError::insufficient("instability", 1, 0));
    }
    if settings.probes == 0 {
        return Err(DetectorError::Configuration("probes must be at least 1".to_string()));
    }

    let spans = spans(generator);
    let spec = PerturbationSpec::relative(magnitude);
    let mut analysis = InstabilityAnalysis {
        magnitude,
        findings: Vec::new(),
        reports: Vec::new(),
        skipped: Vec::new(),
    };

    for (position, base) in base_scenarios.iter().enumerate() {
        let base_outcome = match executor.evaluate(base) {
            Ok(evaluation) => evaluation.decision.outcome,
            Err(e) => {
                tracing::warn!("Skipping instability probe of '{}': {}", base.id, e);
                analysis.skipped.push(base.id.clone());
                continue;
            }
        };

        let probes = generator.perturb(
            base,
            &spec,
            settings.probes,
            derive_seed(settings.seed, position),
        )?;

        let mut evaluated = 0;
        let mut flips = 0;
        let mut minimal: Option<f64> = None;
        for probe in &probes {
            let perturbed_outcome = executor.evaluate(probe).ok().map(|e| e.decision.outcome);
            let flipped = perturbed_outcome
                .as_deref()
                .is_some_and(|o| o != base_outcome);
            if perturbed_outcome.is_some() {
                evaluated += 1;
            }
            if flipped {
                flips += 1;
                let tightened = refine(
                    executor,
                    generator,
                    base,
                    probe,
                    &base_outcome,
                    magnitude,
                    settings.refine_steps,
                )?;
                minimal = Some(minimal.map_or(tightened, |m| m.min(tightened)));
            }

            analysis.findings.push(InstabilityFinding {
                base_id: base.id.clone(),
                perturbed_id: probe.id.clone(),
                flipped,
                magnitude,
                distance: probe
                    .perturbation
                    .as_ref()
                    .map(|p| p.distance(&spans))
                    .unwrap_or(0.0),
                base_outcome: base_outcome.clone(),
                perturbed_outcome,
            });
        }

        analysis.reports.push(InstabilityReport {
            base_id: base.id.clone(),
            base_outcome,
            probes: probes.len(),
            evaluated,
            flips,
            score: if evaluated == 0 {
                0.0
            } else {
                flips as f64 / evaluated as f64
            },
            minimal_flip_magnitude: minimal,
        });
    }

    tracing::info!(
        "Probed {} base scenarios at magnitude {}: {} unstable, mean score {:.3}",
        analysis.reports.len(),
        magnitude,
        analysis.unstable_count(),
        analysis.mean_score()
    );

    Ok(analysis)
}

/// Bisect along the probe's recorded direction for the smallest magnitude
/// that still flips the decision
fn refine(
    executor: &DecisionExecutor,
    generator: &ScenarioGenerator,
    base: &Scenario,
    probe: &Scenario,
    base_outcome: &str,
    magnitude: f64,
    steps: usize,
) -> Result<f64> {
    let mut lo = 0.0;
    let mut hi = magnitude;
    for _ in 0..steps {
        let mid = (lo + hi) / 2.0;
        let candidate = generator.rescale(base, probe, mid)?;
        let flips = executor
            .evaluate(&candidate)
            .is_ok_and(|e| e.decision.outcome != base_outcome);
        if flips {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(hi)
}

/// Flip rate observed at one magnitude
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub magnitude: f64,
    pub evaluated: usize,
    pub flips: usize,
    pub flip_rate: f64,
}

/// Flip rate as a function of perturbation magnitude for one base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeSweep {
    pub base_id: String,
    /// Ascending by magnitude
    pub points: Vec<SweepPoint>,
    /// Consecutive magnitudes `(smaller, larger)` where the flip rate dropped
    pub violations: Vec<(f64, f64)>,
}

impl MagnitudeSweep {
    pub fn is_monotone(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Flip rate of `base` at each magnitude, with every magnitude reusing the
/// same seed so probes share their directions
pub fn magnitude_sweep(
    executor: &DecisionExecutor,
    generator: &ScenarioGenerator,
    base: &Scenario,
    magnitudes: &[f64],
    probes: usize,
    seed: u64,
) -> Result<MagnitudeSweep> {
    if magnitudes.is_empty() {
        return Err(DetectorError::insufficient("magnitude sweep", 1, 0));
    }
    let base_outcome = executor.evaluate(base)?.decision.outcome;

    let mut sorted = magnitudes.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut points = Vec::with_capacity(sorted.len());
    for magnitude in sorted {
        let neighbors =
            generator.perturb(base, &PerturbationSpec::relative(magnitude), probes, seed)?;
        let outcomes: Vec<String> = neighbors
            .iter()
            .filter_map(|s| executor.evaluate(s).ok())
            .map(|e| e.decision.outcome)
            .collect();
        let flips = outcomes.iter().filter(|o| **o != base_outcome).count();
        points.push(SweepPoint {
            magnitude,
            evaluated: outcomes.len(),
            flips,
            flip_rate: if outcomes.is_empty() {
                0.0
            } else {
                flips as f64 / outcomes.len() as f64
            },
        });
    }

    let violations: Vec<(f64, f64)> = points
        .windows(2)
        .filter(|w| w[1].flip_rate < w[0].flip_rate)
        .map(|w| (w[0].magnitude, w[1].magnitude))
        .collect();
    if !violations.is_empty() {
        tracing::warn!(
            "Flip rate of '{}' decreases with magnitude at {:?}",
            base.id,
            violations
        );
    }

    Ok(MagnitudeSweep {
        base_id: base.id.clone(),
        points,
        violations,
    })
}

fn spans(generator: &ScenarioGenerator) -> BTreeMap<String, f64> {
    generator
        .specs()
        .iter()
        .filter(|s| s.is_numeric())
        .map(|s| (s.name.clone(), s.span()))
        .collect()
}
