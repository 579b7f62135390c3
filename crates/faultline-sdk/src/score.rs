//! Risk scoring
//!
//! Converts executor statistics and detector findings into five bounded
//! sub-scores and a weighted composite. Scoring is a pure function of the
//! metrics: nothing is re-executed and nothing is random.
//!
//! | metric                 | raw value                                   | weight |
//! |------------------------|---------------------------------------------|--------|
//! | instability            | mean instability score of probed scenarios  | 0.35   |
//! | conflict density       | boundary pairs / pairs examined             | 0.25   |
//! | coverage gap           | default-resolved / executed                 | 0.20   |
//! | decision concentration | normalized Gini of outcome counts           | 0.10   |
//! | confidence variance    | population variance / 0.25                  | 0.10   |

use crate::error::{Result, SdkError};
use faultline_detector::InstabilityAnalysis;
use faultline_runtime::ExecutedBatch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Largest possible variance of values in [0, 1]
const MAX_CONFIDENCE_VARIANCE: f64 = 0.25;

/// Instability score above which a probed scenario is listed as high risk
const HIGH_RISK_INSTABILITY: f64 = 0.3;

/// Severity band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Band of a composite score: Low [0, 0.3), Medium [0.3, 0.55),
    /// High [0.55, 0.75), Critical [0.75, 1]
    pub fn from_composite(score: f64) -> Self {
        if score >= 0.75 {
            Severity::Critical
        } else if score >= 0.55 {
            Severity::High
        } else if score >= 0.3 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five scored metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Instability,
    ConflictDensity,
    CoverageGap,
    DecisionConcentration,
    ConfidenceVariance,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Instability,
        Metric::ConflictDensity,
        Metric::CoverageGap,
        Metric::DecisionConcentration,
        Metric::ConfidenceVariance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Instability => "instability",
            Metric::ConflictDensity => "conflict_density",
            Metric::CoverageGap => "coverage_gap",
            Metric::DecisionConcentration => "decision_concentration",
            Metric::ConfidenceVariance => "confidence_variance",
        }
    }

    /// Exclusive lower bounds of the medium, high and critical bands
    fn thresholds(&self) -> [f64; 3] {
        match self {
            Metric::Instability => [0.1, 0.3, 0.5],
            Metric::ConflictDensity => [0.05, 0.15, 0.3],
            Metric::CoverageGap => [0.05, 0.1, 0.2],
            Metric::DecisionConcentration => [0.4, 0.6, 0.8],
            // Standard deviations of 0.2, 0.3 and 0.4
            Metric::ConfidenceVariance => [0.16, 0.36, 0.64],
        }
    }

    /// Band of a single metric score
    pub fn severity(&self, score: f64) -> Severity {
        let [medium, high, critical] = self.thresholds();
        if score > critical {
            Severity::Critical
        } else if score > high {
            Severity::High
        } else if score > medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub instability: f64,
    pub conflict_density: f64,
    pub coverage_gap: f64,
    pub decision_concentration: f64,
    pub confidence_variance: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            instability: 0.35,
            conflict_density: 0.25,
            coverage_gap: 0.20,
            decision_concentration: 0.10,
            confidence_variance: 0.10,
        }
    }
}

impl ScoringWeights {
    pub fn weight(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Instability => self.instability,
            Metric::ConflictDensity => self.conflict_density,
            Metric::CoverageGap => self.coverage_gap,
            Metric::DecisionConcentration => self.decision_concentration,
            Metric::ConfidenceVariance => self.confidence_variance,
        }
    }

    /// Weights must be non-negative and sum to 1
    pub fn validate(&self) -> Result<()> {
        for metric in Metric::ALL {
            let w = self.weight(metric);
            if !(w.is_finite() && w >= 0.0) {
                return Err(SdkError::ConfigError(format!(
                    "weight of {} must be a non-negative number, got {}",
                    metric, w
                )));
            }
        }
        let total: f64 = Metric::ALL.iter().map(|m| self.weight(*m)).sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(SdkError::ConfigError(format!(
                "scoring weights must sum to 1, got {}",
                total
            )));
        }
        Ok(())
    }
}

/// Raw metric values, before clamping
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub instability: f64,
    pub conflict_density: f64,
    pub coverage_gap: f64,
    pub decision_concentration: f64,
    pub confidence_variance: f64,
}

impl RiskMetrics {
    /// Every metric set to `value`
    pub fn uniform(value: f64) -> Self {
        Self {
            instability: value,
            conflict_density: value,
            coverage_gap: value,
            decision_concentration: value,
            confidence_variance: value,
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Instability => self.instability,
            Metric::ConflictDensity => self.conflict_density,
            Metric::CoverageGap => self.coverage_gap,
            Metric::DecisionConcentration => self.decision_concentration,
            Metric::ConfidenceVariance => self.confidence_variance,
        }
    }
}

/// Counts the metrics were derived from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskInputs {
    pub executed: usize,
    pub errors: usize,
    pub default_resolved: usize,
    pub boundary_pairs: usize,
    pub pairs_examined: usize,
    pub outcome_counts: BTreeMap<String, usize>,
    pub mean_confidence: f64,
    /// Population variance of confidence, unnormalized
    pub confidence_variance: f64,
    pub probed_scenarios: usize,
    pub unstable_scenarios: usize,
    pub max_instability: f64,
    /// Probed scenarios whose instability score exceeds 0.3
    pub high_risk_scenarios: Vec<String>,
}

/// One metric's part of the composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub metric: Metric,
    /// Metric value as measured
    pub raw: f64,
    /// `raw` clamped to [0, 1]
    pub score: f64,
    pub weight: f64,
    /// `weight * score`
    pub contribution: f64,
    pub severity: Severity,
}

/// Decomposable risk assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub sub_scores: Vec<SubScore>,
    pub composite: f64,
    pub severity: Severity,
    pub inputs: RiskInputs,
}

impl RiskReport {
    pub fn sub_score(&self, metric: Metric) -> Option<&SubScore> {
        self.sub_scores.iter().find(|s| s.metric == metric)
    }

    /// Clamped score of one metric
    pub fn score(&self, metric: Metric) -> f64 {
        self.sub_score(metric).map(|s| s.score).unwrap_or(0.0)
    }

    /// Sub-scores ordered by contribution, largest first
    pub fn drivers(&self) -> Vec<&SubScore> {
        let mut drivers: Vec<&SubScore> = self.sub_scores.iter().collect();
        drivers.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
        drivers
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for RiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Risk level: {}", self.severity.as_str().to_uppercase())?;
        writeln!(f, "Composite risk score: {:.2} / 1.00", self.composite)?;
        for s in &self.sub_scores {
            writeln!(
                f,
                "  {:<24} score {:.3}  weight {:.2}  contribution {:.3}  ({})",
                s.metric.as_str(),
                s.score,
                s.weight,
                s.contribution,
                s.severity
            )?;
        }
        Ok(())
    }
}

/// Weighted risk scorer
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    weights: ScoringWeights,
}

impl RiskScorer {
    pub fn new(weights: ScoringWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score precomputed metrics
    pub fn score_metrics(&self, metrics: &RiskMetrics) -> RiskReport {
        self.report(metrics, RiskInputs::default())
    }

    /// Score an executed batch, with instability findings when probed
    pub fn score(&self, batch: &ExecutedBatch, instability: Option<&InstabilityAnalysis>) -> RiskReport {
        let stats = batch.stats();
        let boundaries = batch.boundary_index();

        let mut inputs = RiskInputs {
            executed: stats.executed,
            errors: stats.errors,
            default_resolved: stats.default_resolved,
            boundary_pairs: boundaries.pairs.len(),
            pairs_examined: boundaries.examined,
            outcome_counts: stats.outcome_counts.clone(),
            mean_confidence: stats.mean_confidence(),
            confidence_variance: stats.confidence_variance(),
            ..RiskInputs::default()
        };
        if let Some(analysis) = instability {
            inputs.probed_scenarios = analysis.reports.len();
            inputs.unstable_scenarios = analysis.unstable_count();
            inputs.max_instability = analysis.reports.iter().map(|r| r.score).fold(0.0, f64::max);
            inputs.high_risk_scenarios = analysis
                .reports
                .iter()
                .filter(|r| r.score > HIGH_RISK_INSTABILITY)
                .map(|r| r.base_id.clone())
                .collect();
        }

        let metrics = RiskMetrics {
            instability: instability.map(InstabilityAnalysis::mean_score).unwrap_or(0.0),
            conflict_density: boundaries.density(),
            coverage_gap: stats.coverage_gap_rate(),
            decision_concentration: normalized_gini(stats.outcome_counts.values().copied()),
            confidence_variance: stats.confidence_variance() / MAX_CONFIDENCE_VARIANCE,
        };

        let report = self.report(&metrics, inputs);
        tracing::info!(
            "Composite risk {:.3} ({}) over {} executed scenarios",
            report.composite,
            report.severity,
            report.inputs.executed
        );
        report
    }

    fn report(&self, metrics: &RiskMetrics, inputs: RiskInputs) -> RiskReport {
        let sub_scores: Vec<SubScore> = Metric::ALL
            .iter()
            .map(|&metric| {
                let raw = metrics.get(metric);
                let score = clamp_unit(raw);
                let weight = self.weights.weight(metric);
                SubScore {
                    metric,
                    raw,
                    score,
                    weight,
                    contribution: weight * score,
                    severity: metric.severity(score),
                }
            })
            .collect();

        let composite = clamp_unit(sub_scores.iter().map(|s| s.contribution).sum());
        RiskReport {
            severity: Severity::from_composite(composite),
            composite,
            sub_scores,
            inputs,
        }
    }
}

/// Composite score of raw metrics under the default weights
pub fn composite_score(metrics: &RiskMetrics) -> f64 {
    RiskScorer::default().score_metrics(metrics).composite
}

/// Clamp into [0, 1]; NaN counts as 0
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Gini coefficient of `counts` normalized by its maximum `(k - 1) / k`:
/// 1.0 when all mass sits in one category (or there is only one), 0.0 when
/// counts are uniform or empty
pub fn normalized_gini(counts: impl IntoIterator<Item = usize>) -> f64 {
    let counts: Vec<f64> = counts.into_iter().map(|c| c as f64).collect();
    let k = counts.len();
    let total: f64 = counts.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    if k == 1 {
        return 1.0;
    }
    let pairwise: f64 = counts
        .iter()
        .flat_map(|a| counts.iter().map(move |b| (a - b).abs()))
        .sum();
    pairwise / (2.0 * total * (k - 1) as f64)
}
