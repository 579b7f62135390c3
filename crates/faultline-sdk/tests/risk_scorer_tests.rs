//! Integration tests for risk scoring

mod common;

use common::{init_tracing, scenario};
use faultline_core::{Condition, Decision, Operator, Rule, RuleSet};
use faultline_runtime::DecisionExecutor;
use faultline_sdk::{Metric, RiskMetrics, RiskScorer, Severity};

#[test]
fn test_all_zero_metrics_are_low() {
    let report = RiskScorer::default().score_metrics(&RiskMetrics::uniform(0.0));
    assert_eq!(report.composite, 0.0);
    assert_eq!(report.severity, Severity::Low);
}

#[test]
fn test_all_one_metrics_are_critical() {
    let report = RiskScorer::default().score_metrics(&RiskMetrics::uniform(1.0));
    assert_eq!(report.composite, 1.0);
    assert_eq!(report.severity, Severity::Critical);
}

#[test]
fn test_report_is_decomposable() {
    let metrics = RiskMetrics {
        instability: 0.4,
        conflict_density: 0.1,
        coverage_gap: 0.25,
        decision_concentration: 0.6,
        confidence_variance: 0.2,
    };
    let report = RiskScorer::default().score_metrics(&metrics);

    assert_eq!(report.sub_scores.len(), 5);
    let mut total = 0.0;
    for metric in Metric::ALL {
        let sub = report.sub_score(metric).unwrap();
        assert_eq!(sub.raw, metrics.get(metric));
        assert_eq!(sub.contribution, sub.weight * sub.score);
        total += sub.contribution;
    }
    assert!((report.composite - total).abs() < 1e-12);
    // 0.14 + 0.025 + 0.05 + 0.06 + 0.02
    assert!((report.composite - 0.295).abs() < 1e-12);
    assert_eq!(report.severity, Severity::Low);
    assert_eq!(report.drivers()[0].metric, Metric::Instability);
    assert_eq!(
        report.sub_score(Metric::CoverageGap).unwrap().severity,
        Severity::Critical
    );
}

#[test]
fn test_score_executed_batch() {
    init_tracing();
    let ruleset = RuleSet::builder("credit")
        .rule(
            Rule::new("approve_prime", 1, Decision::new("approve", 0.9))
                .when(Condition::compare("credit_score", Operator::Gt, 700.0)),
        )
        .rule(
            Rule::new("deny_subprime", 2, Decision::new("deny", 0.8))
                .when(Condition::compare("credit_score", Operator::Lt, 550.0)),
        )
        .default_decision(Decision::new("review", 0.5))
        .build()
        .unwrap();

    let mut scenarios = Vec::new();
    for i in 0..4 {
        scenarios.push(scenario(&format!("a{i}"), &[("credit_score", 750.0 + i as f64)]));
    }
    for i in 0..3 {
        scenarios.push(scenario(&format!("d{i}"), &[("credit_score", 500.0 + i as f64)]));
        scenarios.push(scenario(&format!("r{i}"), &[("credit_score", 600.0 + i as f64)]));
    }
    let batch = DecisionExecutor::new(ruleset).execute_batch(scenarios);

    let report = RiskScorer::default().score(&batch, None);
    assert_eq!(report.inputs.executed, 10);
    assert_eq!(report.inputs.default_resolved, 3);
    assert_eq!(report.score(Metric::Instability), 0.0);
    assert!((report.score(Metric::CoverageGap) - 0.3).abs() < 1e-12);
    // counts 4/3/3: sum |a-b| = 4 over 2 * 10 * (3 - 1)
    assert!((report.score(Metric::DecisionConcentration) - 0.1).abs() < 1e-12);
    // variance 0.0285 normalized by 0.25
    assert!((report.score(Metric::ConfidenceVariance) - 0.114).abs() < 1e-9);
    assert_eq!(
        report.score(Metric::ConflictDensity),
        batch.boundary_index().density()
    );
    assert_eq!(report.inputs.pairs_examined, batch.boundary_index().examined);
}

#[test]
fn test_report_renders_and_serializes() {
    let report = RiskScorer::default().score_metrics(&RiskMetrics::uniform(0.5));
    let text = report.to_string();
    assert!(text.contains("Risk level: MEDIUM"));
    assert!(text.contains("conflict_density"));

    let json = report.to_json().unwrap();
    assert!(json.contains("\"severity\": \"medium\""));
    assert!(json.contains("\"metric\": \"instability\""));
}
