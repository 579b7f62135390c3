//! Integration tests for the failure detector

mod common;

use common::{applicant, execute, executor, generator, init_tracing};
use faultline_detector::{
    Detection, DetectorConfig, DetectorError, FailureDetector, FailurePredicate,
};
use faultline_scenario::Strategy;

fn detector() -> FailureDetector {
    FailureDetector::new(DetectorConfig::default()).unwrap()
}

#[test]
fn test_small_batch_is_insufficient() {
    let batch = execute(
        (0..5)
            .map(|i| applicant(&format!("s{i}"), 600.0 + i as f64, 0.5, "US"))
            .collect(),
    );
    let err = detector().analyze(&batch).unwrap_err();
    assert_eq!(err, DetectorError::insufficient("batch", 21, 5));
}

#[test]
fn test_planted_outlier_is_flagged() {
    init_tracing();
    let mut scenarios: Vec<_> = (0..100)
        .map(|i| {
            applicant(
                &format!("s{i}"),
                600.0 + (i % 10) as f64,
                0.5 + (i % 7) as f64 * 0.01,
                "US",
            )
        })
        .collect();
    scenarios.push(applicant("outlier", 845.0, 0.01, "US"));
    let batch = execute(scenarios);

    let anomalies = detector().detect_anomalies(&batch).unwrap();
    // ceil(0.1 * 101)
    assert_eq!(anomalies.flagged_count(), 11);
    assert!(anomalies.flagged_indices().contains(&100));

    let edge_cases = detector().find_edge_cases(&batch).unwrap();
    assert_eq!(edge_cases.len(), 10);
    assert_eq!(edge_cases[0].scenario_id, "outlier");
    assert_eq!(edge_cases[0].outcome, "approve");
}

#[test]
fn test_analysis_is_deterministic() {
    let scenarios = generator().generate(Strategy::monte_carlo(), 300, 7).unwrap();
    let batch = execute(scenarios);

    let first = detector().analyze(&batch).unwrap();
    let second = detector().analyze(&batch).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.anomalies.flagged_count(), 30);
    assert_eq!(first.local_anomalies.flagged_count(), 30);
}

#[test]
fn test_failure_clusters() {
    let mut scenarios = Vec::new();
    for i in 0..20 {
        scenarios.push(applicant(&format!("low-{i}"), 400.0, 0.8, "US"));
        scenarios.push(applicant(&format!("mid-{i}"), 650.0, 0.9, "APAC"));
        scenarios.push(applicant(&format!("prime-{i}"), 800.0, 0.1, "US"));
    }
    let batch = execute(scenarios);

    let result = detector().discover_failure_clusters(&batch).unwrap();
    assert_eq!(result.failures, 40);
    assert_eq!(result.noise, 0);
    assert_eq!(result.clusters.len(), 2);

    let low = &result.clusters[0];
    assert_eq!(low.size, 20);
    assert_eq!(low.dominant_outcome, "deny");
    assert!(low.rules_involved.is_empty());
    assert!((low.mean_confidence - 0.3).abs() < 1e-12);
    assert_eq!(low.centroid["credit_score"].as_number(), Some(400.0));
    assert_eq!(low.centroid["region"].as_str(), Some("US"));
    assert!(low.member_ids.iter().all(|id| id.starts_with("low-")));

    assert_eq!(result.clusters[1].centroid["region"].as_str(), Some("APAC"));
}

#[test]
fn test_failure_predicate_by_outcome() {
    let mut scenarios = Vec::new();
    for i in 0..20 {
        scenarios.push(applicant(&format!("eu-{i}"), 650.0, 0.5, "EU"));
        scenarios.push(applicant(&format!("us-{i}"), 650.0, 0.5, "US"));
    }
    let batch = execute(scenarios);

    let config = DetectorConfig::default().with_failure(FailurePredicate::outcomes(["review"]));
    let result = FailureDetector::new(config)
        .unwrap()
        .discover_failure_clusters(&batch)
        .unwrap();
    assert_eq!(result.failures, 20);
    assert_eq!(result.clusters.len(), 1);
    assert_eq!(result.clusters[0].rules_involved, vec!["eu_review"]);
}

#[test]
fn test_too_few_failures_yield_no_clusters() {
    init_tracing();
    let mut scenarios: Vec<_> = (0..30)
        .map(|i| applicant(&format!("ok-{i}"), 800.0, 0.1, "US"))
        .collect();
    scenarios.push(applicant("fail-0", 400.0, 0.8, "US"));
    scenarios.push(applicant("fail-1", 410.0, 0.8, "US"));
    let batch = execute(scenarios);

    let result = detector().discover_failure_clusters(&batch).unwrap();
    assert!(result.clusters.is_empty());
    assert_eq!(result.failures, 2);
    assert_eq!(result.noise, 2);
}

#[test]
fn test_instability_near_threshold() {
    init_tracing();
    let config = DetectorConfig {
        probes: 20,
        ..DetectorConfig::default()
    };
    let detector = FailureDetector::new(config).unwrap();
    let bases = vec![
        applicant("edge", 701.0, 0.1, "US"),
        applicant("safe", 820.0, 0.1, "US"),
    ];

    let analysis = detector
        .detect_instability(&executor(), &generator(), &bases, 0.05)
        .unwrap();
    assert_eq!(analysis.findings.len(), 40);
    assert_eq!(analysis.reports.len(), 2);

    let edge = analysis.report("edge").unwrap();
    assert!(edge.score > 0.0);
    assert_eq!(edge.score, edge.flips as f64 / edge.evaluated as f64);
    let minimal = edge.minimal_flip_magnitude.unwrap();
    assert!(minimal > 0.0 && minimal <= 0.05);

    let safe = analysis.report("safe").unwrap();
    assert_eq!(safe.score, 0.0);
    assert_eq!(safe.minimal_flip_magnitude, None);

    for finding in analysis.flips() {
        assert_eq!(finding.base_id, "edge");
        assert_eq!(finding.base_outcome, "approve");
        assert!(finding.perturbed_id.starts_with("edge/p"));
    }
    assert_eq!(analysis.unstable_count(), 1);
}

#[test]
fn test_instability_requires_bases() {
    let err = detector()
        .detect_instability(&executor(), &generator(), &[], 0.05)
        .unwrap_err();
    assert!(matches!(err, DetectorError::InsufficientData { actual: 0, .. }));
}

#[test]
fn test_magnitude_sweep_is_monotone_for_single_threshold() {
    let base = applicant("edge", 701.0, 0.1, "US");
    let sweep = detector()
        .magnitude_sweep(&executor(), &generator(), &base, &[0.2, 0.01, 0.05])
        .unwrap();

    let magnitudes: Vec<f64> = sweep.points.iter().map(|p| p.magnitude).collect();
    assert_eq!(magnitudes, vec![0.01, 0.05, 0.2]);
    assert!(sweep.is_monotone());
    assert!(sweep.points[2].flip_rate >= sweep.points[0].flip_rate);
}

#[test]
fn test_detections_flatten_report() {
    let mut scenarios = Vec::new();
    for i in 0..20 {
        scenarios.push(applicant(&format!("low-{i}"), 400.0 + i as f64, 0.8, "US"));
        scenarios.push(applicant(&format!("prime-{i}"), 800.0 - i as f64, 0.1, "US"));
    }
    let batch = execute(scenarios);
    let detector = detector();
    let bases = vec![applicant("edge", 701.0, 0.1, "US")];
    let report = detector
        .analyze(&batch)
        .unwrap()
        .with_instability(
            detector
                .detect_instability(&executor(), &generator(), &bases, 0.05)
                .unwrap(),
        );

    let summary = report.summary();
    assert_eq!(summary.total_anomalies, 4);
    assert_eq!(summary.total_clusters, report.clusters().len());

    let detections = report.detections();
    let anomaly_ids = detections
        .iter()
        .find_map(|d| match d {
            Detection::Anomaly { method, scenario_ids, .. } if method == "isolation_forest" => {
                Some(scenario_ids.len())
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(anomaly_ids, 4);
    let flips = detections
        .iter()
        .filter(|d| matches!(d, Detection::Instability(_)))
        .count();
    assert_eq!(flips, report.instability.as_ref().unwrap().flips().count());
}
