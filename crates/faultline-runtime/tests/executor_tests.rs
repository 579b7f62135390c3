//! Integration tests for the decision executor

mod common;

use common::{credit_policy, init_tracing, scenario};
use faultline_core::FeatureSpec;
use faultline_runtime::{DecisionExecutor, ExecutorConfig};

#[test]
fn test_partial_failure_is_contained() {
    init_tracing();
    let executor = DecisionExecutor::new(credit_policy()).with_feature_space(vec![
        FeatureSpec::continuous("credit_score", 300.0, 850.0),
        FeatureSpec::continuous("income", 0.0, 200_000.0),
    ]);

    let scenarios: Vec<_> = (0..100)
        .map(|i| {
            if i == 42 {
                scenario("broken", &[("credit_score", 700.0)])
            } else {
                scenario(
                    &format!("s{i}"),
                    &[("credit_score", 300.0 + i as f64 * 5.5), ("income", 5.0e4)],
                )
            }
        })
        .collect();

    let batch = executor.execute_batch(scenarios);
    assert_eq!(batch.len(), 100);
    assert_eq!(batch.error_count(), 1);

    let errored: Vec<_> = batch.errors().collect();
    assert_eq!(errored.len(), 1);
    assert_eq!(errored[0].index, 42);
    assert!(errored[0].error.as_deref().unwrap().contains("income"));

    let indices: Vec<usize> = batch.results().iter().map(|r| r.index).collect();
    assert_eq!(indices, (0..100).collect::<Vec<_>>());
}

#[test]
fn test_single_boundary_pair() {
    let executor =
        DecisionExecutor::new(credit_policy()).with_config(ExecutorConfig::default().with_epsilon(1.0));
    let batch = executor.execute_batch(vec![
        scenario("below", &[("credit_score", 700.0), ("income", 6.0e4)]),
        scenario("above", &[("credit_score", 700.5), ("income", 6.0e4)]),
    ]);

    let pairs = batch.boundary_pairs();
    assert_eq!(pairs.len(), 1);
    let pair = &pairs[0];
    assert_eq!(pair.feature, "credit_score");
    assert_eq!(pair.first_id, "below");
    assert_eq!(pair.first_outcome, "review");
    assert_eq!(pair.second_outcome, "approve");
    assert!((pair.delta - 0.5).abs() < 1e-12);
    assert_eq!(batch.boundary_index().examined, 1);
}

#[test]
fn test_pairs_beyond_epsilon_or_same_outcome_are_not_flagged() {
    let executor =
        DecisionExecutor::new(credit_policy()).with_config(ExecutorConfig::default().with_epsilon(1.0));
    let batch = executor.execute_batch(vec![
        scenario("a", &[("credit_score", 699.0)]),
        scenario("b", &[("credit_score", 702.0)]),
        scenario("c", &[("credit_score", 720.0)]),
        scenario("d", &[("credit_score", 720.5)]),
    ]);
    assert!(batch.boundary_pairs().is_empty());
    assert_eq!(batch.boundary_index().examined, 6);
    assert_eq!(batch.boundary_index().density(), 0.0);
}

#[test]
fn test_relative_epsilon_uses_feature_range() {
    // 5% of a 550-point range is 27.5
    let executor = DecisionExecutor::new(credit_policy())
        .with_feature_space(vec![FeatureSpec::continuous("credit_score", 300.0, 850.0)]);
    let batch = executor.execute_batch(vec![
        scenario("a", &[("credit_score", 690.0)]),
        scenario("b", &[("credit_score", 710.0)]),
    ]);
    assert!((batch.epsilon_for("credit_score") - 27.5).abs() < 1e-9);
    assert_eq!(batch.boundary_pairs().len(), 1);
}

#[test]
fn test_activation_stats_are_memoized() {
    let executor = DecisionExecutor::new(credit_policy());
    let batch = executor.execute_batch(vec![
        scenario("a", &[("credit_score", 800.0)]),
        scenario("b", &[("credit_score", 750.0)]),
        scenario("c", &[("credit_score", 600.0)]),
        scenario("d", &[("credit_score", 500.0)]),
    ]);

    let first = batch.rule_activation_stats();
    let second = batch.rule_activation_stats();
    assert!(std::ptr::eq(first, second));
    assert!(std::ptr::eq(batch.boundary_pairs(), batch.boundary_pairs()));

    assert_eq!(first[0].rule_id, "approve_prime");
    assert_eq!(first[0].fired, 2);
    assert!((first[0].fire_rate - 0.5).abs() < 1e-12);
    assert_eq!(first[1].rule_id, "deny_subprime");
    assert_eq!(first[1].fired, 1);

    let summary = batch.execution_summary();
    assert_eq!(summary.default_resolved, 1);
    assert!((summary.coverage_gap_rate - 0.25).abs() < 1e-12);
    assert_eq!(summary.outcome_counts["approve"], 2);
    assert!(summary.dormant_rules.is_empty());

    let distribution = batch.decision_distribution();
    assert!((distribution["review"] - 0.25).abs() < 1e-12);
}

#[test]
fn test_declared_outcomes_seeded_at_zero() {
    let executor = DecisionExecutor::new(credit_policy());
    let batch = executor.execute_batch(vec![scenario("a", &[("credit_score", 800.0)])]);
    let counts = batch.outcome_counts();
    assert_eq!(counts.len(), 3);
    assert_eq!(counts["deny"], 0);
    assert_eq!(counts["review"], 0);
    assert_eq!(batch.execution_summary().dormant_rules, vec!["deny_subprime"]);
}

#[test]
fn test_partitioned_matches_sequential() {
    let executor = DecisionExecutor::new(credit_policy());
    let scenarios: Vec<_> = (0..257)
        .map(|i| scenario(&format!("s{i}"), &[("credit_score", 300.0 + (i * 37 % 550) as f64)]))
        .collect();

    let sequential = executor.execute_batch(scenarios.clone());
    for partitions in [1, 3, 8, 1000] {
        let partitioned = executor.execute_partitioned(scenarios.clone(), partitions);
        assert_eq!(partitioned.results(), sequential.results());
        assert_eq!(partitioned.stats(), sequential.stats());
    }
}

#[test]
fn test_decision_boundaries_sweep() {
    let executor = DecisionExecutor::new(credit_policy());
    let batch = executor.execute_batch(vec![
        scenario("a", &[("credit_score", 720.0)]),
        scenario("b", &[("credit_score", 500.0)]),
        scenario("c", &[("credit_score", 650.0)]),
    ]);
    let transitions = batch.decision_boundaries("credit_score");
    assert_eq!(transitions.len(), 2);
    assert_eq!(transitions[0].outcome_before, "deny");
    assert_eq!(transitions[0].outcome_after, "review");
    assert_eq!(transitions[1].rule_after.as_deref(), Some("approve_prime"));
    assert!(batch.decision_boundaries("unknown").is_empty());
}

#[test]
fn test_conflicting_scenarios() {
    let executor = DecisionExecutor::new(credit_policy());
    let batch = executor.execute_batch(vec![
        scenario("a", &[("credit_score", 699.0), ("income", 5.0e4)]),
        scenario("b", &[("credit_score", 705.0), ("income", 5.1e4)]),
        scenario("c", &[("credit_score", 400.0), ("income", 5.0e4)]),
    ]);
    let conflicts = batch.conflicting_scenarios(0.05);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].first_id, "a");
    assert_eq!(conflicts[0].second_id, "b");
    assert!(conflicts[0].similarity > 0.95);
}
