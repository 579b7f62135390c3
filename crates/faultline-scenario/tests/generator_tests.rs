//! Integration tests for scenario generation

mod common;

use common::{init_tracing, loan_rules, loan_space};
use faultline_core::{FeatureSpec, ScenarioStrategy, Value};
use faultline_scenario::{generate, PerturbationSpec, ScenarioGenerator, Strategy, ThresholdIndex};
use std::collections::HashSet;

fn generator() -> ScenarioGenerator {
    ScenarioGenerator::new(loan_space())
        .unwrap()
        .with_thresholds(ThresholdIndex::from_ruleset(&loan_rules()))
}

#[test]
fn test_same_seed_same_sequence() {
    init_tracing();
    let gen = generator();
    for strategy in [
        Strategy::Normal,
        Strategy::Boundary,
        Strategy::Adversarial,
        Strategy::monte_carlo(),
    ] {
        let a = gen.generate(strategy, 100, 42).unwrap();
        let b = gen.generate(strategy, 100, 42).unwrap();
        assert_eq!(a.len(), 100);
        assert_eq!(a, b, "{strategy:?} is not reproducible");
    }
}

#[test]
fn test_different_seed_differs() {
    let a = generate(Strategy::Normal, 50, &loan_space(), 1).unwrap();
    let b = generate(Strategy::Normal, 50, &loan_space(), 2).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_grid_cardinality() {
    let specs = vec![
        FeatureSpec::continuous("x", 0.0, 1.0),
        FeatureSpec::continuous("y", -10.0, 10.0),
    ];
    let grid = generate(Strategy::Grid { levels: 5 }, 25, &specs, 0).unwrap();
    assert_eq!(grid.len(), 25);

    let distinct: HashSet<String> = grid
        .iter()
        .map(|s| format!("{}|{}", s.values["x"], s.values["y"]))
        .collect();
    assert_eq!(distinct.len(), 25);
    assert!(grid.iter().all(|s| s.strategy == ScenarioStrategy::Grid));
    assert_eq!(grid[0].number("x"), Some(0.0));
    assert_eq!(grid[24].number("y"), Some(10.0));

    // Grid is seed independent
    assert_eq!(grid, generate(Strategy::Grid { levels: 5 }, 25, &specs, 99).unwrap());
}

#[test]
fn test_grid_exceeding_count_is_rejected() {
    let specs = vec![
        FeatureSpec::continuous("x", 0.0, 1.0),
        FeatureSpec::continuous("y", 0.0, 1.0),
    ];
    assert!(generate(Strategy::Grid { levels: 5 }, 24, &specs, 0).is_err());
    assert!(generate(Strategy::Grid { levels: 0 }, 10, &specs, 0).is_err());
}

#[test]
fn test_grid_discrete_levels_deduplicated() {
    let specs = vec![FeatureSpec::discrete("n", 0, 2)];
    let grid = generate(Strategy::Grid { levels: 5 }, 10, &specs, 0).unwrap();
    let values: Vec<f64> = grid.iter().filter_map(|s| s.number("n")).collect();
    assert_eq!(values, vec![0.0, 1.0, 2.0]);
}

#[test]
fn test_boundary_pins_extremes_and_thresholds() {
    let gen = generator();
    let scenarios = gen.generate(Strategy::Boundary, 200, 7).unwrap();
    let scores: Vec<f64> = scenarios.iter().filter_map(|s| s.number("credit_score")).collect();

    assert!(scores.contains(&300.0));
    assert!(scores.contains(&850.0));
    assert!(scores.contains(&700.0));
    // 1% of the 550-point range on either side of the threshold
    assert!(scores.iter().any(|x| (x - 694.5).abs() < 1e-9));
    assert!(scores.iter().any(|x| (x - 705.5).abs() < 1e-9));

    let regions: HashSet<String> = scenarios
        .iter()
        .map(|s| s.values["region"].to_string())
        .collect();
    assert!(regions.contains("\"US\""));
    assert!(regions.contains("\"APAC\""));
}

#[test]
fn test_boundary_threshold_triple_shares_background() {
    let gen = generator();
    let scenarios = gen.generate(Strategy::Boundary, 200, 3).unwrap();
    let at = scenarios
        .iter()
        .position(|s| s.number("credit_score") == Some(700.0))
        .unwrap();
    let (before, pinned, after) = (&scenarios[at - 1], &scenarios[at], &scenarios[at + 1]);
    for other in [before, after] {
        assert_eq!(other.values["debt_ratio"], pinned.values["debt_ratio"]);
        assert_eq!(other.values["age"], pinned.values["age"]);
        assert_eq!(other.values["region"], pinned.values["region"]);
    }
}

#[test]
fn test_adversarial_stacks_features_near_thresholds() {
    let gen = generator();
    let scenarios = gen.generate(Strategy::Adversarial, 200, 11).unwrap();
    let near = |s: &faultline_core::Scenario| {
        let mut hits = 0;
        if s.number("credit_score").is_some_and(|x| (x - 700.0).abs() < 30.0) {
            hits += 1;
        }
        if s.number("debt_ratio").is_some_and(|x| (x - 0.4).abs() < 0.05) {
            hits += 1;
        }
        hits
    };
    let stacked = scenarios.iter().filter(|s| near(*s) == 2).count();
    assert!(stacked > 20, "only {stacked} scenarios stacked both thresholds");
    assert!(scenarios.iter().all(|s| s.strategy == ScenarioStrategy::Adversarial));
}

#[test]
fn test_perturbation_records_lineage() {
    let gen = generator();
    let base = gen.generate(Strategy::Normal, 1, 5).unwrap().remove(0);
    let probes = gen
        .perturb(&base, &PerturbationSpec::relative(0.05), 8, 17)
        .unwrap();

    assert_eq!(probes.len(), 8);
    for (i, probe) in probes.iter().enumerate() {
        assert_eq!(probe.id, format!("{}/p{}", base.id, i));
        assert_eq!(probe.origin.as_deref(), Some(base.id.as_str()));
        assert_eq!(probe.strategy, ScenarioStrategy::Perturbation);
        let record = probe.perturbation.as_ref().unwrap();
        let delta = record.deltas["credit_score"];
        assert!(delta.abs() <= 0.05 * 550.0 + 1e-9);
        let moved = probe.number("credit_score").unwrap() - base.number("credit_score").unwrap();
        assert!((moved - delta).abs() < 1e-9);
    }
}

#[test]
fn test_larger_magnitude_moves_further_along_same_direction() {
    let gen = generator();
    let base = faultline_core::Scenario::from_values(
        "base",
        [
            ("credit_score", Value::Number(575.0)),
            ("debt_ratio", Value::Number(0.5)),
            ("age", Value::Number(40.0)),
            ("region", Value::from("US")),
        ],
    );
    let small = gen.perturb(&base, &PerturbationSpec::relative(0.01), 4, 8).unwrap();
    let large = gen.perturb(&base, &PerturbationSpec::relative(0.1), 4, 8).unwrap();
    for (s, l) in small.iter().zip(&large) {
        let ds = s.perturbation.as_ref().unwrap();
        let dl = l.perturbation.as_ref().unwrap();
        assert_eq!(ds.directions, dl.directions);
        let (a, b) = (ds.deltas["credit_score"], dl.deltas["credit_score"]);
        assert!(a.abs() <= b.abs() + 1e-12);
        assert!(a * b >= 0.0);
        for flipped in ds.flipped.keys() {
            assert!(dl.flipped.contains_key(flipped));
        }
    }
}

#[test]
fn test_perturb_only_one_feature() {
    let gen = generator();
    let base = gen.generate(Strategy::Normal, 1, 1).unwrap().remove(0);
    let probes = gen
        .perturb(&base, &PerturbationSpec::relative(0.02).only("debt_ratio"), 3, 2)
        .unwrap();
    for probe in probes {
        assert_eq!(probe.values["credit_score"], base.values["credit_score"]);
        assert_eq!(probe.values["region"], base.values["region"]);
        assert_eq!(probe.perturbation.unwrap().deltas.len(), 1);
    }
}

#[test]
fn test_rescale_follows_recorded_direction() {
    let gen = generator();
    let base = gen.generate(Strategy::Normal, 1, 21).unwrap().remove(0);
    let probe = gen
        .perturb(&base, &PerturbationSpec::absolute(10.0).only("credit_score"), 1, 4)
        .unwrap()
        .remove(0);
    let full = probe.perturbation.as_ref().unwrap().deltas["credit_score"];
    let half = gen.rescale(&base, &probe, 5.0).unwrap();
    let half_delta = half.perturbation.as_ref().unwrap().deltas["credit_score"];
    if base.number("credit_score").unwrap() + full > 300.0
        && base.number("credit_score").unwrap() + full < 850.0
    {
        assert!((half_delta - full / 2.0).abs() < 1e-9);
    }
    assert_eq!(half.origin.as_deref(), Some(base.id.as_str()));
}

#[test]
fn test_unknown_override_feature_rejected() {
    let gen = generator();
    let base = gen.generate(Strategy::Normal, 1, 1).unwrap().remove(0);
    let err = gen
        .perturb(&base, &PerturbationSpec::relative(0.1).with_override("salary", 0.2), 1, 0)
        .unwrap_err();
    assert!(err.to_string().contains("salary"));
    assert!(gen.perturb(&base, &PerturbationSpec::relative(-1.0), 1, 0).is_err());
}
