//! Common test utilities for scenario integration tests

#![allow(dead_code)]

use faultline_core::{Condition, Decision, FeatureSpec, Operator, Rule, RuleSet};

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn loan_space() -> Vec<FeatureSpec> {
    vec![
        FeatureSpec::continuous("credit_score", 300.0, 850.0),
        FeatureSpec::continuous("debt_ratio", 0.0, 1.0),
        FeatureSpec::discrete("age", 18, 80),
        FeatureSpec::categorical("region", ["US", "EU", "APAC"]),
    ]
}

/// credit_score > 700 and debt_ratio < 0.4 matter; region EU is special-cased
pub fn loan_rules() -> RuleSet {
    RuleSet::builder("loans")
        .rule(
            Rule::new("prime", 1, Decision::new("approve", 0.9))
                .when(Condition::compare("credit_score", Operator::Gt, 700.0))
                .when(Condition::compare("debt_ratio", Operator::Lt, 0.4)),
        )
        .rule(
            Rule::new("eu_review", 2, Decision::new("review", 0.6))
                .when(Condition::in_set("region", ["EU"])),
        )
        .default_decision(Decision::new("deny", 0.3))
        .build()
        .expect("valid rule set")
}
