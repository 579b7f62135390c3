//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use faultline_core::{FeatureSpec, RuleSet, RuleSetDocument, Scenario, Value};

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const LOAN_POLICY: &str = r#"
rule_set_name: loan_policy
version: 2
rules:
  - rule_id: prime
    name: Prime applicant
    priority: 1
    conditions:
      - feature: credit_score
        operator: ">"
        value: 700
        logical: AND
      - feature: debt_ratio
        operator: "<"
        value: 0.4
    decision:
      outcome: approve
      confidence: 0.9
  - rule_id: subprime
    name: Subprime applicant
    priority: 2
    conditions:
      - feature: credit_score
        operator: "<"
        value: 550
        logical: OR
      - feature: debt_ratio
        operator: ">"
        value: 0.8
    decision:
      outcome: deny
      confidence: 0.8
  - rule_id: eu_manual
    name: EU manual review
    priority: 3
    stop_on_match: false
    conditions:
      - feature: region
        operator: in
        value: [EU]
    decision:
      outcome: review
      confidence: 0.6
default_decision:
  outcome: review
  confidence: 0.4
"#;

pub fn loan_document() -> RuleSetDocument {
    serde_yaml::from_str(LOAN_POLICY).expect("valid YAML")
}

pub fn loan_policy() -> RuleSet {
    loan_document().into_ruleset().expect("valid rule set")
}

pub fn loan_space() -> Vec<FeatureSpec> {
    vec![
        FeatureSpec::continuous("credit_score", 300.0, 850.0),
        FeatureSpec::continuous("debt_ratio", 0.0, 1.0),
        FeatureSpec::discrete("age", 18, 80),
        FeatureSpec::categorical("region", ["US", "EU", "APAC"]),
    ]
}

/// Scenario with numeric features
pub fn scenario(id: &str, values: &[(&str, f64)]) -> Scenario {
    Scenario::from_values(id, values.iter().map(|(k, v)| (*k, Value::Number(*v))))
}
