//! Common test utilities for runtime integration tests

#![allow(dead_code)]

use faultline_core::{RuleSet, RuleSetDocument, Scenario, Value};

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build a rule set from an inline YAML rule document
pub fn ruleset_from_yaml(yaml: &str) -> RuleSet {
    let doc: RuleSetDocument = serde_yaml::from_str(yaml).expect("valid YAML");
    RuleSet::try_from(doc).expect("valid rule set")
}

/// Credit policy used across tests:
/// credit_score > 700 → approve, credit_score < 550 → deny, otherwise review
pub fn credit_policy() -> RuleSet {
    ruleset_from_yaml(
        r#"
rule_set_name: credit_policy
version: "1.0"
rules:
  - rule_id: approve_prime
    name: Prime borrower
    priority: 1
    conditions:
      - feature: credit_score
        operator: ">"
        value: 700
    decision:
      outcome: approve
      confidence: 0.9
  - rule_id: deny_subprime
    name: Subprime borrower
    priority: 2
    conditions:
      - feature: credit_score
        operator: "<"
        value: 550
    decision:
      outcome: deny
      confidence: 0.8
default_decision:
  outcome: review
  confidence: 0.5
"#,
    )
}

/// Scenario with numeric features
pub fn scenario(id: &str, values: &[(&str, f64)]) -> Scenario {
    Scenario::from_values(id, values.iter().map(|(k, v)| (*k, Value::Number(*v))))
}
