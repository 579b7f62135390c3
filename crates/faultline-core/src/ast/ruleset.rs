//! RuleSet AST definitions
//!
//! A RuleSet is the immutable unit an engine evaluates: rules in evaluation
//! order plus the decision used when none of them fire. It can only be
//! obtained through [`RuleSetBuilder::build`] (or a document conversion),
//! which performs every load-time check.

use super::rule::{Decision, Rule};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Validated, immutable rule set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSet {
    name: String,
    version: String,
    /// Sorted by ascending priority, ties in declaration order
    rules: Vec<Rule>,
    default_decision: Decision,
}

impl RuleSet {
    /// Start building a rule set
    pub fn builder(name: impl Into<String>) -> RuleSetBuilder {
        RuleSetBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn default_decision(&self) -> &Decision {
        &self.default_decision
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Every outcome the rule set can produce, default included, sorted
    pub fn outcomes(&self) -> Vec<String> {
        let mut outcomes: BTreeSet<&str> = self
            .rules
            .iter()
            .map(|r| r.decision.outcome.as_str())
            .collect();
        outcomes.insert(self.default_decision.outcome.as_str());
        outcomes.into_iter().map(String::from).collect()
    }

    /// Every feature referenced by a condition, sorted
    pub fn features(&self) -> Vec<String> {
        let features: BTreeSet<&str> = self.rules.iter().flat_map(|r| r.features()).collect();
        features.into_iter().map(String::from).collect()
    }

    pub fn summary(&self) -> RuleSetSummary {
        RuleSetSummary {
            name: self.name.clone(),
            version: self.version.clone(),
            total_rules: self.rules.len(),
            stopping_rules: self.rules.iter().filter(|r| r.stop_on_match).count(),
            features: self.features(),
            outcomes: self.outcomes(),
        }
    }
}

/// Overview of a rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSetSummary {
    pub name: String,
    pub version: String,
    pub total_rules: usize,
    pub stopping_rules: usize,
    pub features: Vec<String>,
    pub outcomes: Vec<String>,
}

/// Builder for [`RuleSet`]
#[derive(Debug, Clone)]
pub struct RuleSetBuilder {
    name: String,
    version: String,
    rules: Vec<Rule>,
    default_decision: Option<Decision>,
}

impl RuleSetBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "1.0".to_string(),
            rules: Vec::new(),
            default_decision: None,
        }
    }

    /// Set the version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add a rule
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add multiple rules
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Set the decision used when no rule fires
    pub fn default_decision(mut self, decision: Decision) -> Self {
        self.default_decision = Some(decision);
        self
    }

    /// Validate and freeze the rule set
    pub fn build(self) -> Result<RuleSet> {
        let default_decision = self.default_decision.ok_or_else(|| {
            CoreError::schema("default_decision", "rule set has no default decision")
        })?;
        default_decision
            .validate()
            .map_err(|message| CoreError::schema("default_decision", message))?;

        let mut rules = self
            .rules
            .into_iter()
            .map(Rule::normalize)
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(CoreError::rule(&rule.id, "duplicate rule id"));
            }
        }

        // Stable: equal priorities keep declaration order
        rules.sort_by_key(|r| r.priority);

        tracing::debug!(
            "Built rule set '{}' v{} with {} rules",
            self.name,
            self.version,
            rules.len()
        );

        Ok(RuleSet {
            name: self.name,
            version: self.version,
            rules,
            default_decision,
        })
    }
}
