//! External rule-set document
//!
//! The serde shape of a rule definition as authored by users. Every field is
//! optional at the serde level so that structural gaps surface as
//! [`CoreError::Schema`] naming the missing field, rather than as an opaque
//! parser error. Converting into a [`RuleSet`] performs all load-time
//! validation.

use super::operator::Operator;
use super::rule::{Condition, ConditionValue, Connective, Decision, Rule};
use super::ruleset::RuleSet;
use crate::error::{CoreError, Result};
use crate::types::Value;
use serde::{Deserialize, Serialize};

/// Top-level rule document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSetDocument {
    #[serde(default)]
    pub rule_set_name: Option<String>,

    /// Accepts `1`, `1.0` or `"1.0.2"`
    #[serde(default)]
    pub version: Option<Value>,

    #[serde(default)]
    pub rules: Vec<RuleDocument>,

    #[serde(default)]
    pub default_decision: Option<DecisionDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    #[serde(default)]
    pub rule_id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub priority: Option<i32>,

    #[serde(default)]
    pub conditions: Vec<ConditionDocument>,

    #[serde(default)]
    pub decision: Option<DecisionDocument>,

    #[serde(default)]
    pub stop_on_match: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionDocument {
    #[serde(default)]
    pub feature: Option<String>,

    #[serde(default)]
    pub operator: Option<String>,

    #[serde(default)]
    pub value: Option<Value>,

    /// `AND` / `OR` joining this condition to the next
    #[serde(default, alias = "connective")]
    pub logical: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionDocument {
    #[serde(default)]
    pub outcome: Option<String>,

    #[serde(default)]
    pub confidence: Option<f64>,

    #[serde(default)]
    pub reasoning: Option<String>,
}

impl DecisionDocument {
    fn into_decision(self, field: &str, default_confidence: f64) -> Result<Decision> {
        let outcome = self
            .outcome
            .ok_or_else(|| CoreError::schema(format!("{}.outcome", field), "missing outcome"))?;
        Ok(Decision {
            outcome,
            confidence: self.confidence.unwrap_or(default_confidence),
            reasoning: self.reasoning.unwrap_or_default(),
        })
    }
}

impl ConditionDocument {
    fn into_condition(self, rule_id: &str, index: usize) -> Result<Condition> {
        let field = |name: &str| format!("rules[{}].conditions[{}].{}", rule_id, index, name);

        let feature = self
            .feature
            .ok_or_else(|| CoreError::schema(field("feature"), "missing feature"))?;
        let raw_operator = self
            .operator
            .ok_or_else(|| CoreError::schema(field("operator"), "missing operator"))?;
        let operator = Operator::parse(&raw_operator).ok_or_else(|| {
            CoreError::condition(
                rule_id,
                index,
                format!("unsupported operator '{}' on feature '{}'", raw_operator, feature),
            )
        })?;
        let raw_value = self
            .value
            .ok_or_else(|| CoreError::schema(field("value"), "missing value"))?;
        let value = ConditionValue::for_operator(operator, raw_value).map_err(|message| {
            CoreError::condition(rule_id, index, format!("feature '{}': {}", feature, message))
        })?;
        let connective = match self.logical {
            None => Connective::And,
            Some(text) => Connective::parse(&text).ok_or_else(|| {
                CoreError::condition(rule_id, index, format!("unknown connective '{}'", text))
            })?,
        };

        Ok(Condition {
            feature,
            operator,
            value,
            connective,
        })
    }
}

impl RuleDocument {
    fn into_rule(self, position: usize) -> Result<Rule> {
        let id = self.rule_id.ok_or_else(|| {
            CoreError::schema(format!("rules[{}].rule_id", position), "missing rule_id")
        })?;
        let priority = self.priority.ok_or_else(|| {
            CoreError::schema(format!("rules[{}].priority", id), "missing priority")
        })?;
        let decision = self
            .decision
            .ok_or_else(|| CoreError::schema(format!("rules[{}].decision", id), "missing decision"))?
            .into_decision(&format!("rules[{}].decision", id), 1.0)?;

        let conditions = self
            .conditions
            .into_iter()
            .enumerate()
            .map(|(index, c)| c.into_condition(&id, index))
            .collect::<Result<Vec<_>>>()?;

        Ok(Rule {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            priority,
            conditions,
            decision,
            stop_on_match: self.stop_on_match.unwrap_or(true),
        })
    }
}

impl TryFrom<RuleSetDocument> for RuleSet {
    type Error = CoreError;

    fn try_from(doc: RuleSetDocument) -> Result<Self> {
        let name = doc
            .rule_set_name
            .ok_or_else(|| CoreError::schema("rule_set_name", "missing rule_set_name"))?;
        let version = match doc.version {
            None | Some(Value::Null) => "1.0".to_string(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        };
        let default_decision = doc
            .default_decision
            .ok_or_else(|| CoreError::schema("default_decision", "rule set has no default decision"))?
            .into_decision("default_decision", 0.0)?;

        let rules = doc
            .rules
            .into_iter()
            .enumerate()
            .map(|(position, r)| r.into_rule(position))
            .collect::<Result<Vec<_>>>()?;

        RuleSet::builder(name)
            .version(version)
            .rules(rules)
            .default_decision(default_decision)
            .build()
    }
}

impl RuleSetDocument {
    /// Validate and convert into a [`RuleSet`]
    pub fn into_ruleset(self) -> Result<RuleSet> {
        RuleSet::try_from(self)
    }
}
