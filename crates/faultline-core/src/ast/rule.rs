//! Rule AST definitions

use super::operator::Operator;
use crate::error::{CoreError, Result};
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Logical connective joining a condition to the next one in its chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Connective {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl Connective {
    pub fn parse(s: &str) -> Option<Connective> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" | "&&" => Some(Connective::And),
            "OR" | "||" => Some(Connective::Or),
            _ => None,
        }
    }

    /// Fold one more condition result into an accumulated chain value
    pub fn apply(&self, acc: bool, next: bool) -> bool {
        match self {
            Connective::And => acc && next,
            Connective::Or => acc || next,
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connective::And => f.write_str("AND"),
            Connective::Or => f.write_str("OR"),
        }
    }
}

/// Right-hand operand of a condition, shaped by its operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    /// Inclusive bounds of `between`
    Range { low: Value, high: Value },
    /// Operand of `in` / `not_in`
    Set(Vec<Value>),
    /// Operand of `== != > < >= <=`
    Scalar(Value),
}

impl ConditionValue {
    /// Shape a raw document value for the given operator.
    ///
    /// `between` requires an ordered two-element array; `in`/`not_in` require
    /// an array; every other operator requires a scalar.
    pub fn for_operator(operator: Operator, raw: Value) -> std::result::Result<Self, String> {
        match operator {
            Operator::Between => match raw {
                Value::Array(items) if items.len() == 2 => {
                    let mut items = items.into_iter();
                    let (low, high) = match (items.next(), items.next()) {
                        (Some(low), Some(high)) => (low, high),
                        _ => return Err("between requires [low, high]".to_string()),
                    };
                    match low.loose_cmp(&high) {
                        Some(Ordering::Less) | Some(Ordering::Equal) => {
                            Ok(ConditionValue::Range { low, high })
                        }
                        Some(Ordering::Greater) => Err(format!(
                            "between bounds are not ordered: {} > {}",
                            low, high
                        )),
                        None => Err(format!(
                            "between bounds are not comparable: {} and {}",
                            low, high
                        )),
                    }
                }
                other => Err(format!(
                    "between requires a 2-element [low, high] array, got {}",
                    other
                )),
            },
            Operator::In | Operator::NotIn => match raw {
                Value::Array(items) => Ok(ConditionValue::Set(items)),
                other => Err(format!("{} requires an array of values, got {}", operator, other)),
            },
            Operator::Eq
            | Operator::Ne
            | Operator::Gt
            | Operator::Lt
            | Operator::Ge
            | Operator::Le => match raw {
                Value::Array(_) => Err(format!("{} requires a scalar value", operator)),
                scalar => Ok(ConditionValue::Scalar(scalar)),
            },
        }
    }

    /// Every literal mentioned by the operand
    pub fn literals(&self) -> Vec<&Value> {
        match self {
            ConditionValue::Scalar(v) => vec![v],
            ConditionValue::Set(items) => items.iter().collect(),
            ConditionValue::Range { low, high } => vec![low, high],
        }
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Scalar(v) => write!(f, "{}", v),
            ConditionValue::Set(items) => write!(f, "{}", Value::Array(items.clone())),
            ConditionValue::Range { low, high } => write!(f, "[{}, {}]", low, high),
        }
    }
}

/// One comparison in a rule's condition chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub feature: String,
    pub operator: Operator,
    pub value: ConditionValue,
    /// Joins this condition to the next one; ignored on the last condition
    #[serde(default)]
    pub connective: Connective,
}

impl Condition {
    /// Build a condition, shaping `value` for `operator`
    pub fn new(
        feature: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> std::result::Result<Self, String> {
        Ok(Self {
            feature: feature.into(),
            operator,
            value: ConditionValue::for_operator(operator, value.into())?,
            connective: Connective::And,
        })
    }

    /// Scalar comparison (`== != > < >= <=`)
    pub fn compare(feature: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            feature: feature.into(),
            operator,
            value: ConditionValue::Scalar(value.into()),
            connective: Connective::And,
        }
    }

    /// Membership test against a set
    pub fn in_set<V: Into<Value>>(
        feature: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            feature: feature.into(),
            operator: Operator::In,
            value: ConditionValue::Set(values.into_iter().map(Into::into).collect()),
            connective: Connective::And,
        }
    }

    /// Negated membership test against a set
    pub fn not_in_set<V: Into<Value>>(
        feature: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            operator: Operator::NotIn,
            ..Self::in_set(feature, values)
        }
    }

    /// Inclusive range test
    pub fn between(feature: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self {
            feature: feature.into(),
            operator: Operator::Between,
            value: ConditionValue::Range {
                low: low.into(),
                high: high.into(),
            },
            connective: Connective::And,
        }
    }

    /// Set the connective to the next condition
    pub fn then(mut self, connective: Connective) -> Self {
        self.connective = connective;
        self
    }

    /// Operand reshaped for the operator, e.g. a deserialized `[low, high]`
    /// set under `between` becomes a range
    pub fn shaped_value(&self) -> std::result::Result<ConditionValue, String> {
        let raw = match &self.value {
            ConditionValue::Scalar(v) => v.clone(),
            ConditionValue::Set(items) => Value::Array(items.clone()),
            ConditionValue::Range { low, high } => Value::Array(vec![low.clone(), high.clone()]),
        };
        ConditionValue::for_operator(self.operator, raw)
    }

    /// Replace the operand with its shaped form
    pub fn normalize(&mut self) -> std::result::Result<(), String> {
        self.value = self.shaped_value()?;
        Ok(())
    }

    /// Check operator/operand agreement
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.feature.trim().is_empty() {
            return Err("condition feature is empty".to_string());
        }
        let shaped = self.shaped_value()?;
        match (&self.value, &shaped) {
            (ConditionValue::Scalar(_), ConditionValue::Scalar(_))
            | (ConditionValue::Set(_), ConditionValue::Set(_))
            | (ConditionValue::Range { .. }, ConditionValue::Range { .. }) => Ok(()),
            _ => Err(format!(
                "operand {} does not fit operator {}",
                self.value, self.operator
            )),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.feature, self.operator, self.value)
    }
}

/// Decision produced by a rule or by the rule set default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub outcome: String,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl Decision {
    pub fn new(outcome: impl Into<String>, confidence: f64) -> Self {
        Self {
            outcome: outcome.into(),
            confidence,
            reasoning: String::new(),
        }
    }

    /// Set the reasoning text
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.outcome.trim().is_empty() {
            return Err("decision outcome is empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "decision confidence must be in [0, 1], got {}",
                self.confidence
            ));
        }
        Ok(())
    }
}

/// Rule definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule ID
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Lower values are evaluated first
    pub priority: i32,

    /// Condition chain, folded left-to-right
    pub conditions: Vec<Condition>,

    pub decision: Decision,

    /// Terminate evaluation when this rule fires
    pub stop_on_match: bool,
}

impl Rule {
    /// Create a stopping rule with no conditions yet
    pub fn new(id: impl Into<String>, priority: i32, decision: Decision) -> Self {
        let id = id.into();
        Rule {
            name: id.clone(),
            id,
            priority,
            conditions: Vec::new(),
            decision,
            stop_on_match: true,
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a condition
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Set the stop_on_match flag
    pub fn stop_on_match(mut self, stop: bool) -> Self {
        self.stop_on_match = stop;
        self
    }

    /// Load-time validation of this rule
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(CoreError::rule("<empty>", "rule id is empty"));
        }
        if self.conditions.is_empty() {
            return Err(CoreError::rule(&self.id, "rule has no conditions"));
        }
        for (index, condition) in self.conditions.iter().enumerate() {
            condition
                .validate()
                .map_err(|message| CoreError::condition(&self.id, index, message))?;
        }
        self.decision
            .validate()
            .map_err(|message| CoreError::rule(&self.id, message))
    }

    /// Reshape every operand for its operator, then validate
    pub fn normalize(mut self) -> Result<Self> {
        for (index, condition) in self.conditions.iter_mut().enumerate() {
            condition
                .normalize()
                .map_err(|message| CoreError::condition(&self.id, index, message))?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Features referenced by this rule, in condition order
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(|c| c.feature.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_creation() {
        let rule = Rule::new("R001", 1, Decision::new("approve", 0.9))
            .with_name("Prime borrower")
            .when(Condition::compare("credit_score", Operator::Gt, 700.0));

        assert_eq!(rule.id, "R001");
        assert_eq!(rule.name, "Prime borrower");
        assert!(rule.stop_on_match);
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_between_requires_ordered_pair() {
        let err = ConditionValue::for_operator(
            Operator::Between,
            Value::Array(vec![Value::Number(10.0), Value::Number(1.0)]),
        )
        .unwrap_err();
        assert!(err.contains("not ordered"));

        let err = ConditionValue::for_operator(Operator::Between, Value::Number(3.0)).unwrap_err();
        assert!(err.contains("2-element"));

        let err = ConditionValue::for_operator(
            Operator::Between,
            Value::Array(vec![Value::Number(1.0)]),
        )
        .unwrap_err();
        assert!(err.contains("2-element"));
    }

    #[test]
    fn test_in_requires_array() {
        assert!(ConditionValue::for_operator(Operator::In, Value::from("A")).is_err());
        assert!(ConditionValue::for_operator(Operator::Gt, Value::Array(vec![])).is_err());
    }

    #[test]
    fn test_mismatched_condition_shape_fails_validation() {
        let condition = Condition {
            feature: "x".to_string(),
            operator: Operator::Between,
            value: ConditionValue::Scalar(Value::Number(1.0)),
            connective: Connective::And,
        };
        let rule = Rule::new("R1", 1, Decision::new("deny", 1.0)).when(condition);
        let err = rule.validate().unwrap_err();
        assert_eq!(
            err,
            CoreError::Validation {
                rule_id: "R1".to_string(),
                condition: Some(0),
                message: "between requires a 2-element [low, high] array, got 1".to_string(),
            }
        );
    }

    #[test]
    fn test_deserialized_between_set_normalizes_to_range() {
        let json = r#"{
            "id": "R1",
            "name": "band",
            "priority": 1,
            "conditions": [{"feature": "x", "operator": "between", "value": [1, 10]}],
            "decision": {"outcome": "hit", "confidence": 0.8},
            "stop_on_match": true
        }"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert!(!matches!(rule.conditions[0].value, ConditionValue::Range { .. }));
        assert!(rule.validate().is_err());

        let rule = rule.normalize().unwrap();
        assert_eq!(
            rule.conditions[0].value,
            ConditionValue::Range {
                low: Value::Number(1.0),
                high: Value::Number(10.0),
            }
        );
    }

    #[test]
    fn test_rule_without_conditions_is_invalid() {
        let rule = Rule::new("R2", 1, Decision::new("deny", 1.0));
        assert!(rule.validate().is_err());
    }

    #[test]
    fn test_confidence_out_of_range() {
        let rule = Rule::new("R3", 1, Decision::new("deny", 1.5))
            .when(Condition::compare("x", Operator::Eq, 1.0));
        let err = rule.validate().unwrap_err();
        assert!(err.to_string().contains("confidence"));
    }

    #[test]
    fn test_connective_fold() {
        assert!(!Connective::And.apply(true, false));
        assert!(Connective::Or.apply(false, true));
        assert_eq!(Connective::parse("or"), Some(Connective::Or));
        assert_eq!(Connective::parse("xor"), None);
    }
}
