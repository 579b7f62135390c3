//! Condition operator execution

use crate::error::{Result, RuntimeError};
use faultline_core::{ConditionValue, Operator, Value};
use std::cmp::Ordering;

/// Where a comparison happens, for error reporting
pub(crate) struct Site<'a> {
    pub rule_id: &'a str,
    pub condition: usize,
    pub feature: &'a str,
}

impl Site<'_> {
    fn mismatch(&self, message: String) -> RuntimeError {
        RuntimeError::TypeMismatch {
            rule_id: self.rule_id.to_string(),
            condition: self.condition,
            feature: self.feature.to_string(),
            message,
        }
    }
}

/// Evaluate one operator against a present, non-null value
pub(crate) fn execute_condition(
    site: &Site<'_>,
    actual: &Value,
    op: Operator,
    expected: &ConditionValue,
) -> Result<bool> {
    if let Value::Number(n) = actual {
        if !n.is_finite() {
            return Err(RuntimeError::NonFiniteValue {
                feature: site.feature.to_string(),
                value: *n,
            });
        }
    }

    match (op, expected) {
        (Operator::Eq, ConditionValue::Scalar(v)) => Ok(actual.loose_eq(v)),
        (Operator::Ne, ConditionValue::Scalar(v)) => Ok(!actual.loose_eq(v)),
        (Operator::Gt, ConditionValue::Scalar(v)) => Ok(order(site, actual, op, v)?.is_gt()),
        (Operator::Lt, ConditionValue::Scalar(v)) => Ok(order(site, actual, op, v)?.is_lt()),
        (Operator::Ge, ConditionValue::Scalar(v)) => Ok(order(site, actual, op, v)?.is_ge()),
        (Operator::Le, ConditionValue::Scalar(v)) => Ok(order(site, actual, op, v)?.is_le()),
        (Operator::In, ConditionValue::Set(items)) => Ok(items.iter().any(|v| actual.loose_eq(v))),
        (Operator::NotIn, ConditionValue::Set(items)) => {
            Ok(!items.iter().any(|v| actual.loose_eq(v)))
        }
        (Operator::Between, ConditionValue::Range { low, high }) => {
            let above = order(site, actual, op, low)?.is_ge();
            let below = order(site, actual, op, high)?.is_le();
            Ok(above && below)
        }
        (op, operand) => Err(RuntimeError::InvalidOperation(format!(
            "operand {} does not fit operator {} in rule '{}'",
            operand, op, site.rule_id
        ))),
    }
}

fn order(site: &Site<'_>, actual: &Value, op: Operator, expected: &Value) -> Result<Ordering> {
    actual.loose_cmp(expected).ok_or_else(|| {
        site.mismatch(format!(
            "cannot apply '{}' to {} {} and {} {}",
            op,
            actual.type_name(),
            actual,
            expected.type_name(),
            expected
        ))
    })
}
