//! Rule engine
//!
//! Evaluates a validated [`RuleSet`] against one record. Evaluation is a pure
//! function of (rule set, record): there is no hidden state and no
//! short-circuiting, so identical inputs always produce identical trails.

use super::operators::{execute_condition, Site};
use super::record::Record;
use super::state::EvalState;
use crate::error::Result;
use crate::result::{AuditTrail, ConditionTrace, Evaluation, RuleTrace};
use faultline_core::{Rule, RuleSet, Value};
use std::sync::Arc;

/// Evaluator bound to one immutable rule set
#[derive(Debug, Clone)]
pub struct RuleEngine {
    ruleset: Arc<RuleSet>,
}

impl RuleEngine {
    pub fn new(ruleset: impl Into<Arc<RuleSet>>) -> Self {
        Self {
            ruleset: ruleset.into(),
        }
    }

    pub fn ruleset(&self) -> &Arc<RuleSet> {
        &self.ruleset
    }

    /// Evaluate one record
    pub fn evaluate<R: Record + ?Sized>(&self, record: &R) -> Result<Evaluation> {
        evaluate(&self.ruleset, record)
    }

    /// Evaluate many records independently, in order
    pub fn batch_evaluate<'a, R, I>(&self, records: I) -> Vec<Result<Evaluation>>
    where
        R: Record + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        records.into_iter().map(|r| self.evaluate(r)).collect()
    }
}

/// Evaluate `record` against `ruleset`
pub fn evaluate<R: Record + ?Sized>(ruleset: &RuleSet, record: &R) -> Result<Evaluation> {
    let mut trail = AuditTrail::new();
    let mut state = EvalState::Evaluating;

    for (index, rule) in ruleset.rules().iter().enumerate() {
        let trace = evaluate_rule(rule, record)?;
        let matched = trace.matched;
        trail.push(trace);

        state = state.on_rule(index, matched, rule.stop_on_match);
        if state.is_terminal() {
            break;
        }
    }
    let state = state.finish();
    trail.stopped_early = matches!(state, EvalState::FiredStopping(_));

    let evaluation = match state.decided_by().and_then(|i| ruleset.rules().get(i)) {
        Some(rule) => Evaluation {
            decision: rule.decision.clone(),
            trail,
            decided_by: Some(rule.id.clone()),
        },
        None => {
            trail.no_match = true;
            Evaluation {
                decision: ruleset.default_decision().clone(),
                trail,
                decided_by: None,
            }
        }
    };

    tracing::debug!(
        "Rule set '{}' decided '{}' via {}",
        ruleset.name(),
        evaluation.outcome(),
        evaluation.decided_by.as_deref().unwrap_or("default")
    );

    Ok(evaluation)
}

/// Evaluate every condition of `rule` and fold the chain left to right
fn evaluate_rule<R: Record + ?Sized>(rule: &Rule, record: &R) -> Result<RuleTrace> {
    let mut trace = RuleTrace::new(&rule.id, &rule.name, rule.priority);
    let mut chain: Option<bool> = None;

    for (index, condition) in rule.conditions.iter().enumerate() {
        let actual = record
            .feature(&condition.feature)
            .filter(|v| !matches!(v, Value::Null));

        let result = match actual {
            Some(value) => {
                let site = Site {
                    rule_id: &rule.id,
                    condition: index,
                    feature: &condition.feature,
                };
                execute_condition(&site, value, condition.operator, &condition.value)?
            }
            None => false,
        };

        chain = Some(match chain {
            None => result,
            Some(acc) => rule.conditions[index - 1].connective.apply(acc, result),
        });
        trace = trace.add_condition(ConditionTrace::new(index, condition, actual.cloned(), result));
    }

    Ok(trace.with_matched(chain.unwrap_or(false), rule.stop_on_match))
}
