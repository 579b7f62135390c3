//! Evaluation result types

use super::trace::AuditTrail;
use faultline_core::Decision;
use serde::{Deserialize, Serialize};

/// Result of evaluating one record against a rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// The final decision
    pub decision: Decision,

    /// Full audit trail
    pub trail: AuditTrail,

    /// Rule whose decision is final; `None` when the default applied
    pub decided_by: Option<String>,
}

impl Evaluation {
    pub fn outcome(&self) -> &str {
        &self.decision.outcome
    }

    pub fn confidence(&self) -> f64 {
        self.decision.confidence
    }

    /// True when the default decision was used
    pub fn is_default(&self) -> bool {
        self.decided_by.is_none()
    }
}
