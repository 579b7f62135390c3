//! Condition operators

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of condition operators.
///
/// Evaluation dispatches with an exhaustive `match`, so adding an operator is
/// a compile error everywhere it is not yet handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Equal (==)
    #[serde(rename = "==")]
    Eq,
    /// Not equal (!=)
    #[serde(rename = "!=")]
    Ne,
    /// Greater than (>)
    #[serde(rename = ">")]
    Gt,
    /// Less than (<)
    #[serde(rename = "<")]
    Lt,
    /// Greater than or equal (>=)
    #[serde(rename = ">=")]
    Ge,
    /// Less than or equal (<=)
    #[serde(rename = "<=")]
    Le,
    /// Member of a declared set
    #[serde(rename = "in")]
    In,
    /// Not a member of a declared set
    #[serde(rename = "not_in")]
    NotIn,
    /// Inclusive range `[low, high]`
    #[serde(rename = "between")]
    Between,
}

impl Operator {
    pub const ALL: [Operator; 9] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Lt,
        Operator::Ge,
        Operator::Le,
        Operator::In,
        Operator::NotIn,
        Operator::Between,
    ];

    /// Parse the textual form used in rule documents
    pub fn parse(s: &str) -> Option<Operator> {
        match s.trim() {
            "==" => Some(Operator::Eq),
            "!=" => Some(Operator::Ne),
            ">" => Some(Operator::Gt),
            "<" => Some(Operator::Lt),
            ">=" => Some(Operator::Ge),
            "<=" => Some(Operator::Le),
            "in" => Some(Operator::In),
            "not_in" => Some(Operator::NotIn),
            "between" => Some(Operator::Between),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Between => "between",
        }
    }

    /// Returns true if this operator orders its operands (and may therefore
    /// fail on incomparable types)
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Lt | Operator::Ge | Operator::Le | Operator::Between
        )
    }

    /// Returns true if this operator tests set membership
    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
