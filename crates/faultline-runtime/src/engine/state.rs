//! Rule-chain state machine
//!
//! Evaluation of a rule set walks the rules in priority order through four
//! states. `FiredStopping` and `Exhausted` are terminal; the most recently
//! fired rule at termination decides.

use serde::{Deserialize, Serialize};

/// State of one rule-set evaluation. Indices refer to rule positions in
/// evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalState {
    /// No rule has fired yet
    Evaluating,
    /// A non-stopping rule fired most recently; evaluation continues
    FiredNonStopping(usize),
    /// A stopping rule fired; its decision is final
    FiredStopping(usize),
    /// Every rule was evaluated; holds the last fired rule, if any
    Exhausted(Option<usize>),
}

impl EvalState {
    /// Advance past the rule at `index`
    pub fn on_rule(self, index: usize, fired: bool, stop_on_match: bool) -> EvalState {
        match self {
            EvalState::FiredStopping(_) | EvalState::Exhausted(_) => self,
            EvalState::Evaluating | EvalState::FiredNonStopping(_) => match (fired, stop_on_match) {
                (true, true) => EvalState::FiredStopping(index),
                (true, false) => EvalState::FiredNonStopping(index),
                (false, _) => self,
            },
        }
    }

    /// Transition taken when the rule list runs out
    pub fn finish(self) -> EvalState {
        match self {
            EvalState::Evaluating => EvalState::Exhausted(None),
            EvalState::FiredNonStopping(index) => EvalState::Exhausted(Some(index)),
            terminal => terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EvalState::FiredStopping(_) | EvalState::Exhausted(_))
    }

    /// Position of the rule whose decision currently stands
    pub fn decided_by(&self) -> Option<usize> {
        match self {
            EvalState::Evaluating => None,
            EvalState::FiredNonStopping(index) | EvalState::FiredStopping(index) => Some(*index),
            EvalState::Exhausted(last) => *last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopping_rule_is_terminal() {
        let state = EvalState::Evaluating
            .on_rule(0, true, false)
            .on_rule(1, true, true)
            .on_rule(2, true, false);
        assert_eq!(state, EvalState::FiredStopping(1));
        assert!(state.is_terminal());
        assert_eq!(state.finish(), EvalState::FiredStopping(1));
    }

    #[test]
    fn test_last_non_stopping_rule_wins() {
        let state = EvalState::Evaluating
            .on_rule(0, true, false)
            .on_rule(1, false, true)
            .on_rule(2, true, false)
            .finish();
        assert_eq!(state, EvalState::Exhausted(Some(2)));
        assert_eq!(state.decided_by(), Some(2));
    }

    #[test]
    fn test_nothing_fired() {
        let state = EvalState::Evaluating.on_rule(0, false, true).finish();
        assert_eq!(state, EvalState::Exhausted(None));
        assert_eq!(state.decided_by(), None);
    }
}
