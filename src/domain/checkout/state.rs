//! Checkout lifecycle states.
//!
//! ```text
//! Idle ──► AwaitingToken                                        (widget reported)
//! Idle / AwaitingToken ──► Validating ──► Idle                    (check failed)
//!                          Validating ──► AwaitingChallenge        (card)
//!                          Validating ──► Submitting               (wallet)
//! AwaitingChallenge ──► Submitting | Failed
//! Submitting ──► Succeeded | Failed | AwaitingRetry (wallet) | Idle (not configured)
//! AwaitingRetry ──► Idle
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where a checkout session is in the payment flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    /// Form is editable; nothing in flight.
    Idle,

    /// Pre-submission checks are running.
    Validating,

    /// The tokenization widget is engaged. Card payments wait here for the pay action.
    AwaitingToken,

    /// Card only: the 3DS challenge has been started.
    AwaitingChallenge,

    /// The gateway call is in flight.
    Submitting,

    /// Charge approved; redirect issued.
    Succeeded,

    /// Charge failed, declined, or the challenge was abandoned; redirect issued.
    Failed,

    /// Wallet only: declined for missing payer data, waiting for corrections.
    AwaitingRetry,
}

impl CheckoutState {
    /// States in which form edits and widget events are accepted.
    pub fn accepts_input(&self) -> bool {
        matches!(
            self,
            CheckoutState::Idle | CheckoutState::AwaitingToken | CheckoutState::AwaitingRetry
        )
    }
}

impl StateMachine for CheckoutState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CheckoutState::*;
        matches!(
            (self, target),
            (Idle, AwaitingToken)
                | (Idle, Validating)
                | (AwaitingToken, Idle)
                | (AwaitingToken, Validating)
                | (Validating, Idle)
                | (Validating, AwaitingChallenge)
                | (Validating, Submitting)
                | (AwaitingChallenge, Submitting)
                | (AwaitingChallenge, Failed)
                | (Submitting, Succeeded)
                | (Submitting, Failed)
                | (Submitting, AwaitingRetry)
                | (Submitting, Idle)
                | (AwaitingRetry, Idle)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CheckoutState::*;
        match self {
            Idle => vec![AwaitingToken, Validating],
            AwaitingToken => vec![Idle, Validating],
            Validating => vec![Idle, AwaitingChallenge, Submitting],
            AwaitingChallenge => vec![Submitting, Failed],
            Submitting => vec![Succeeded, Failed, AwaitingRetry, Idle],
            AwaitingRetry => vec![Idle],
            Succeeded | Failed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CheckoutState::*;

    const ALL: [CheckoutState; 8] = [
        Idle,
        Validating,
        AwaitingToken,
        AwaitingChallenge,
        Submitting,
        Succeeded,
        Failed,
        AwaitingRetry,
    ];

    #[test]
    fn only_outcomes_are_terminal() {
        for state in ALL {
            let expected = matches!(state, Succeeded | Failed);
            assert_eq!(state.is_terminal(), expected, "{:?}", state);
        }
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(&to),
                    from.valid_transitions().contains(&to),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn challenge_cannot_be_skipped_to_success() {
        assert!(AwaitingChallenge.transition_to(Succeeded).is_err());
    }

    #[test]
    fn retry_only_from_submission() {
        for from in ALL {
            assert_eq!(
                from.can_transition_to(&AwaitingRetry),
                from == Submitting,
                "{:?}",
                from
            );
        }
    }

    #[test]
    fn input_accepted_only_while_editable() {
        assert!(Idle.accepts_input());
        assert!(AwaitingToken.accepts_input());
        assert!(AwaitingRetry.accepts_input());
        assert!(!Submitting.accepts_input());
        assert!(!AwaitingChallenge.accepts_input());
        assert!(!Succeeded.accepts_input());
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AwaitingChallenge).unwrap(),
            "\"awaiting_challenge\""
        );
    }
}
