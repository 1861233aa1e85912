//! Checkout error taxonomy.
//!
//! Validation problems are recovered locally and never reach the network.
//! Declines are not errors at all; they travel as a [`PaymentOutcome`].
//!
//! [`PaymentOutcome`]: super::PaymentOutcome

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Generic message shown when the honeypot trips. Deliberately uninformative.
pub const BLOCKED_MESSAGE: &str = "Payment blocked.";

/// Shown when a signed deep link failed verification.
pub const INVALID_LINK_MESSAGE: &str = "invalid payment link";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Input rejected before any network call.
    #[error("{0}")]
    Validation(String),

    #[error("Field '{0}' is locked by the payment link")]
    Locked(String),

    /// Honeypot filled.
    #[error("{}", BLOCKED_MESSAGE)]
    Blocked,

    #[error("{}", INVALID_LINK_MESSAGE)]
    InvalidPaymentLink,

    /// 3-D Secure cancelled or failed.
    #[error("3-D Secure challenge failed: {0}")]
    ChallengeFailure(String),

    /// Gateway unreachable or replied with garbage.
    #[error("Payment gateway transport error: {0}")]
    Transport(String),

    /// Missing credential or redirect target.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A submission is already in flight for this session.
    #[error("A payment is already being processed")]
    Busy,

    /// The session already finished.
    #[error("This checkout has already completed")]
    Finished,

    #[error("Action not allowed in state {state}")]
    InvalidState { state: String },
}

impl CheckoutError {
    pub fn validation(message: impl Into<String>) -> Self {
        CheckoutError::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CheckoutError::Configuration(message.into())
    }

    /// Machine-readable category.
    pub fn code(&self) -> ErrorCode {
        match self {
            CheckoutError::Validation(_)
            | CheckoutError::Locked(_)
            | CheckoutError::Blocked
            | CheckoutError::InvalidPaymentLink => ErrorCode::ValidationFailed,
            CheckoutError::ChallengeFailure(_) | CheckoutError::Transport(_) => {
                ErrorCode::ExternalServiceError
            }
            CheckoutError::Configuration(_) => ErrorCode::ConfigurationError,
            CheckoutError::Busy | CheckoutError::Finished => ErrorCode::Conflict,
            CheckoutError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
        }
    }

    /// Text safe to show the payer.
    ///
    /// Transport and configuration details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Transport(_) => {
                "We could not reach the payment processor. The payment was not completed."
                    .to_string()
            }
            CheckoutError::Configuration(_) => {
                "Payments are temporarily unavailable. Please contact the merchant.".to_string()
            }
            CheckoutError::ChallengeFailure(_) => {
                "Card authentication was not completed.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Locked { field } => CheckoutError::Locked(field),
            other => CheckoutError::Validation(other.to_string()),
        }
    }
}

/// Carries the payer-safe message, never the internal detail.
impl From<&CheckoutError> for DomainError {
    fn from(err: &CheckoutError) -> Self {
        DomainError::new(err.code(), err.user_message())
    }
}
