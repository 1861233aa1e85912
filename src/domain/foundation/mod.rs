//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the state machine trait and the
//! base error types used across the checkout domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::CheckoutSessionId;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
