//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, state machine, errors)
//! - `signing` - HMAC-SHA256 signing of deep links and webhook bodies
//! - `checkout` - Checkout session, validation, outcomes and redirects

pub mod checkout;
pub mod foundation;
pub mod signing;
