//! Checkout domain - one payment page, from deep link to redirect.
//!
//! # Module Organization
//!
//! - `amount` - Amount and currency validation
//! - `payer` - Payer details and the fields a decline can point at
//! - `session` - The `CheckoutSession` entity and its guard flags
//! - `state` - Orchestrator states and allowed transitions
//! - `deep_link` - Signed query parameters that pre-fill a session
//! - `policy` - Pre-submission checks
//! - `outcome` - Gateway outcomes and 3-D Secure evidence
//! - `missing_fields` - Decline-reason heuristics for wallet retries
//! - `redirect` - Terminal redirect targets and the navigate-once rule
//! - `events` - Outbound webhook payloads
//! - `errors` - Checkout error taxonomy

mod amount;
mod deep_link;
mod errors;
mod events;
mod missing_fields;
mod outcome;
mod payer;
mod policy;
mod redirect;
mod session;
mod state;

pub use amount::{
    format_amount, is_valid_amount, normalize_amount, parse_amount, AmountCurrencyValidator,
    ZERO_AMOUNT,
};
pub use deep_link::DeepLink;
pub use errors::{CheckoutError, BLOCKED_MESSAGE, INVALID_LINK_MESSAGE};
pub use events::{
    CustomerSnapshot, WebhookEvent, WebhookEventData, WebhookEventParams, WebhookEventType,
};
pub use missing_fields::MissingFieldDetector;
pub use outcome::{
    truncate_reason, PaymentOutcome, ThreeDsEvidence, CHALLENGE_CANCELLED_REASON, MAX_REASON_LEN,
    SERVER_ERROR_REASON,
};
pub use payer::{Payer, PayerField};
pub use policy::{
    CheckoutPolicy, CARD_DETAILS_MESSAGE, INVALID_AMOUNT_MESSAGE, ORDER_REFERENCE_MESSAGE,
    UNSUPPORTED_CURRENCY_MESSAGE, WALLET_TOKEN_MESSAGE,
};
pub use redirect::{
    RedirectDetails, RedirectEnvironment, RedirectError, RedirectResolver, RedirectTargets,
};
pub use session::{CheckoutSession, FieldLocks, InitialValues, PaymentMode, SessionUpdate};
pub use state::CheckoutState;
