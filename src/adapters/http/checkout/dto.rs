//! Request and response bodies for the checkout session endpoints.

use serde::{Deserialize, Serialize};

use crate::application::CheckoutStep;
use crate::domain::checkout::{
    CheckoutSession, CheckoutState, FieldLocks, Payer, PayerField, PaymentMode, PaymentOutcome,
    SessionUpdate,
};
use crate::ports::ChallengeRequest;

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

/// Form edit. Omitted fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub amount: Option<String>,
    pub currency: Option<String>,
    #[serde(alias = "order_reference")]
    pub order_reference: Option<String>,
    #[serde(alias = "customer_id")]
    pub customer_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub mode: Option<PaymentMode>,
    /// Hidden honeypot input.
    #[serde(rename = "session_hash")]
    pub honeypot: Option<String>,
}

impl From<UpdateSessionRequest> for SessionUpdate {
    fn from(req: UpdateSessionRequest) -> Self {
        SessionUpdate {
            amount: req.amount,
            currency: req.currency,
            order_reference: req.order_reference,
            customer_id: req.customer_id,
            name: req.name,
            email: req.email,
            address1: req.address1,
            address2: req.address2,
            city: req.city,
            postcode: req.postcode,
            country: req.country,
            mode: req.mode,
            honeypot: req.honeypot,
        }
    }
}

/// Tokenization widget change event.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEventRequest {
    #[serde(default)]
    pub complete: bool,
    pub token: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════

/// What the page renders. Never carries the payment token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub state: CheckoutState,
    pub mode: PaymentMode,
    pub amount: String,
    pub currency: String,
    pub order_reference: Option<String>,
    pub customer_id: Option<String>,
    pub payer: Payer,
    pub locks: FieldLocks,
    pub token_complete: bool,
    pub can_pay: bool,
    pub message: Option<String>,
    pub missing_fields: Vec<PayerField>,
    pub redirect_url: Option<String>,
    pub created_at: String,
}

impl From<&CheckoutSession> for SessionView {
    fn from(session: &CheckoutSession) -> Self {
        Self {
            id: session.id().to_string(),
            state: session.state(),
            mode: session.mode(),
            amount: session.amount().to_string(),
            currency: session.currency().to_string(),
            order_reference: session.order_reference().map(str::to_string),
            customer_id: session.customer_id().map(str::to_string),
            payer: session.payer().clone(),
            locks: session.locks(),
            token_complete: session.token_complete(),
            can_pay: session.can_pay(),
            message: session.message().map(str::to_string),
            missing_fields: session.missing_fields().iter().copied().collect(),
            redirect_url: session.redirect_url().map(|u| u.to_string()),
            created_at: session.created_at().to_rfc3339(),
        }
    }
}

/// Result of a widget or challenge event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    /// `waiting`, `ignored`, `finished` or `retry_required`.
    pub step: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub outcome: Option<PaymentOutcome>,
    pub session: SessionView,
}

impl StepResponse {
    pub fn new(step: CheckoutStep, session: &CheckoutSession) -> Self {
        let (name, outcome) = match step {
            CheckoutStep::Waiting => ("waiting", None),
            CheckoutStep::Ignored => ("ignored", None),
            CheckoutStep::Finished(outcome) => ("finished", Some(outcome)),
            CheckoutStep::RetryRequired(_) => ("retry_required", None),
        };
        Self {
            step: name.to_string(),
            outcome,
            session: session.into(),
        }
    }
}

/// Payment information handed to the 3DS widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayResponse {
    pub challenge: ChallengeRequest,
    pub session: SessionView,
}
