//! CheckoutSession - state for one payment page lifetime.
//!
//! # Invariants
//!
//! - `terminal` goes false → true at most once; after that every outcome
//!   handler is a no-op.
//! - `payment_token` is cleared after every submission attempt, so a stale
//!   token is never replayed.
//! - Fields supplied by a deep link (amount, currency, order reference,
//!   customer id) are locked and cannot be edited.
//!
//! Mutation is crate-private: only the orchestrator drives a session.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::foundation::{CheckoutSessionId, StateMachine, Timestamp, ValidationError};

use super::payer::{Payer, PayerField};
use super::redirect::RedirectDetails;
use super::state::CheckoutState;

/// How the payer is paying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    #[default]
    Card,
    Wallet,
}

/// Values supplied when the page loads, usually from a deep link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialValues {
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub order_reference: Option<String>,
    pub customer_id: Option<String>,
    #[serde(default)]
    pub payer: Payer,
}

/// Fields made read-only by the deep link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLocks {
    pub amount: bool,
    pub currency: bool,
    pub order_reference: bool,
    pub customer_id: bool,
}

/// A partial edit of the form. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionUpdate {
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub order_reference: Option<String>,
    pub customer_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub mode: Option<PaymentMode>,
    /// Hidden honeypot input. Humans never fill it.
    pub honeypot: Option<String>,
}

impl SessionUpdate {
    /// Payer fields this update writes to.
    pub fn touched_payer_fields(&self) -> BTreeSet<PayerField> {
        [
            (PayerField::Name, &self.name),
            (PayerField::Email, &self.email),
            (PayerField::Address1, &self.address1),
            (PayerField::City, &self.city),
            (PayerField::Postcode, &self.postcode),
            (PayerField::Country, &self.country),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_some())
        .map(|(f, _)| f)
        .collect()
    }
}

/// One checkout, from page load until it navigates away.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    id: CheckoutSessionId,
    amount: String,
    currency: String,
    order_reference: Option<String>,
    customer_id: Option<String>,
    payer: Payer,
    mode: PaymentMode,
    payment_token: Option<String>,
    token_complete: bool,
    last_wallet_token: Option<String>,
    processing: bool,
    terminal: bool,
    honeypot: String,
    payload_valid: bool,
    locks: FieldLocks,
    state: CheckoutState,
    message: Option<String>,
    missing_fields: BTreeSet<PayerField>,
    redirect_url: Option<Url>,
    created_at: Timestamp,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CheckoutSession {
    /// Creates a session. Any initial value present locks its field.
    pub fn new(initial: InitialValues, mode: PaymentMode) -> Self {
        let amount = non_empty(initial.amount);
        let currency = non_empty(initial.currency);
        let order_reference = non_empty(initial.order_reference);
        let customer_id = non_empty(initial.customer_id);

        let locks = FieldLocks {
            amount: amount.is_some(),
            currency: currency.is_some(),
            order_reference: order_reference.is_some(),
            customer_id: customer_id.is_some(),
        };

        Self {
            id: CheckoutSessionId::new(),
            amount: amount.unwrap_or_default(),
            currency: currency.unwrap_or_default(),
            order_reference,
            customer_id,
            payer: initial.payer,
            mode,
            payment_token: None,
            token_complete: false,
            last_wallet_token: None,
            processing: false,
            terminal: false,
            honeypot: String::new(),
            payload_valid: true,
            locks,
            state: CheckoutState::Idle,
            message: None,
            missing_fields: BTreeSet::new(),
            redirect_url: None,
            created_at: Timestamp::now(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════════════

    pub fn id(&self) -> CheckoutSessionId {
        self.id
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn order_reference(&self) -> Option<&str> {
        self.order_reference.as_deref()
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn payer(&self) -> &Payer {
        &self.payer
    }

    pub fn mode(&self) -> PaymentMode {
        self.mode
    }

    pub fn payment_token(&self) -> Option<&str> {
        self.payment_token.as_deref()
    }

    pub fn token_complete(&self) -> bool {
        self.token_complete
    }

    pub fn last_wallet_token(&self) -> Option<&str> {
        self.last_wallet_token.as_deref()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn honeypot(&self) -> &str {
        &self.honeypot
    }

    pub fn is_payload_valid(&self) -> bool {
        self.payload_valid
    }

    pub fn locks(&self) -> FieldLocks {
        self.locks
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Last user-facing status line.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Fields the payer was asked to complete after a wallet decline.
    pub fn missing_fields(&self) -> &BTreeSet<PayerField> {
        &self.missing_fields
    }

    pub fn redirect_url(&self) -> Option<&Url> {
        self.redirect_url.as_ref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Whether the manual card "pay" action should be enabled.
    pub fn can_pay(&self) -> bool {
        self.mode == PaymentMode::Card
            && self.state.accepts_input()
            && !self.processing
            && !self.terminal
            && self.payload_valid
            && self.has_usable_token()
    }

    /// A complete, non-empty token is held.
    pub fn has_usable_token(&self) -> bool {
        self.token_complete && self.payment_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn redirect_details(&self) -> RedirectDetails {
        RedirectDetails {
            order_reference: self.order_reference.clone(),
            amount: self.amount.clone(),
            currency: self.currency.clone(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Mutation (orchestrator only)
    // ════════════════════════════════════════════════════════════════════════════

    /// Fills an empty currency and country without locking them.
    pub(crate) fn fill_defaults(&mut self, currency: &str, country: &str) {
        if self.currency.is_empty() {
            self.currency = currency.to_string();
        }
        if self.payer.country.trim().is_empty() {
            self.payer.country = country.to_string();
        }
    }

    /// Moves to `target` if the state machine allows it.
    pub(crate) fn transition(&mut self, target: CheckoutState) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(target)?;
        Ok(())
    }

    /// Flips `terminal`. Returns `true` only for the call that flipped it.
    pub(crate) fn mark_terminal(&mut self) -> bool {
        if self.terminal {
            return false;
        }
        self.terminal = true;
        true
    }

    pub(crate) fn set_redirect_url(&mut self, url: Url) {
        if self.redirect_url.is_none() {
            self.redirect_url = Some(url);
        }
    }

    /// Claims the single in-flight submission slot.
    pub(crate) fn begin_processing(&mut self) -> bool {
        if self.processing || self.terminal {
            return false;
        }
        self.processing = true;
        true
    }

    pub(crate) fn end_processing(&mut self) {
        self.processing = false;
    }

    pub(crate) fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub(crate) fn clear_message(&mut self) {
        self.message = None;
    }

    pub(crate) fn mark_payload_invalid(&mut self) {
        self.payload_valid = false;
    }

    /// Records the widget's latest report.
    pub(crate) fn record_token(&mut self, complete: bool, token: Option<String>) {
        self.token_complete = complete;
        if complete {
            if let Some(token) = non_empty(token) {
                self.payment_token = Some(token);
            }
        }
    }

    pub(crate) fn remember_wallet_token(&mut self, token: &str) {
        self.last_wallet_token = Some(token.to_string());
    }

    /// Drops the token after a submission attempt.
    pub(crate) fn clear_token(&mut self) {
        self.payment_token = None;
        self.token_complete = false;
    }

    pub(crate) fn set_missing_fields(&mut self, fields: BTreeSet<PayerField>) {
        self.missing_fields = fields;
    }

    /// Resets card inputs so a blocked redirect leaves a clean form.
    pub(crate) fn clear_card_inputs(&mut self) {
        self.payer.address1.clear();
        self.payer.address2.clear();
        self.payer.city.clear();
        self.honeypot.clear();
        self.clear_token();
    }

    /// Applies a form edit, rejecting the whole edit if it touches a locked field.
    pub(crate) fn apply_update(&mut self, update: SessionUpdate) -> Result<(), ValidationError> {
        if update.amount.is_some() && self.locks.amount {
            return Err(ValidationError::locked("amount"));
        }
        if update.currency.is_some() && self.locks.currency {
            return Err(ValidationError::locked("currency"));
        }
        if update.order_reference.is_some() && self.locks.order_reference {
            return Err(ValidationError::locked("order_reference"));
        }
        if update.customer_id.is_some() && self.locks.customer_id {
            return Err(ValidationError::locked("customer_id"));
        }

        let touched = update.touched_payer_fields();
        self.missing_fields.retain(|f| !touched.contains(f));

        if let Some(v) = update.amount {
            self.amount = v;
        }
        if let Some(v) = update.currency {
            self.currency = v;
        }
        if let Some(v) = update.order_reference {
            self.order_reference = non_empty(Some(v));
        }
        if let Some(v) = update.customer_id {
            self.customer_id = non_empty(Some(v));
        }
        if let Some(v) = update.name {
            self.payer.name = v;
        }
        if let Some(v) = update.email {
            self.payer.email = v;
        }
        if let Some(v) = update.address1 {
            self.payer.address1 = v;
        }
        if let Some(v) = update.address2 {
            self.payer.address2 = v;
        }
        if let Some(v) = update.city {
            self.payer.city = v;
        }
        if let Some(v) = update.postcode {
            self.payer.postcode = v;
        }
        if let Some(v) = update.country {
            self.payer.country = v;
        }
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(v) = update.honeypot {
            self.honeypot = v;
        }
        Ok(())
    }
}
