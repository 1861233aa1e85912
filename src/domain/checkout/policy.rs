//! Deployment rules applied while validating a checkout.

use super::amount::AmountCurrencyValidator;
use super::errors::CheckoutError;
use super::payer::PayerField;
use super::session::{CheckoutSession, PaymentMode};

pub const INVALID_AMOUNT_MESSAGE: &str = "Enter a valid amount.";
pub const UNSUPPORTED_CURRENCY_MESSAGE: &str = "Currency not supported.";
pub const CARD_DETAILS_MESSAGE: &str = "Please complete card details first.";
pub const WALLET_TOKEN_MESSAGE: &str = "Wallet payment was not authorised.";
pub const ORDER_REFERENCE_MESSAGE: &str = "Order reference is required.";

/// Fields a card payment cannot be submitted without.
const CARD_REQUIRED_FIELDS: [PayerField; 3] =
    [PayerField::Name, PayerField::Email, PayerField::Postcode];

#[derive(Debug, Clone)]
pub struct CheckoutPolicy {
    pub validator: AmountCurrencyValidator,
    pub require_order_reference: bool,
    pub default_currency: String,
    pub default_country: String,
    pub wallets_enabled: bool,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            validator: AmountCurrencyValidator::default(),
            require_order_reference: false,
            default_currency: "GBP".to_string(),
            default_country: "GB".to_string(),
            wallets_enabled: true,
        }
    }
}

impl CheckoutPolicy {
    /// Runs every pre-submission check, first failure wins.
    ///
    /// Order: payload signature, honeypot, amount, currency, token,
    /// required card fields, order reference. Nothing here touches the
    /// network or mutates the session.
    pub fn check(&self, session: &CheckoutSession) -> Result<(), CheckoutError> {
        if !session.is_payload_valid() {
            return Err(CheckoutError::InvalidPaymentLink);
        }
        if !session.honeypot().trim().is_empty() {
            return Err(CheckoutError::Blocked);
        }
        if !self.validator.is_valid_amount(session.amount()) {
            return Err(CheckoutError::validation(INVALID_AMOUNT_MESSAGE));
        }
        if !self.validator.is_supported_currency(session.currency()) {
            return Err(CheckoutError::validation(UNSUPPORTED_CURRENCY_MESSAGE));
        }
        if !session.has_usable_token() {
            let message = match session.mode() {
                PaymentMode::Card => CARD_DETAILS_MESSAGE,
                PaymentMode::Wallet => WALLET_TOKEN_MESSAGE,
            };
            return Err(CheckoutError::validation(message));
        }
        if session.mode() == PaymentMode::Card {
            if let Some(field) = CARD_REQUIRED_FIELDS
                .iter()
                .find(|f| session.payer().is_blank(**f))
            {
                return Err(CheckoutError::validation(format!(
                    "Please enter your {}.",
                    field.label()
                )));
            }
        }
        if self.require_order_reference && session.order_reference().is_none() {
            return Err(CheckoutError::validation(ORDER_REFERENCE_MESSAGE));
        }
        Ok(())
    }
}
