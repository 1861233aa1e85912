//! Payment gateway port.
//!
//! The gateway charges a tokenized card or wallet payment once. A decline is
//! a successful call whose [`PaymentOutcome`] is unapproved; only transport
//! and configuration problems are errors.
//!
//! # Design
//!
//! - **Single attempt**: callers never retry a submission on their own
//! - **No card data**: only the opaque token crosses this boundary

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::checkout::{CheckoutSession, CustomerSnapshot, PaymentOutcome, ThreeDsEvidence};

/// Port for the card/wallet gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submits one charge.
    ///
    /// Returns `Ok` for both approvals and declines.
    async fn submit(&self, request: &ChargeRequest) -> Result<PaymentOutcome, GatewayError>;
}

/// Charge submission.
///
/// Also the JSON body of the stateless process-payment endpoint, so the
/// field names follow the checkout page's wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequest {
    #[serde(default)]
    pub payment_token: String,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,

    #[serde(default)]
    pub currency: String,

    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,

    #[serde(rename = "customer_id", default)]
    pub customer_id: Option<String>,

    #[serde(rename = "order_reference", default)]
    pub order_reference: Option<String>,

    #[serde(flatten)]
    pub three_ds: ThreeDsEvidence,

    /// Honeypot value; any content marks the request as automated.
    #[serde(rename = "session_hash", default)]
    pub session_hash: Option<String>,
}

impl ChargeRequest {
    /// Snapshot of a session ready for submission.
    pub fn from_session(session: &CheckoutSession, three_ds: ThreeDsEvidence) -> Self {
        let payer = session.payer();
        let (first_name, last_name) = payer.split_name();
        let honeypot = session.honeypot();

        Self {
            payment_token: session.payment_token().unwrap_or_default().to_string(),
            amount: crate::domain::checkout::parse_amount(session.amount()),
            currency: session.currency().to_string(),
            first_name,
            last_name,
            email: payer.email.clone(),
            address1: payer.address1.clone(),
            address2: payer.address2.clone(),
            city: payer.city.clone(),
            postcode: payer.postcode.clone(),
            country: payer.country.clone(),
            customer_id: session.customer_id().map(str::to_string),
            order_reference: session.order_reference().map(str::to_string),
            three_ds,
            session_hash: (!honeypot.is_empty()).then(|| honeypot.to_string()),
        }
    }

    /// Order reference with empty strings treated as absent.
    pub fn order_reference(&self) -> Option<&str> {
        self.order_reference.as_deref().filter(|r| !r.is_empty())
    }

    pub fn is_honeypot_filled(&self) -> bool {
        self.session_hash
            .as_deref()
            .is_some_and(|h| !h.trim().is_empty())
    }

    /// Payer details as sent to webhook subscribers.
    pub fn customer(&self) -> CustomerSnapshot {
        CustomerSnapshot {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            address1: self.address1.clone(),
            address2: self.address2.clone(),
            city: self.city.clone(),
            postcode: self.postcode.clone(),
            country: self.country.clone(),
        }
    }
}

/// Gateway failures. Declines are not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Credential missing; nothing was sent.
    #[error("Payment gateway not configured: {0}")]
    NotConfigured(String),

    /// Network failure, timeout or non-2xx status.
    #[error("Payment gateway request failed: {0}")]
    Transport(String),

    /// The gateway answered with something unreadable.
    #[error("Invalid payment gateway response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    pub fn transport(message: impl Into<String>) -> Self {
        GatewayError::Transport(message.into())
    }

    /// Whether the charge may have reached the gateway.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GatewayError::Transport(_) | GatewayError::InvalidResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkout::{InitialValues, Payer, PaymentMode, SessionUpdate};
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn deserializes_checkout_page_body() {
        let body = json!({
            "paymentToken": "tok_1",
            "amount": 10.5,
            "currency": "GBP",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "postcode": "N1",
            "order_reference": "ORD-1",
            "cardHolderAuth": "AAAB",
            "eci": "05",
            "session_hash": ""
        });

        let request: ChargeRequest = serde_json::from_value(body).unwrap();

        assert_eq!(request.payment_token, "tok_1");
        assert_eq!(request.amount, Some(Decimal::from_str("10.5").unwrap()));
        assert_eq!(request.order_reference(), Some("ORD-1"));
        assert_eq!(request.three_ds.card_holder_auth.as_deref(), Some("AAAB"));
        assert_eq!(request.three_ds.eci.as_deref(), Some("05"));
        assert!(!request.is_honeypot_filled());
    }

    #[test]
    fn missing_amount_deserializes_as_none() {
        let request: ChargeRequest =
            serde_json::from_value(json!({ "paymentToken": "tok" })).unwrap();
        assert_eq!(request.amount, None);
    }

    #[test]
    fn builds_from_session() {
        let mut session = CheckoutSession::new(
            InitialValues {
                amount: Some("12.00".to_string()),
                currency: Some("GBP".to_string()),
                order_reference: Some("ORD-2".to_string()),
                customer_id: Some("cus_9".to_string()),
                payer: Payer {
                    name: "Grace Hopper".to_string(),
                    ..Default::default()
                },
            },
            PaymentMode::Card,
        );
        session.record_token(true, Some("tok_abc".to_string()));
        session
            .apply_update(SessionUpdate {
                honeypot: Some("bot".to_string()),
                ..Default::default()
            })
            .unwrap();

        let request = ChargeRequest::from_session(
            &session,
            ThreeDsEvidence {
                cavv: Some("cavv".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(request.payment_token, "tok_abc");
        assert_eq!(request.amount, Some(Decimal::from_str("12.00").unwrap()));
        assert_eq!(request.first_name, "Grace");
        assert_eq!(request.last_name, "Hopper");
        assert_eq!(request.customer_id.as_deref(), Some("cus_9"));
        assert_eq!(request.three_ds.cavv.as_deref(), Some("cavv"));
        assert!(request.is_honeypot_filled());
    }

    #[test]
    fn transport_classification() {
        assert!(GatewayError::transport("timeout").is_transport());
        assert!(GatewayError::InvalidResponse("empty".to_string()).is_transport());
        assert!(!GatewayError::NotConfigured("key".to_string()).is_transport());
    }
}
