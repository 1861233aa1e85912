//! 3-D Secure challenge port.
//!
//! The challenge widget is a black box with two observable results:
//! completion with evidence, or failure. Starting it is the only call the
//! orchestrator makes; results arrive later as separate events.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::checkout::{format_amount, parse_amount, CheckoutSession};

/// Port for launching a cardholder authentication challenge.
#[async_trait]
pub trait ThreeDsChallenge: Send + Sync {
    /// Whether the widget has loaded and can run a challenge.
    fn is_ready(&self) -> bool;

    /// Starts a challenge for the tokenized payment.
    async fn start(&self, request: &ChallengeRequest) -> Result<(), ChallengeError>;
}

/// Payment information handed to the challenge widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    pub payment_token: String,
    pub amount: String,
    pub currency: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address1: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl ChallengeRequest {
    pub fn from_session(session: &CheckoutSession) -> Self {
        let payer = session.payer();
        let (first_name, last_name) = payer.split_name();
        Self {
            payment_token: session.payment_token().unwrap_or_default().to_string(),
            amount: parse_amount(session.amount())
                .map(format_amount)
                .unwrap_or_default(),
            currency: session.currency().to_string(),
            first_name,
            last_name,
            email: payer.email.clone(),
            address1: payer.address1.clone(),
            city: payer.city.clone(),
            postal_code: payer.postcode.clone(),
            country: payer.country.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    #[error("3-D Secure not ready.")]
    NotReady,

    #[error("3-D Secure challenge could not start: {0}")]
    Failed(String),
}
