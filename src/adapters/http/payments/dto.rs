//! Bodies for the stateless payment endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::{ProcessPaymentError, ProcessPaymentResult};

pub const DEFAULT_DECLINE_MESSAGE: &str = "Gateway declined the payment";
pub const SERVER_ERROR_MESSAGE: &str = "Server error processing payment";

/// Response of `POST /api/process-payment`.
///
/// Keeps the `{success, error}` shape the checkout page already reads,
/// rather than the generic `ErrorResponse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub raw: Option<BTreeMap<String, String>>,
}

impl ProcessPaymentResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            transaction_id: None,
            error: Some(message.into()),
            redirect_url: None,
            raw: None,
        }
    }
}

impl From<&ProcessPaymentError> for ProcessPaymentResponse {
    fn from(error: &ProcessPaymentError) -> Self {
        Self::failure(error.to_string())
    }
}

impl From<&ProcessPaymentResult> for ProcessPaymentResponse {
    fn from(result: &ProcessPaymentResult) -> Self {
        let redirect_url = result.redirect_url.as_ref().map(|u| u.to_string());

        if result.is_transport_failure() {
            return Self {
                redirect_url,
                ..Self::failure(SERVER_ERROR_MESSAGE)
            };
        }

        let outcome = &result.outcome;
        let raw = Some(outcome.raw_gateway_fields.clone());
        if outcome.approved {
            Self {
                success: true,
                transaction_id: outcome.transaction_id.clone(),
                error: None,
                redirect_url,
                raw,
            }
        } else {
            Self {
                success: false,
                transaction_id: None,
                error: Some(
                    outcome
                        .decline_reason
                        .clone()
                        .filter(|r| !r.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_DECLINE_MESSAGE.to_string()),
                ),
                redirect_url,
                raw,
            }
        }
    }
}

/// `GET /api/webhook-test` when nothing has arrived yet.
#[derive(Debug, Clone, Serialize)]
pub struct NothingReceived {
    pub message: &'static str,
}

/// `POST /api/webhook-test` acknowledgement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub ok: bool,
    pub received_at: String,
    pub verified: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpressConfigQuery {
    #[serde(default)]
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileMissing {
    pub error: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
