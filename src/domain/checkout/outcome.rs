//! Gateway outcomes and 3-D Secure evidence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Longest reason code carried into a redirect URL or webhook.
pub const MAX_REASON_LEN: usize = 120;

/// Reason code used when the gateway could not be reached or understood.
pub const SERVER_ERROR_REASON: &str = "server_error";

/// Reason code used when the payer abandons or fails the 3DS challenge.
pub const CHALLENGE_CANCELLED_REASON: &str = "3ds_cancelled";

/// Cuts a reason to [`MAX_REASON_LEN`] characters on a char boundary.
pub fn truncate_reason(reason: &str) -> String {
    reason.chars().take(MAX_REASON_LEN).collect()
}

/// Normalized result of one submission attempt.
///
/// Produced once per attempt and never merged with another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub approved: bool,
    pub transaction_id: Option<String>,
    pub decline_reason: Option<String>,
    #[serde(default)]
    pub raw_gateway_fields: BTreeMap<String, String>,
}

impl PaymentOutcome {
    pub fn approved(transaction_id: impl Into<String>) -> Self {
        Self {
            approved: true,
            transaction_id: Some(transaction_id.into()),
            decline_reason: None,
            raw_gateway_fields: BTreeMap::new(),
        }
    }

    pub fn declined(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            transaction_id: None,
            decline_reason: Some(reason.into()),
            raw_gateway_fields: BTreeMap::new(),
        }
    }

    /// Outcome standing in for a transport failure.
    pub fn server_error() -> Self {
        Self::declined(SERVER_ERROR_REASON)
    }

    pub fn with_raw_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        self.raw_gateway_fields = fields;
        self
    }

    /// Decline reason bounded for URLs; `None` for approvals.
    pub fn reason_code(&self) -> Option<String> {
        if self.approved {
            return None;
        }
        let reason = self
            .decline_reason
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or("declined");
        Some(truncate_reason(reason))
    }
}

/// Authentication values returned by a completed 3DS challenge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDsEvidence {
    #[serde(default)]
    pub card_holder_auth: Option<String>,
    #[serde(default)]
    pub cavv: Option<String>,
    #[serde(default)]
    pub directory_server_id: Option<String>,
    #[serde(default)]
    pub eci: Option<String>,
    #[serde(default)]
    pub three_ds_version: Option<String>,
    #[serde(default)]
    pub xid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_code_truncates_long_text() {
        let outcome = PaymentOutcome::declined("x".repeat(500));
        assert_eq!(outcome.reason_code().unwrap().len(), MAX_REASON_LEN);
    }

    #[test]
    fn reason_code_respects_char_boundaries() {
        let outcome = PaymentOutcome::declined("é".repeat(200));
        let code = outcome.reason_code().unwrap();
        assert_eq!(code.chars().count(), MAX_REASON_LEN);
    }

    #[test]
    fn reason_code_absent_on_approval() {
        assert_eq!(PaymentOutcome::approved("TX1").reason_code(), None);
    }

    #[test]
    fn blank_decline_reason_gets_generic_code() {
        let outcome = PaymentOutcome::declined("  ");
        assert_eq!(outcome.reason_code().as_deref(), Some("declined"));
    }

    #[test]
    fn server_error_outcome() {
        let outcome = PaymentOutcome::server_error();
        assert!(!outcome.approved);
        assert_eq!(outcome.reason_code().as_deref(), Some(SERVER_ERROR_REASON));
    }

    #[test]
    fn evidence_uses_widget_field_names() {
        let evidence: ThreeDsEvidence = serde_json::from_value(serde_json::json!({
            "cardHolderAuth": "verified",
            "cavv": "AAAB",
            "directoryServerId": "ds-1",
            "eci": "05",
            "threeDsVersion": "2.2.0",
            "xid": null
        }))
        .unwrap();

        assert_eq!(evidence.card_holder_auth.as_deref(), Some("verified"));
        assert_eq!(evidence.three_ds_version.as_deref(), Some("2.2.0"));
        assert_eq!(evidence.xid, None);
    }
}
