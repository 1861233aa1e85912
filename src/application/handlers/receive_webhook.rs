//! ReceiveWebhookHandler - diagnostic receiver for outbound webhooks.
//!
//! Point a subscriber URL at this service to see exactly what was sent.
//! Only the most recent delivery is kept, in memory.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::domain::signing::SignatureCodec;

/// Last delivery as it arrived.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedWebhook {
    pub received_at: String,
    pub signature: String,
    /// True only when a secret is configured and the signature matches.
    pub verified: bool,
    pub json_error: Option<String>,
    pub parsed: Option<serde_json::Value>,
    pub raw_body: String,
}

/// Holds the most recent delivery.
#[derive(Debug, Default)]
pub struct WebhookInbox {
    last: RwLock<Option<ReceivedWebhook>>,
}

impl WebhookInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn last(&self) -> Option<ReceivedWebhook> {
        self.last.read().await.clone()
    }

    async fn store(&self, webhook: ReceivedWebhook) {
        *self.last.write().await = Some(webhook);
    }
}

pub struct ReceiveWebhookHandler {
    inbox: Arc<WebhookInbox>,
    codec: SignatureCodec,
}

impl ReceiveWebhookHandler {
    pub fn new(inbox: Arc<WebhookInbox>, codec: SignatureCodec) -> Self {
        Self { inbox, codec }
    }

    /// Records a delivery. Never rejects; bad JSON and bad signatures are
    /// reported in the stored record.
    pub async fn handle(&self, body: &[u8], signature: &str) -> ReceivedWebhook {
        let (parsed, json_error) = match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value) => (Some(value), None),
            Err(_) => (None, Some("Invalid JSON body".to_string())),
        };

        let verified =
            self.codec.is_configured() && !body.is_empty() && self.codec.verify_body(body, signature);

        let webhook = ReceivedWebhook {
            received_at: Timestamp::now().to_rfc3339(),
            signature: signature.to_string(),
            verified,
            json_error,
            parsed,
            raw_body: String::from_utf8_lossy(body).into_owned(),
        };

        tracing::info!(
            verified,
            bytes = body.len(),
            event_type = webhook
                .parsed
                .as_ref()
                .and_then(|p| p.get("type"))
                .and_then(|t| t.as_str())
                .unwrap_or(""),
            "Test webhook received"
        );

        self.inbox.store(webhook.clone()).await;
        webhook
    }
}
