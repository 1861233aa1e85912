//! Webhook transport port.
//!
//! Delivers one already-signed body to one subscriber. Fan-out, signing and
//! failure isolation live in the dispatcher; a transport only moves bytes.

use async_trait::async_trait;
use thiserror::Error;

/// Port for POSTing webhook bodies.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Sends `body` to `url` with the given extra headers.
    ///
    /// Any non-2xx response is an error.
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &[u8],
    ) -> Result<(), DeliveryError>;
}

/// Why a single delivery failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Webhook delivery failed: {0}")]
    Network(String),

    #[error("Webhook subscriber responded with status {status}")]
    Rejected { status: u16 },
}
