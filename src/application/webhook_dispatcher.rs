//! Webhook fan-out.
//!
//! One event is serialized once, signed once, and delivered to every
//! subscriber concurrently on a background task. Each delivery fails on its
//! own: errors are logged and dropped, and nothing is reported back to the
//! checkout flow. Callers get a [`DispatchHandle`] they may ignore.

use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;

use crate::domain::checkout::WebhookEvent;
use crate::domain::signing::SignatureCodec;
use crate::ports::WebhookTransport;

/// Primary signature header.
pub const SIGNATURE_HEADER: &str = "x-edge-signature";

/// Alias header carrying the same digest.
pub const SIGNATURE_HEADER_ALIAS: &str = "X-EdgePlus-Signature";

/// Summary of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Handle to a background fan-out. Dropping it does not cancel delivery.
#[derive(Debug)]
pub struct DispatchHandle {
    task: Option<JoinHandle<DispatchReport>>,
}

impl DispatchHandle {
    fn noop() -> Self {
        Self { task: None }
    }

    /// Whether any delivery was scheduled.
    pub fn is_noop(&self) -> bool {
        self.task.is_none()
    }

    /// Waits for every delivery to settle.
    pub async fn wait(self) -> DispatchReport {
        match self.task {
            Some(task) => task.await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "Webhook fan-out task panicked");
                DispatchReport::default()
            }),
            None => DispatchReport::default(),
        }
    }
}

/// Signs and fans out webhook events.
#[derive(Clone)]
pub struct WebhookDispatcher {
    transport: Arc<dyn WebhookTransport>,
    subscribers: Arc<Vec<String>>,
    codec: SignatureCodec,
    signature_headers: Arc<Vec<String>>,
}

impl WebhookDispatcher {
    pub fn new(
        transport: Arc<dyn WebhookTransport>,
        subscribers: Vec<String>,
        codec: SignatureCodec,
    ) -> Self {
        Self {
            transport,
            subscribers: Arc::new(subscribers),
            codec,
            signature_headers: Arc::new(vec![
                SIGNATURE_HEADER.to_string(),
                SIGNATURE_HEADER_ALIAS.to_string(),
            ]),
        }
    }

    /// Replaces the header names that carry the signature.
    pub fn with_signature_headers(mut self, headers: Vec<String>) -> Self {
        self.signature_headers = Arc::new(headers);
        self
    }

    pub fn subscribers(&self) -> &[String] {
        &self.subscribers
    }

    /// Headers attached to `body`: content type plus signature, when a secret is set.
    pub fn headers_for(&self, body: &[u8]) -> Vec<(String, String)> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(signature) = self.codec.sign_body(body) {
            headers.extend(
                self.signature_headers
                    .iter()
                    .map(|name| (name.clone(), signature.clone())),
            );
        }
        headers
    }

    /// Starts delivering `event` to every subscriber and returns immediately.
    ///
    /// With no subscribers this is a no-op. Must be called within a Tokio runtime.
    pub fn dispatch(&self, event: &WebhookEvent) -> DispatchHandle {
        if self.subscribers.is_empty() {
            tracing::warn!(event_type = %event.event_type, "No webhook subscribers configured, skipping");
            return DispatchHandle::noop();
        }

        let body = match event.to_body() {
            Ok(body) => Arc::new(body),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize webhook event");
                return DispatchHandle::noop();
            }
        };
        let headers = Arc::new(self.headers_for(&body));
        let transport = Arc::clone(&self.transport);
        let subscribers = Arc::clone(&self.subscribers);
        let event_type = event.event_type;

        let task = tokio::spawn(async move {
            let deliveries = subscribers.iter().map(|url| {
                let transport = Arc::clone(&transport);
                let headers = Arc::clone(&headers);
                let body = Arc::clone(&body);
                async move {
                    let result = transport.post(url, &headers, &body).await;
                    if let Err(e) = &result {
                        tracing::warn!(
                            subscriber = %url,
                            event_type = %event_type,
                            error = %e,
                            "Webhook delivery failed"
                        );
                    }
                    result.is_ok()
                }
            });

            let results = join_all(deliveries).await;
            let delivered = results.iter().filter(|ok| **ok).count();
            let report = DispatchReport {
                delivered,
                failed: results.len() - delivered,
            };
            tracing::debug!(
                event_type = %event_type,
                delivered = report.delivered,
                failed = report.failed,
                "Webhook fan-out finished"
            );
            report
        });

        DispatchHandle { task: Some(task) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::webhooks::RecordingWebhookTransport;
    use crate::domain::checkout::{CustomerSnapshot, WebhookEventParams, WebhookEventType};
    use std::collections::BTreeMap;

    fn event() -> WebhookEvent {
        WebhookEvent::new(WebhookEventParams {
            event_type: WebhookEventType::PaymentSucceeded,
            amount: "10.00",
            currency: "GBP",
            order_reference: Some("ORD-1"),
            transaction_id: Some("TX1"),
            customer: CustomerSnapshot::default(),
            gateway_response: BTreeMap::new(),
            channel: None,
        })
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn delivers_to_every_subscriber_with_signature() {
        let transport = Arc::new(RecordingWebhookTransport::new());
        let dispatcher = WebhookDispatcher::new(
            transport.clone(),
            urls(&["https://a.example.com/hook", "https://b.example.com/hook"]),
            SignatureCodec::new("whsec"),
        );

        let report = dispatcher.dispatch(&event()).wait().await;

        assert_eq!(report, DispatchReport { delivered: 2, failed: 0 });
        let deliveries = transport.deliveries();
        assert_eq!(deliveries.len(), 2);

        let codec = SignatureCodec::new("whsec");
        for delivery in &deliveries {
            let sig = delivery.header(SIGNATURE_HEADER).unwrap();
            assert_eq!(delivery.header(SIGNATURE_HEADER_ALIAS), Some(sig));
            assert!(codec.verify_body(&delivery.body, sig));
        }
        // identical bytes for every subscriber
        assert_eq!(deliveries[0].body, deliveries[1].body);
    }

    #[tokio::test]
    async fn one_failure_does_not_block_others() {
        let transport = Arc::new(RecordingWebhookTransport::new());
        transport.fail_for("https://down.example.com/hook");
        let dispatcher = WebhookDispatcher::new(
            transport.clone(),
            urls(&["https://down.example.com/hook", "https://up.example.com/hook"]),
            SignatureCodec::unconfigured(),
        );

        let report = dispatcher.dispatch(&event()).wait().await;

        assert_eq!(report, DispatchReport { delivered: 1, failed: 1 });
        assert_eq!(transport.delivered_urls(), vec!["https://up.example.com/hook".to_string()]);
    }

    #[tokio::test]
    async fn unsigned_when_secret_missing() {
        let transport = Arc::new(RecordingWebhookTransport::new());
        let dispatcher = WebhookDispatcher::new(
            transport.clone(),
            urls(&["https://a.example.com/hook"]),
            SignatureCodec::unconfigured(),
        );

        dispatcher.dispatch(&event()).wait().await;

        let delivery = &transport.deliveries()[0];
        assert_eq!(delivery.header(SIGNATURE_HEADER), None);
        assert_eq!(delivery.header("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn empty_subscriber_list_is_noop() {
        let transport = Arc::new(RecordingWebhookTransport::new());
        let dispatcher =
            WebhookDispatcher::new(transport.clone(), Vec::new(), SignatureCodec::new("s"));

        let handle = dispatcher.dispatch(&event());

        assert!(handle.is_noop());
        assert_eq!(handle.wait().await, DispatchReport::default());
        assert!(transport.deliveries().is_empty());
    }

    #[tokio::test]
    async fn custom_signature_headers() {
        let transport = Arc::new(RecordingWebhookTransport::new());
        let dispatcher = WebhookDispatcher::new(
            transport.clone(),
            urls(&["https://a.example.com/hook"]),
            SignatureCodec::new("s"),
        )
        .with_signature_headers(vec!["x-signature".to_string()]);

        dispatcher.dispatch(&event()).wait().await;

        let delivery = &transport.deliveries()[0];
        assert!(delivery.header("x-signature").is_some());
        assert_eq!(delivery.header(SIGNATURE_HEADER), None);
    }
}
