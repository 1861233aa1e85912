//! In-memory webhook transport for tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{DeliveryError, WebhookTransport};

/// One captured POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDelivery {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedDelivery {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// Captures deliveries instead of sending them.
///
/// URLs registered with [`fail_for`](Self::fail_for) reject with a 503 and
/// are not recorded as delivered.
#[derive(Clone, Default)]
pub struct RecordingWebhookTransport {
    inner: Arc<Mutex<RecordingState>>,
}

#[derive(Default)]
struct RecordingState {
    deliveries: Vec<RecordedDelivery>,
    failing: HashSet<String>,
    attempts: usize,
}

impl RecordingWebhookTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, url: impl Into<String>) {
        self.state().failing.insert(url.into());
    }

    /// Successful deliveries in completion order.
    pub fn deliveries(&self) -> Vec<RecordedDelivery> {
        self.state().deliveries.clone()
    }

    pub fn delivered_urls(&self) -> Vec<String> {
        self.state().deliveries.iter().map(|d| d.url.clone()).collect()
    }

    /// Every POST attempted, including rejected ones.
    pub fn attempts(&self) -> usize {
        self.state().attempts
    }

    fn state(&self) -> MutexGuard<'_, RecordingState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WebhookTransport for RecordingWebhookTransport {
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &[u8],
    ) -> Result<(), DeliveryError> {
        let mut state = self.state();
        state.attempts += 1;
        if state.failing.contains(url) {
            return Err(DeliveryError::Rejected { status: 503 });
        }
        state.deliveries.push(RecordedDelivery {
            url: url.to_string(),
            headers: headers.to_vec(),
            body: body.to_vec(),
        });
        Ok(())
    }
}
