//! Webhook transports.
//!
//! - `HttpWebhookTransport` - production transport (reqwest)
//! - `RecordingWebhookTransport` - in-memory transport for tests

mod http_transport;
mod recording_transport;

pub use http_transport::HttpWebhookTransport;
pub use recording_transport::{RecordedDelivery, RecordingWebhookTransport};
