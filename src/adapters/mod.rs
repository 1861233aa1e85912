//! Adapters - implementations of the port interfaces, plus the HTTP surface.
//!
//! - `gateway` - NMI direct-post gateway and a mock
//! - `webhooks` - HTTP webhook transport and a recording double
//! - `challenge` - 3-D Secure challenge drivers
//! - `http` - axum routes and handlers

pub mod challenge;
pub mod gateway;
pub mod http;
pub mod webhooks;

pub use challenge::{ClientDrivenChallenge, ScriptedChallenge};
pub use gateway::{MockPaymentGateway, NmiConfig, NmiGateway};
pub use webhooks::{HttpWebhookTransport, RecordedDelivery, RecordingWebhookTransport};
