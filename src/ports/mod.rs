//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the checkout domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentGateway` - Charges a tokenized payment once
//! - `WebhookTransport` - Delivers one signed webhook body to one subscriber
//! - `ThreeDsChallenge` - Launches the cardholder authentication widget

mod payment_gateway;
mod three_ds;
mod webhook_transport;

pub use payment_gateway::{ChargeRequest, GatewayError, PaymentGateway};
pub use three_ds::{ChallengeError, ChallengeRequest, ThreeDsChallenge};
pub use webhook_transport::{DeliveryError, WebhookTransport};
