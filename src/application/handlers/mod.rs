//! Application handlers.
//!
//! Stateless request handlers that sit next to the per-session orchestrator.

mod express_config;
mod process_payment;
mod receive_webhook;

pub use express_config::{
    ApplePayConfig, ExpressConfig, GetExpressConfigHandler, GooglePayConfig, WalletSettings,
};
pub use process_payment::{ProcessPaymentError, ProcessPaymentHandler, ProcessPaymentResult};
pub use receive_webhook::{ReceiveWebhookHandler, ReceivedWebhook, WebhookInbox};
