//! Application layer - orchestration and request handlers.
//!
//! Coordinates domain rules with the ports. Nothing here knows about HTTP
//! or about which gateway is behind [`PaymentGateway`](crate::ports::PaymentGateway).

pub mod checkout;
pub mod handlers;
mod webhook_dispatcher;

pub use checkout::{CheckoutOrchestrator, CheckoutServices, CheckoutStep};
pub use handlers::{
    ExpressConfig, GetExpressConfigHandler, ProcessPaymentError, ProcessPaymentHandler,
    ProcessPaymentResult, ReceiveWebhookHandler, ReceivedWebhook, WalletSettings, WebhookInbox,
};
pub use webhook_dispatcher::{
    DispatchHandle, DispatchReport, WebhookDispatcher, SIGNATURE_HEADER, SIGNATURE_HEADER_ALIAS,
};
