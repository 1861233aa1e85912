//! HTTP adapter for process-payment, the webhook receiver, wallet setup and health.

mod dto;
mod handlers;
mod routes;

pub use dto::{ProcessPaymentResponse, DEFAULT_DECLINE_MESSAGE, SERVER_ERROR_MESSAGE};
pub use handlers::PaymentHandlers;
pub use routes::{payment_routes, APPLE_PAY_DOMAIN_ASSOCIATION_PATH};
