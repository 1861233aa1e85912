//! HTTP adapters - REST API over the checkout application layer.
//!
//! - `checkout` - per-session endpoints under `/api/checkout/sessions`
//! - `payments` - process-payment, webhook receiver, wallet setup, health

pub mod checkout;
mod error;
pub mod payments;

use std::time::Duration;

use axum::Router;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use checkout::{checkout_routes, CheckoutHandlers, SessionRegistry};
pub use error::{checkout_error_response, domain_error_response, status_for, ErrorResponse};
pub use payments::{payment_routes, PaymentHandlers};

/// Full application router with request tracing.
pub fn api_router(
    checkout: CheckoutHandlers,
    payments: PaymentHandlers,
    request_timeout: Duration,
) -> Router {
    Router::new()
        .nest("/api/checkout/sessions", checkout_routes(checkout))
        .merge(payment_routes(payments))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
