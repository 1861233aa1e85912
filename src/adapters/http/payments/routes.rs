//! HTTP routes for the stateless payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    apple_pay_domain_association, express_config, health, last_test_webhook, process_payment,
    receive_test_webhook, PaymentHandlers,
};

pub const APPLE_PAY_DOMAIN_ASSOCIATION_PATH: &str =
    "/.well-known/apple-developer-merchantid-domain-association";

/// Routes mounted at the application root.
pub fn payment_routes(handlers: PaymentHandlers) -> Router {
    Router::new()
        .route("/api/process-payment", post(process_payment))
        .route(
            "/api/webhook-test",
            post(receive_test_webhook).get(last_test_webhook),
        )
        .route("/api/checkout/express-config", get(express_config))
        .route(APPLE_PAY_DOMAIN_ASSOCIATION_PATH, get(apple_pay_domain_association))
        .route("/health", get(health))
        .with_state(handlers)
}
