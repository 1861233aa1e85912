//! HTTP routes for checkout session endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    challenge_complete, challenge_failed, create_session, get_session, pay, token_event,
    update_session, CheckoutHandlers,
};

/// Session router, mounted under `/api/checkout/sessions`.
pub fn checkout_routes(handlers: CheckoutHandlers) -> Router {
    Router::new()
        .route("/", post(create_session))
        .route("/:id", get(get_session))
        .route("/:id/payer", put(update_session))
        .route("/:id/token", post(token_event))
        .route("/:id/pay", post(pay))
        .route("/:id/challenge/complete", post(challenge_complete))
        .route("/:id/challenge/failed", post(challenge_failed))
        .with_state(handlers)
}
