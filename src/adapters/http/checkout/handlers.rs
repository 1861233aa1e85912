//! HTTP handlers for checkout session endpoints.
//!
//! Mutations take the session lock with `try_lock`: a second mutation while
//! one is in flight gets `409 Conflict` instead of queueing behind a gateway
//! call.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::MutexGuard;

use crate::adapters::http::error::{checkout_error_response, domain_error_response};
use crate::application::{CheckoutOrchestrator, CheckoutServices};
use crate::domain::checkout::{CheckoutError, PaymentMode, ThreeDsEvidence};
use crate::domain::foundation::{CheckoutSessionId, DomainError, ErrorCode};

use super::dto::{PayResponse, SessionView, StepResponse, TokenEventRequest, UpdateSessionRequest};
use super::registry::{SessionRegistry, SharedOrchestrator};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct CheckoutHandlers {
    services: CheckoutServices,
    registry: Arc<SessionRegistry>,
}

impl CheckoutHandlers {
    pub fn new(services: CheckoutServices, registry: Arc<SessionRegistry>) -> Self {
        Self { services, registry }
    }

    fn find(&self, raw_id: &str) -> Result<SharedOrchestrator, Response> {
        let id: CheckoutSessionId = raw_id.parse().map_err(|_| {
            domain_error_response(DomainError::new(
                ErrorCode::ValidationFailed,
                "Invalid session ID",
            ))
        })?;

        self.registry.get(&id).ok_or_else(|| {
            domain_error_response(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Checkout session not found: {}", raw_id),
            ))
        })
    }
}

fn lock_for_mutation(
    shared: &SharedOrchestrator,
) -> Result<MutexGuard<'_, CheckoutOrchestrator>, Response> {
    shared.try_lock().map_err(|_| checkout_error_response(&CheckoutError::Busy))
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/checkout/sessions?<deep link> - Open a session
pub async fn create_session(
    State(handlers): State<CheckoutHandlers>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let orchestrator =
        CheckoutOrchestrator::from_query(handlers.services.clone(), params, PaymentMode::Card);
    let view = SessionView::from(orchestrator.session());
    handlers.registry.insert(orchestrator);

    (StatusCode::CREATED, Json(view)).into_response()
}

/// GET /api/checkout/sessions/:id - Current session view
pub async fn get_session(
    State(handlers): State<CheckoutHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let shared = match handlers.find(&session_id) {
        Ok(shared) => shared,
        Err(response) => return response,
    };

    let orchestrator = shared.lock().await;
    (StatusCode::OK, Json(SessionView::from(orchestrator.session()))).into_response()
}

/// PUT /api/checkout/sessions/:id/payer - Form edit
pub async fn update_session(
    State(handlers): State<CheckoutHandlers>,
    Path(session_id): Path<String>,
    Json(req): Json<UpdateSessionRequest>,
) -> Response {
    let shared = match handlers.find(&session_id) {
        Ok(shared) => shared,
        Err(response) => return response,
    };
    let mut orchestrator = match lock_for_mutation(&shared) {
        Ok(guard) => guard,
        Err(response) => return response,
    };

    match orchestrator.update(req.into()) {
        Ok(()) => (StatusCode::OK, Json(SessionView::from(orchestrator.session()))).into_response(),
        Err(e) => checkout_error_response(&e),
    }
}

/// POST /api/checkout/sessions/:id/token - Tokenization widget event
pub async fn token_event(
    State(handlers): State<CheckoutHandlers>,
    Path(session_id): Path<String>,
    Json(req): Json<TokenEventRequest>,
) -> Response {
    let shared = match handlers.find(&session_id) {
        Ok(shared) => shared,
        Err(response) => return response,
    };
    let mut orchestrator = match lock_for_mutation(&shared) {
        Ok(guard) => guard,
        Err(response) => return response,
    };

    match orchestrator.on_token(req.complete, req.token).await {
        Ok(step) => (
            StatusCode::OK,
            Json(StepResponse::new(step, orchestrator.session())),
        )
            .into_response(),
        Err(e) => checkout_error_response(&e),
    }
}

/// POST /api/checkout/sessions/:id/pay - Card pay action
pub async fn pay(
    State(handlers): State<CheckoutHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let shared = match handlers.find(&session_id) {
        Ok(shared) => shared,
        Err(response) => return response,
    };
    let mut orchestrator = match lock_for_mutation(&shared) {
        Ok(guard) => guard,
        Err(response) => return response,
    };

    match orchestrator.pay().await {
        Ok(challenge) => {
            let response = PayResponse {
                challenge,
                session: SessionView::from(orchestrator.session()),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => checkout_error_response(&e),
    }
}

/// POST /api/checkout/sessions/:id/challenge/complete - 3DS evidence
pub async fn challenge_complete(
    State(handlers): State<CheckoutHandlers>,
    Path(session_id): Path<String>,
    Json(evidence): Json<ThreeDsEvidence>,
) -> Response {
    let shared = match handlers.find(&session_id) {
        Ok(shared) => shared,
        Err(response) => return response,
    };
    let mut orchestrator = match lock_for_mutation(&shared) {
        Ok(guard) => guard,
        Err(response) => return response,
    };

    match orchestrator.on_challenge_complete(evidence).await {
        Ok(step) => (
            StatusCode::OK,
            Json(StepResponse::new(step, orchestrator.session())),
        )
            .into_response(),
        Err(e) => checkout_error_response(&e),
    }
}

/// POST /api/checkout/sessions/:id/challenge/failed - 3DS cancelled or failed
pub async fn challenge_failed(
    State(handlers): State<CheckoutHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let shared = match handlers.find(&session_id) {
        Ok(shared) => shared,
        Err(response) => return response,
    };
    let mut orchestrator = match lock_for_mutation(&shared) {
        Ok(guard) => guard,
        Err(response) => return response,
    };

    match orchestrator.on_challenge_failed() {
        Ok(step) => (
            StatusCode::OK,
            Json(StepResponse::new(step, orchestrator.session())),
        )
            .into_response(),
        Err(e) => checkout_error_response(&e),
    }
}
