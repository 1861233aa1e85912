//! HTTP handlers for the stateless payment endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{
    GetExpressConfigHandler, ProcessPaymentError, ProcessPaymentHandler, ReceiveWebhookHandler,
    WebhookInbox,
};
use crate::ports::ChargeRequest;

use super::dto::{
    ExpressConfigQuery, FileMissing, HealthResponse, NothingReceived, ProcessPaymentResponse,
    WebhookAck,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct PaymentHandlers {
    process_handler: Arc<ProcessPaymentHandler>,
    webhook_handler: Arc<ReceiveWebhookHandler>,
    inbox: Arc<WebhookInbox>,
    express_handler: Arc<GetExpressConfigHandler>,
    /// Names checked, in order, for the webhook signature.
    signature_headers: Arc<Vec<String>>,
    apple_pay_file: Arc<PathBuf>,
}

impl PaymentHandlers {
    pub fn new(
        process_handler: Arc<ProcessPaymentHandler>,
        webhook_handler: Arc<ReceiveWebhookHandler>,
        inbox: Arc<WebhookInbox>,
        express_handler: Arc<GetExpressConfigHandler>,
        signature_headers: Vec<String>,
        apple_pay_file: PathBuf,
    ) -> Self {
        Self {
            process_handler,
            webhook_handler,
            inbox,
            express_handler,
            signature_headers: Arc::new(signature_headers),
            apple_pay_file: Arc::new(apple_pay_file),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/process-payment - One-shot charge
pub async fn process_payment(
    State(handlers): State<PaymentHandlers>,
    Json(req): Json<ChargeRequest>,
) -> Response {
    match handlers.process_handler.handle(req).await {
        Ok(result) => {
            let status = if result.is_transport_failure() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else if result.outcome.approved {
                StatusCode::OK
            } else {
                StatusCode::BAD_REQUEST
            };
            (status, Json(ProcessPaymentResponse::from(&result))).into_response()
        }
        Err(e) => {
            let status = match e {
                ProcessPaymentError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
                ProcessPaymentError::MissingTokenOrAmount
                | ProcessPaymentError::Blocked
                | ProcessPaymentError::UnsupportedCurrency => StatusCode::BAD_REQUEST,
            };
            (status, Json(ProcessPaymentResponse::from(&e))).into_response()
        }
    }
}

/// POST /api/webhook-test - Record a delivery
pub async fn receive_test_webhook(
    State(handlers): State<PaymentHandlers>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = handlers
        .signature_headers
        .iter()
        .find_map(|name| headers.get(name.as_str()))
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let received = handlers.webhook_handler.handle(&body, &signature).await;

    let ack = WebhookAck {
        ok: true,
        received_at: received.received_at,
        verified: received.verified,
    };
    (StatusCode::OK, Json(ack)).into_response()
}

/// GET /api/webhook-test - Last delivery
pub async fn last_test_webhook(State(handlers): State<PaymentHandlers>) -> Response {
    match handlers.inbox.last().await {
        Some(webhook) => (StatusCode::OK, Json(webhook)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(NothingReceived {
                message: "No webhook received yet",
            }),
        )
            .into_response(),
    }
}

/// GET /.well-known/apple-developer-merchantid-domain-association
pub async fn apple_pay_domain_association(State(handlers): State<PaymentHandlers>) -> Response {
    match tokio::fs::read_to_string(handlers.apple_pay_file.as_path()).await {
        Ok(content) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CACHE_CONTROL, "public, max-age=300"),
            ],
            content,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(
                path = %handlers.apple_pay_file.display(),
                error = %e,
                "Apple Pay domain association file missing"
            );
            (
                StatusCode::NOT_FOUND,
                Json(FileMissing {
                    error: "Apple Pay verification file not found",
                }),
            )
                .into_response()
        }
    }
}

/// GET /api/checkout/express-config?amount= - Wallet button settings
pub async fn express_config(
    State(handlers): State<PaymentHandlers>,
    Query(query): Query<ExpressConfigQuery>,
) -> Response {
    let config = handlers.express_handler.handle(&query.amount);
    (StatusCode::OK, Json(config)).into_response()
}

/// GET /health - Liveness
pub async fn health() -> Response {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
        .into_response()
}
