//! Error body shared by every endpoint, and the checkout error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::checkout::CheckoutError;
use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
}

impl From<DomainError> for ErrorResponse {
    fn from(error: DomainError) -> Self {
        Self {
            error_code: error.code.to_string(),
            message: error.message,
        }
    }
}

pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::SessionNotFound => StatusCode::NOT_FOUND,
        ErrorCode::InvalidStateTransition | ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ExternalServiceError => StatusCode::BAD_GATEWAY,
        ErrorCode::ConfigurationError | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn domain_error_response(error: DomainError) -> Response {
    (status_for(error.code()), Json(ErrorResponse::from(error))).into_response()
}

/// Renders a checkout error with the payer-safe message.
pub fn checkout_error_response(error: &CheckoutError) -> Response {
    domain_error_response(DomainError::from(error))
}
