//! JSON error responses for the HTTP adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::error::TradebucketsError;

/// An HTTP-facing error: a status, a message, and (for validation failures)
/// the full list of collected rule violations.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Vec<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn validation(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            errors,
        }
    }
}

impl From<TradebucketsError> for ApiError {
    fn from(err: TradebucketsError) -> Self {
        match err {
            TradebucketsError::Validation { errors } => {
                Self::validation("Validation errors in trade data", errors)
            }
            TradebucketsError::BucketNotFound { .. } => Self::not_found("Bucket not found"),
            TradebucketsError::TradeNotFound { .. } => Self::not_found("Trade not found"),
            TradebucketsError::DuplicateName { name } => Self::new(
                StatusCode::CONFLICT,
                format!("Bucket name \"{name}\" already exists"),
            ),
            TradebucketsError::Derivation { reason } => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, reason)
            }
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = if self.errors.is_empty() {
            json!({ "message": self.message })
        } else {
            json!({ "message": self.message, "errors": self.errors })
        };
        (self.status, Json(body)).into_response()
    }
}
