//! API error types mapped to HTTP status codes.
//!
//! Each [`ApiError`] variant maps to a specific HTTP status code and produces
//! a JSON response body `{"error": "message"}`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ottometer_storage::StorageError;
use serde_json::json;

/// Application-level error type that implements `IntoResponse`.
///
/// - `BadRequest` → 400
/// - `NotFound` → 404
/// - `Timeout` → 503
/// - `Internal` → 500
#[derive(Debug)]
pub enum ApiError {
    /// Invalid payload, path or record (400).
    BadRequest(String),
    /// Record not found (404).
    NotFound(String),
    /// Storage operation exceeded its time budget (503). For writes this
    /// means the transaction was rolled back and a retry is safe.
    Timeout,
    /// Unexpected server error (500). The detail is logged, never returned.
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Validation(err) => ApiError::BadRequest(err.to_string()),
            StorageError::NotFound(id) => ApiError::NotFound(format!("Grow unit {} not found", id)),
            StorageError::Timeout => ApiError::Timeout,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Timeout => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Storage operation timed out".to_string(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
