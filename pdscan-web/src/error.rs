//! Error types for pdscan-web
//!
//! Every failure becomes a JSON message for the page; the session survives.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., report requested before a verdict exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Feature not configured (503) - e.g., no SMTP credentials
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Upstream delivery failed (502)
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// pdscan-common error
    #[error(transparent)]
    Common(#[from] pdscan_common::Error),
}

impl ApiError {
    fn parts(self) -> (StatusCode, &'static str, String) {
        use pdscan_common::Error as CommonError;

        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", msg)
            }
            ApiError::Delivery(msg) => (StatusCode::BAD_GATEWAY, "DELIVERY_FAILED", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", err.to_string()),
            ApiError::Common(err) => {
                let message = err.to_string();
                match err {
                    CommonError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", message),
                    CommonError::InvalidInput(_) => {
                        (StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
                    }
                    CommonError::Model(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "MODEL_ERROR", message)
                    }
                    CommonError::Report(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "REPORT_ERROR", message)
                    }
                    CommonError::Notify(_) => (StatusCode::BAD_GATEWAY, "DELIVERY_FAILED", message),
                    CommonError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", message),
                    CommonError::Config(_) | CommonError::Internal(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
                    }
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = self.parts();

        if status.is_server_error() {
            error!("{} {}: {}", status.as_u16(), error_code, message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
