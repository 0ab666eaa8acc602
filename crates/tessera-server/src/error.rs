//! Error types for the server integration.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use tessera_session::Error as SessionError;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// No authenticated session on a route that needs one.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Session operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ServerError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ServerError::Session(e) => match e {
                SessionError::Store(_) => (StatusCode::SERVICE_UNAVAILABLE, "store_error"),
                SessionError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "cancelled"),
                SessionError::DeadlineExceeded => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
                SessionError::Generation(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "generation_error")
                }
                SessionError::Cookie(_) => (StatusCode::INTERNAL_SERVER_ERROR, "cookie_error"),
                SessionError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let detail = self.to_string();

        // Server-side failures are logged in full but never described to the client
        let message = if status.is_server_error() {
            tracing::error!(status = %status, code, error = %detail, "Session error");
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            tracing::warn!(status = %status, code, error = %detail, "Client error");
            detail
        };

        let body = ErrorResponse {
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
