//! Error types for HTTP handlers.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::{DatabaseError, ValidationError};
use orchestrator::ChatError;
use thiserror::Error;

/// Errors returned by the CRUD and settings handlers.
///
/// Most variants render as `{"error": message}`. [`ApiError::Message`] renders
/// as `{"message": message}` for the model endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or invalid input.
    #[error("{0}")]
    BadRequest(String),

    /// Missing record.
    #[error("{0}")]
    NotFound(String),

    /// Missing or wrong admin credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// A failure with a fixed caller-facing message; details are only logged.
    #[error("{message}")]
    Internal { message: &'static str, detail: String },

    /// A `{"message": ...}` body with an explicit status.
    #[error("{message}")]
    Message { status: StatusCode, message: String },
}

impl ApiError {
    /// Map a database error, turning missing records into 404s.
    pub fn from_db(
        err: DatabaseError,
        context: &'static str,
        not_found: impl FnOnce() -> String,
    ) -> Self {
        if err.is_not_found() {
            ApiError::NotFound(not_found())
        } else {
            ApiError::internal(context, err)
        }
    }

    /// Wrap an internal failure behind a fixed message.
    pub fn internal(message: &'static str, detail: impl std::fmt::Display) -> Self {
        ApiError::Internal {
            message,
            detail: detail.to_string(),
        }
    }

    /// Render a chat-layer error as a `{"message": ...}` body.
    pub fn message(err: ChatError) -> Self {
        ApiError::Message {
            status: status_for(&err),
            message: err.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Message { status, .. } => *status,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::Internal { message, detail } => {
                tracing::error!(detail = %detail, "{}", message);
            }
            ApiError::Unauthorized => tracing::warn!("Unauthorized admin request"),
            other => tracing::debug!(status = status.as_u16(), "{}", other),
        }

        match self {
            ApiError::Unauthorized => (
                status,
                [(header::WWW_AUTHENTICATE, r#"Basic realm="admin""#)],
                Json(serde_json::json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            ApiError::Message { message, .. } => {
                (status, Json(serde_json::json!({ "message": message }))).into_response()
            }
            other => (status, Json(serde_json::json!({ "error": other.to_string() }))).into_response(),
        }
    }
}

/// HTTP status for a chat-layer error.
pub fn status_for(err: &ChatError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY)
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
