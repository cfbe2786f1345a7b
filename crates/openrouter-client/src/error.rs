//! Upstream error types.

use thiserror::Error;

use crate::api_types::ApiError;

/// Errors from a call to the upstream provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The HTTP client could not be built.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The call did not finish within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection or transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered 429.
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    /// Upstream answered with another non-2xx status.
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// A 2xx body that could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Map a non-2xx status and its body to an error.
///
/// The message is `error.message` from the body when it parses, otherwise the
/// raw body text.
pub fn error_from_body(status: u16, body: &str) -> UpstreamError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|api_error| api_error.error.message)
        .unwrap_or_else(|_| body.to_string());

    if status == 429 {
        UpstreamError::RateLimited { message }
    } else {
        UpstreamError::Status { status, message }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::InvalidResponse(err.to_string())
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}
