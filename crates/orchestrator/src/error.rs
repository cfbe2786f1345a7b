//! Error types for the chat pipeline.

use database::DatabaseError;
use thiserror::Error;

/// A persistence failure behind one of the store traits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        StoreError(err.to_string())
    }
}

/// Errors returned to callers of the chat pipeline.
///
/// The `Display` text of every variant is safe to show to the caller.
/// Variants carrying internal details keep them out of the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// The request body or an argument is unusable.
    #[error("{0}")]
    InvalidRequest(String),

    /// The session used up its trial prompts and has no own key.
    #[error("Trial prompt limit ({limit}) reached. Please provide your own OpenRouter API key.")]
    QuotaExceeded { limit: u32 },

    /// The shared trial key is missing or still the placeholder.
    #[error("Server trial API key (OPENROUTER_API_KEY environment variable) is not configured correctly.")]
    ServerKeyMisconfigured,

    /// The caller's own key is unusable.
    #[error("User API key is invalid or missing.")]
    UserKeyInvalid,

    /// Upstream answered 429.
    #[error("Rate limit exceeded for model {model}. Please try again later or contact support. (OpenRouter: {message})")]
    RateLimited { model: String, message: String },

    /// Upstream answered with another non-2xx status.
    #[error("API Error: {message}")]
    Upstream { status: u16, message: String },

    /// Upstream answered 2xx without a usable `choices` array.
    #[error("Invalid response structure from AI service (missing choices).")]
    InvalidResponse,

    /// The first choice carried neither text nor an image.
    #[error("Could not extract text or image content from OpenRouter API response.")]
    ExtractionFailure,

    /// The upstream call timed out.
    #[error("Request timed out while contacting AI service.")]
    Timeout,

    /// The upstream call failed at the transport level.
    #[error("Failed to communicate with AI service.")]
    Network(String),

    /// A store read or write failed.
    #[error("An internal error occurred. Please try again later.")]
    Persistence(String),
}

impl ChatError {
    /// HTTP status code for this error.
    ///
    /// Upstream statuses are passed through; anything outside the 4xx/5xx
    /// range becomes 502.
    pub fn status_code(&self) -> u16 {
        match self {
            ChatError::InvalidRequest(_) => 400,
            ChatError::UserKeyInvalid => 401,
            ChatError::QuotaExceeded { .. } => 403,
            ChatError::RateLimited { .. } => 429,
            ChatError::Upstream { status, .. } if (400..600).contains(status) => *status,
            ChatError::Upstream { .. } => 502,
            ChatError::ServerKeyMisconfigured
            | ChatError::InvalidResponse
            | ChatError::ExtractionFailure
            | ChatError::Persistence(_) => 500,
            ChatError::Network(_) => 502,
            ChatError::Timeout => 504,
        }
    }
}

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        ChatError::Persistence(err.0)
    }
}
