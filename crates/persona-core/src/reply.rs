//! Normalized chat reply returned to callers.

use serde::{Deserialize, Serialize};

use crate::message::InlineData;

/// The response body of the chat endpoint.
///
/// On success `error` is `None`. Both content fields may be empty when the
/// model answered with blank text. On failure both content fields are `None` and `error` carries a message safe
/// to show to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    /// Assistant text, trimmed.
    pub response_text: Option<String>,
    /// Assistant image, if the model returned one.
    pub image_data: Option<InlineData>,
    /// Failure message.
    pub error: Option<String>,
}

impl ChatReply {
    /// Create a successful reply.
    pub fn success(response_text: Option<String>, image_data: Option<InlineData>) -> Self {
        Self {
            response_text,
            image_data,
            error: None,
        }
    }

    /// Create a failed reply.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            response_text: None,
            image_data: None,
            error: Some(message.into()),
        }
    }

    /// Whether this reply carries no error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
