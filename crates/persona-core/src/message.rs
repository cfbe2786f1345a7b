//! Inbound chat request types.
//!
//! The browser client speaks a Gemini-style schema: each turn has a role
//! ("user" or "model") and an ordered list of parts, where a part is either
//! `{"text": ...}` or `{"inlineData": {"mimeType": ..., "data": ...}}`.
//!
//! Parsing is lenient below the top level. A malformed message or part is
//! skipped with a warning instead of failing the whole request; only a missing,
//! non-list or empty `contents` field is rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Errors for a chat request body that cannot be processed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// No `contents` field (or the body is not an object).
    #[error("Invalid request body, missing 'contents'")]
    MissingContents,

    /// `contents` is present but is not a list.
    #[error("Invalid request body, 'contents' must be a list")]
    ContentsNotList,

    /// `contents` is an empty list.
    #[error("Invalid request body, 'contents' must not be empty")]
    EmptyContents,
}

/// A validated chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Conversation turns in order, oldest first.
    pub contents: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Validate and decode a raw JSON request body.
    pub fn from_json(body: &Value) -> Result<Self, RequestError> {
        let items = match body.get("contents") {
            None | Some(Value::Null) => return Err(RequestError::MissingContents),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(RequestError::ContentsNotList),
        };

        if items.is_empty() {
            return Err(RequestError::EmptyContents);
        }

        let mut contents = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match ChatMessage::deserialize(item) {
                Ok(message) if message.role.trim().is_empty() => {
                    warn!(index, "Skipping message with empty role");
                }
                Ok(message) => contents.push(message),
                Err(err) => warn!(index, error = %err, "Skipping malformed message"),
            }
        }

        Ok(Self { contents })
    }
}

/// One conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user" or "model"; anything else is passed through upstream unchanged.
    pub role: String,
    /// Ordered content parts.
    pub parts: Vec<Part>,
}

impl ChatMessage {
    /// Create a message with a single text part.
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            parts: vec![Part::Text { text: text.into() }],
        }
    }
}

/// A single message part.
///
/// `InlineData` keeps the raw JSON so that a malformed payload can be logged
/// and skipped by the translator rather than rejected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Plain text.
    Text { text: String },
    /// Base64 payload with a mime type.
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Value,
    },
    /// Anything else; ignored.
    Unknown(Value),
}

impl Part {
    /// Create an inline data part.
    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: serde_json::json!({
                "mimeType": mime_type.into(),
                "data": data.into(),
            }),
        }
    }
}

/// A base64 payload tagged with its mime type.
///
/// Used both for inbound inline images and for the image returned in a
/// [`ChatReply`](crate::ChatReply).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// e.g. "image/png"
    pub mime_type: String,
    /// Base64 payload, without any `data:` prefix.
    pub data: String,
}

impl InlineData {
    /// Decode an `inlineData` object, returning `None` if it is not
    /// `{"mimeType": string, "data": string}`.
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }

    /// Whether the mime type is an image type.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Render as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_contents_rejected() {
        assert_eq!(
            ChatRequest::from_json(&json!({})),
            Err(RequestError::MissingContents)
        );
        assert_eq!(
            ChatRequest::from_json(&json!({"contents": null})),
            Err(RequestError::MissingContents)
        );
        assert_eq!(
            ChatRequest::from_json(&json!("not an object")),
            Err(RequestError::MissingContents)
        );
    }

    #[test]
    fn test_non_list_contents_rejected() {
        assert_eq!(
            ChatRequest::from_json(&json!({"contents": "hello"})),
            Err(RequestError::ContentsNotList)
        );
        assert_eq!(
            ChatRequest::from_json(&json!({"contents": {"role": "user"}})),
            Err(RequestError::ContentsNotList)
        );
    }

    #[test]
    fn test_empty_contents_rejected() {
        assert_eq!(
            ChatRequest::from_json(&json!({"contents": []})),
            Err(RequestError::EmptyContents)
        );
    }

    #[test]
    fn test_parses_text_and_inline_parts() {
        let body = json!({
            "contents": [
                {"role": "user", "parts": [
                    {"text": "look at this"},
                    {"inlineData": {"mimeType": "image/png", "data": "QUJD"}}
                ]},
                {"role": "model", "parts": [{"text": "nice"}]}
            ]
        });

        let request = ChatRequest::from_json(&body).unwrap();
        assert_eq!(request.contents.len(), 2);
        assert_eq!(request.contents[0].parts.len(), 2);
        assert!(matches!(request.contents[0].parts[0], Part::Text { .. }));
        assert_eq!(request.contents[0].parts[1], Part::inline("image/png", "QUJD"));
        assert_eq!(request.contents[1].role, "model");
    }

    #[test]
    fn test_malformed_messages_skipped() {
        let body = json!({
            "contents": [
                {"role": "user"},
                {"parts": [{"text": "no role"}]},
                {"role": "", "parts": [{"text": "empty role"}]},
                {"role": "user", "parts": "not a list"},
                {"role": "user", "parts": [{"text": "kept"}]}
            ]
        });

        let request = ChatRequest::from_json(&body).unwrap();
        assert_eq!(request.contents, vec![ChatMessage::text("user", "kept")]);
    }

    #[test]
    fn test_unknown_part_kept_as_unknown() {
        let body = json!({
            "contents": [{"role": "user", "parts": [{"fileData": {}}, {"text": null}]}]
        });

        let request = ChatRequest::from_json(&body).unwrap();
        let parts = &request.contents[0].parts;
        assert!(matches!(parts[0], Part::Unknown(_)));
        assert!(matches!(parts[1], Part::Unknown(_)));
    }

    #[test]
    fn test_inline_data_from_value() {
        let inline = InlineData::from_value(&json!({"mimeType": "image/jpeg", "data": "AAAA"}));
        let inline = inline.unwrap();
        assert!(inline.is_image());
        assert_eq!(inline.to_data_uri(), "data:image/jpeg;base64,AAAA");

        assert!(InlineData::from_value(&json!({"mimeType": "image/png"})).is_none());
        assert!(InlineData::from_value(&json!("QUJD")).is_none());

        let pdf = InlineData::from_value(&json!({"mimeType": "application/pdf", "data": "x"}));
        assert!(!pdf.unwrap().is_image());
    }
}
