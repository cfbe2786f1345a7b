//! OpenRouter request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message in the upstream schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamMessage {
    /// Role: "system", "user", or "assistant"
    pub role: String,
    /// Message content
    pub content: MessageContent,
}

impl UpstreamMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: MessageContent::Text(content.into()),
        }
    }
}

/// Outbound message content: a plain string or a list of typed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain string content.
    Text(String),
    /// Multi-part content (text and images).
    Parts(Vec<ContentPart>),
}

/// A single typed part of outbound content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// `{"type": "text", "text": ...}`
    Text { text: String },
    /// `{"type": "image_url", "image_url": {"url": ...}}`
    ImageUrl { image_url: ImageUrl },
}

/// Image reference, usually a `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// URL or data URI
    pub url: String,
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier, e.g. "openai/gpt-3.5-turbo"
    pub model: String,
    /// Messages in the conversation, system prompt first
    pub messages: Vec<UpstreamMessage>,
}

/// Chat completion response.
///
/// Only the fields the relay reads are modeled. `choices` is optional so a
/// body without it can be reported as an invalid response instead of a
/// decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    /// Response ID
    #[serde(default)]
    pub id: Option<String>,
    /// Model that served the request
    #[serde(default)]
    pub model: Option<String>,
    /// Response choices
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Content of the first choice.
    ///
    /// Returns `None` if there are no choices at all, and `Some(None)` if the
    /// first choice has null or missing content.
    pub fn first_content(&self) -> Option<Option<&ResponseContent>> {
        self.choices
            .as_ref()
            .and_then(|choices| choices.first())
            .map(|choice| choice.message.content.as_ref())
    }
}

/// A response choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The message
    pub message: ResponseMessage,
    /// Finish reason
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    /// Role
    #[serde(default)]
    pub role: Option<String>,
    /// Content, null for some refusals
    #[serde(default)]
    pub content: Option<ResponseContent>,
}

/// Content of a response message.
///
/// Providers return either a plain string or a list of typed parts. List
/// elements stay raw so one malformed part cannot fail the whole list; they
/// are decoded into [`ResponsePart`] one by one during extraction. Anything
/// else is kept as raw JSON and coerced to text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResponseContent {
    /// Plain string content.
    Text(String),
    /// A list of parts, undecoded.
    Parts(Vec<Value>),
    /// Any other JSON value.
    Other(Value),
}

/// A part of list-shaped response content.
///
/// Fields are optional so unknown part types do not fail decoding.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResponsePart {
    /// Part type, e.g. "text" or "image_url"
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Text for "text" parts
    #[serde(default)]
    pub text: Option<String>,
    /// Image reference for "image_url" parts
    #[serde(default)]
    pub image_url: Option<ResponseImageUrl>,
}

/// Image reference inside a response part.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ResponseImageUrl {
    /// URL or data URI
    #[serde(default)]
    pub url: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Error details
    pub error: ApiErrorDetails,
}

/// API error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetails {
    /// Error message
    pub message: String,
    /// Error code (numeric or string depending on the provider)
    #[serde(default)]
    pub code: Option<Value>,
}
