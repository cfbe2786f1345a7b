//! OpenRouter client for the persona chat relay.
//!
//! This crate owns everything that touches the upstream provider:
//!
//! - Wire types for the OpenAI-compatible chat-completion API
//! - Translation between the browser's Gemini-style messages and the
//!   upstream schema, in both directions
//! - An HTTP client with per-call timeouts and structured error mapping
//! - Configuration via environment variables or a builder
//!
//! # Usage
//!
//! ```rust,no_run
//! use openrouter_client::{translate, ChatCompletionRequest, OpenRouterClient};
//! use persona_core::ChatMessage;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenRouterClient::from_env()?;
//!
//!     let history = vec![ChatMessage::text("user", "Hola!")];
//!     let request = ChatCompletionRequest {
//!         model: "openai/gpt-3.5-turbo".to_string(),
//!         messages: translate::to_upstream("You are Luis.", &history),
//!     };
//!
//!     let response = client.chat_completion("sk-or-...", &request).await?;
//!     let content = response.first_content().ok_or("no choices")?;
//!     println!("{:?}", translate::extract_reply(content));
//!     Ok(())
//! }
//! ```

mod api_types;
mod client;
mod config;
mod error;
pub mod translate;

pub use api_types::{
    ApiError, ApiErrorDetails, ChatCompletionRequest, ChatCompletionResponse, Choice,
    ContentPart, ImageUrl, MessageContent, ResponseContent, ResponseImageUrl, ResponseMessage,
    ResponsePart, UpstreamMessage, Usage,
};
pub use client::OpenRouterClient;
pub use config::{OpenRouterConfig, OpenRouterConfigBuilder};
pub use error::{error_from_body, UpstreamError};
pub use translate::ExtractedReply;
