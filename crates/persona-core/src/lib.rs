//! Core types for the persona chat relay.
//!
//! This crate holds the pieces shared by every other crate in the workspace:
//!
//! - [`ChatRequest`] / [`ChatMessage`] / [`Part`] - the inbound wire contract
//! - [`ChatReply`] / [`InlineData`] - the normalized response returned to callers
//! - [`PersonaPromptBuilder`] - renders memory facts and instructions into a system prompt
//! - [`SEED_INSTRUCTIONS`] - the built-in instruction set seeded at startup
//!
//! # Example
//!
//! ```rust
//! use persona_core::{PersonaIdentity, PersonaPromptBuilder};
//!
//! let builder = PersonaPromptBuilder::new(PersonaIdentity::default());
//! let prompt = builder.build(&["Born in Seville"], &["Keep answers short"]);
//! assert!(prompt.contains("=== Key Facts About You ==="));
//! ```

mod message;
mod prompt;
mod reply;
mod seed;

pub use message::{ChatMessage, ChatRequest, InlineData, Part, RequestError};
pub use prompt::{hash_prompt, PersonaIdentity, PersonaPromptBuilder};
pub use reply::ChatReply;
pub use seed::SEED_INSTRUCTIONS;
