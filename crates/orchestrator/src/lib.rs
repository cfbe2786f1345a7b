//! Chat-completion pipeline for the persona relay.
//!
//! This crate provides the [`ChatOrchestrator`], which turns a browser chat
//! request into one upstream completion and a normalized reply.
//!
//! # Pipeline
//!
//! ```text
//! request body
//!      ↓
//! ┌────────────────────────────────────────────────────────┐
//! │                    ORCHESTRATOR                        │
//! │                                                        │
//! │  1. Validate `contents`                                │
//! │  2. Resolve model (session → global → fallback)        │
//! │  3. Resolve key (own key, or trial key under limit)    │
//! │  4. Build system prompt from facts and instructions    │
//! │  5. Translate messages to the upstream schema          │
//! │  6. Call upstream and map failures                     │
//! │  7. Extract text and image                             │
//! │  8. Count the trial prompt on success                  │
//! └────────────────────────────────────────────────────────┘
//!      ↓
//! {responseText, imageData, error}
//! ```
//!
//! State lives behind three traits: [`PersonaStore`], [`SessionStore`] and
//! [`ChatBackend`]. The database crate and the OpenRouter client implement
//! them for production use.
//!
//! # Example
//!
//! ```rust,no_run
//! use database::Database;
//! use openrouter_client::OpenRouterClient;
//! use orchestrator::{ChatOrchestrator, OrchestratorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:persona.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let client = OpenRouterClient::from_env()?;
//!     let orchestrator =
//!         ChatOrchestrator::new(client, db.clone(), db, OrchestratorConfig::from_env());
//!
//!     let body = serde_json::json!({
//!         "contents": [{"role": "user", "parts": [{"text": "Hola!"}]}]
//!     });
//!     let reply = orchestrator.complete("session-id", &body).await?;
//!     println!("{:?}", reply.response_text);
//!     Ok(())
//! }
//! ```

mod error;
mod model_selection;
mod orchestrator;
mod quota;
mod store;

pub use error::{ChatError, StoreError};
pub use model_selection::{normalize_model, resolve_model, FALLBACK_MODEL, SEED_DEFAULT_MODEL};
pub use orchestrator::{ChatOrchestrator, OrchestratorConfig};
pub use quota::{QuotaLedger, ResolvedKey, SessionState, DEFAULT_TRIAL_LIMIT, PLACEHOLDER_KEY};
pub use store::{ChatBackend, PersonaStore, SessionStore};

// Re-export commonly used types from dependencies
pub use persona_core::{ChatReply, InlineData};
