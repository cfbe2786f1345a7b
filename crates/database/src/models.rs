//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A fact about the persona, rendered into every system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MemoryFact {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Fact text, trimmed on write.
    pub fact_text: String,
}

/// A behavioural instruction for the persona.
///
/// Hidden instructions are left out of the public listing but are still part
/// of the system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TrainingInstruction {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Instruction text, trimmed on write.
    pub instruction_text: String,
    /// Whether the instruction is excluded from the public listing.
    pub is_hidden: bool,
}

/// Per-client session state.
///
/// Not serializable: it carries the caller's API key.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Session {
    /// Opaque session identifier from the client cookie.
    pub session_id: String,
    /// Caller's own OpenRouter key, if saved.
    pub user_api_key: Option<String>,
    /// Session model override.
    pub selected_model: Option<String>,
    /// Number of completions funded by the shared trial key.
    pub prompt_count: i64,
    /// When the session was created.
    pub created_at: String,
    /// When the session was last updated.
    pub updated_at: String,
}
