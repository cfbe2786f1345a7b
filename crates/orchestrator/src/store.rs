//! Seams between the chat pipeline and its state.
//!
//! The orchestrator only sees these traits. Production wires them to
//! [`database::Database`] and [`OpenRouterClient`]; tests use in-memory fakes.

use async_trait::async_trait;
use database::{memory_fact, session, setting, training_instruction, Database};
use openrouter_client::{
    ChatCompletionRequest, ChatCompletionResponse, OpenRouterClient, UpstreamError,
};
use serde_json::Value;

use crate::error::StoreError;
use crate::quota::SessionState;

/// Read access to the persona's memory and global settings.
#[async_trait]
pub trait PersonaStore: Send + Sync {
    /// All memory fact texts, oldest first.
    async fn memory_facts(&self) -> Result<Vec<String>, StoreError>;

    /// All instruction texts, hidden ones included, oldest first.
    async fn instructions(&self) -> Result<Vec<String>, StoreError>;

    /// The global default model, if set.
    async fn default_model(&self) -> Result<Option<String>, StoreError>;

    /// Overwrite the global default model.
    async fn set_default_model(&self, model: &str) -> Result<(), StoreError>;
}

/// Per-session state keyed by the session cookie.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session; unknown sessions are empty.
    async fn load(&self, session_id: &str) -> Result<SessionState, StoreError>;

    /// Set the session model override. Nothing else is written.
    async fn set_selected_model(&self, session_id: &str, model: &str) -> Result<(), StoreError>;

    /// Store the caller's own key and reset the trial count to zero.
    async fn set_user_key(&self, session_id: &str, api_key: &str) -> Result<(), StoreError>;

    /// Remove the caller's own key, leaving the count as is. Returns whether
    /// a key was stored.
    async fn clear_user_key(&self, session_id: &str) -> Result<bool, StoreError>;

    /// Atomically add one to the trial count and return the new value.
    async fn increment_prompt_count(&self, session_id: &str) -> Result<u32, StoreError>;
}

/// The upstream provider.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run one chat completion with the given key.
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, UpstreamError>;

    /// List models visible to the given key.
    async fn list_models(&self, api_key: &str) -> Result<Vec<Value>, UpstreamError>;
}

#[async_trait]
impl PersonaStore for Database {
    async fn memory_facts(&self) -> Result<Vec<String>, StoreError> {
        let facts = memory_fact::list_facts(self.pool()).await?;
        Ok(facts.into_iter().map(|f| f.fact_text).collect())
    }

    async fn instructions(&self) -> Result<Vec<String>, StoreError> {
        let instructions = training_instruction::list_all(self.pool()).await?;
        Ok(instructions
            .into_iter()
            .map(|i| i.instruction_text)
            .collect())
    }

    async fn default_model(&self) -> Result<Option<String>, StoreError> {
        Ok(setting::get_setting(self.pool(), setting::DEFAULT_MODEL_KEY).await?)
    }

    async fn set_default_model(&self, model: &str) -> Result<(), StoreError> {
        setting::upsert_setting(self.pool(), setting::DEFAULT_MODEL_KEY, model).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for Database {
    async fn load(&self, session_id: &str) -> Result<SessionState, StoreError> {
        let record = session::get_session(self.pool(), session_id).await?;

        Ok(record
            .map(|s| SessionState {
                user_api_key: s.user_api_key,
                selected_model: s.selected_model,
                prompt_count: count_from_db(s.prompt_count),
            })
            .unwrap_or_default())
    }

    async fn set_selected_model(&self, session_id: &str, model: &str) -> Result<(), StoreError> {
        session::set_selected_model(self.pool(), session_id, model).await?;
        Ok(())
    }

    async fn set_user_key(&self, session_id: &str, api_key: &str) -> Result<(), StoreError> {
        session::set_user_api_key(self.pool(), session_id, api_key).await?;
        Ok(())
    }

    async fn clear_user_key(&self, session_id: &str) -> Result<bool, StoreError> {
        Ok(session::clear_user_api_key(self.pool(), session_id).await?)
    }

    async fn increment_prompt_count(&self, session_id: &str) -> Result<u32, StoreError> {
        let count = session::increment_prompt_count(self.pool(), session_id).await?;
        Ok(count_from_db(count))
    }
}

fn count_from_db(count: i64) -> u32 {
    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}

#[async_trait]
impl ChatBackend for OpenRouterClient {
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, UpstreamError> {
        self.chat_completion(api_key, request).await
    }

    async fn list_models(&self, api_key: &str) -> Result<Vec<Value>, UpstreamError> {
        OpenRouterClient::list_models(self, api_key).await
    }
}
