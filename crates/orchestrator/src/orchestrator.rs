//! The chat-completion pipeline.

use std::env;

use openrouter_client::{translate, ChatCompletionRequest, UpstreamError};
use persona_core::{hash_prompt, ChatReply, ChatRequest, PersonaIdentity, PersonaPromptBuilder};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::ChatError;
use crate::model_selection::{normalize_model, resolve_model, FALLBACK_MODEL};
use crate::quota::{QuotaLedger, DEFAULT_TRIAL_LIMIT, PLACEHOLDER_KEY};
use crate::store::{ChatBackend, PersonaStore, SessionStore};

/// Configuration for the [`ChatOrchestrator`].
#[derive(Clone)]
pub struct OrchestratorConfig {
    /// Shared key funding trial prompts.
    pub trial_api_key: Option<String>,
    /// Trial prompts per session.
    pub trial_limit: u32,
    /// Model used when nothing else is configured.
    pub fallback_model: String,
    /// Who the persona is.
    pub persona: PersonaIdentity,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            trial_api_key: None,
            trial_limit: DEFAULT_TRIAL_LIMIT,
            fallback_model: FALLBACK_MODEL.to_string(),
            persona: PersonaIdentity::default(),
        }
    }
}

impl std::fmt::Debug for OrchestratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorConfig")
            .field("trial_api_key", &self.trial_api_key.as_ref().map(|_| "<set>"))
            .field("trial_limit", &self.trial_limit)
            .field("fallback_model", &self.fallback_model)
            .field("persona", &self.persona.name)
            .finish()
    }
}

impl OrchestratorConfig {
    /// Create configuration from environment variables.
    ///
    /// - `OPENROUTER_API_KEY` - shared trial key (optional; chat fails with
    ///   500 for trial sessions when unset)
    /// - `TRIAL_PROMPT_LIMIT` - trial prompts per session (default: 100)
    /// - `FALLBACK_MODEL` - last-resort model (default: qwen/qwen-2-72b-instruct)
    /// - `PERSONA_NAME` - persona name (default: Luis García with namesake
    ///   clarifications)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let trial_api_key = env::var("OPENROUTER_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let trial_limit = env::var("TRIAL_PROMPT_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.trial_limit);

        let fallback_model = env::var("FALLBACK_MODEL")
            .ok()
            .and_then(|m| normalize_model(Some(&m)))
            .unwrap_or(defaults.fallback_model);

        let persona = env::var("PERSONA_NAME")
            .ok()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .map(PersonaIdentity::new)
            .unwrap_or(defaults.persona);

        Self {
            trial_api_key,
            trial_limit,
            fallback_model,
            persona,
        }
    }
}

/// Runs chat completions and the session/model actions around them.
///
/// Generic over its three seams so tests can swap in fakes.
pub struct ChatOrchestrator<B, P, S> {
    backend: B,
    persona: P,
    sessions: S,
    ledger: QuotaLedger,
    prompt_builder: PersonaPromptBuilder,
    config: OrchestratorConfig,
}

impl<B, P, S> ChatOrchestrator<B, P, S>
where
    B: ChatBackend,
    P: PersonaStore,
    S: SessionStore,
{
    /// Create a new orchestrator.
    pub fn new(backend: B, persona: P, sessions: S, config: OrchestratorConfig) -> Self {
        info!(
            trial_limit = config.trial_limit,
            fallback_model = %config.fallback_model,
            persona = %config.persona.name,
            trial_key_configured = config.trial_api_key.is_some(),
            "Chat orchestrator initialized"
        );

        Self {
            backend,
            persona,
            sessions,
            ledger: QuotaLedger::new(config.trial_limit),
            prompt_builder: PersonaPromptBuilder::new(config.persona.clone()),
            config,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Get the persona store.
    pub fn persona(&self) -> &P {
        &self.persona
    }

    /// Run one chat completion for a session.
    ///
    /// `body` is the raw request JSON. The trial count is only touched after
    /// a reply with text or an image has been extracted.
    pub async fn complete(&self, session_id: &str, body: &Value) -> Result<ChatReply, ChatError> {
        let request =
            ChatRequest::from_json(body).map_err(|e| ChatError::InvalidRequest(e.to_string()))?;

        let session = self.sessions.load(session_id).await?;
        let model = self.model_for(session.selected_model.as_deref()).await;
        let resolved = self
            .ledger
            .resolve_key(&session, self.config.trial_api_key.as_deref())?;

        let facts = self.persona.memory_facts().await?;
        let instructions = self.persona.instructions().await?;
        let prompt = self
            .prompt_builder
            .build(facts.as_slice(), instructions.as_slice());

        info!(
            model = %model,
            used_trial = resolved.used_trial,
            prompt_count = session.prompt_count,
            facts = facts.len(),
            instructions = instructions.len(),
            prompt_hash = %hash_prompt(&prompt),
            "Relaying chat request"
        );
        debug!("System prompt:\n{}", prompt);

        let upstream = ChatCompletionRequest {
            model: model.clone(),
            messages: translate::to_upstream(&prompt, &request.contents),
        };

        let response = self
            .backend
            .complete(&resolved.key, &upstream)
            .await
            .map_err(|e| chat_error_from_upstream(e, &model))?;

        let content = response.first_content().ok_or_else(|| {
            error!(model = %model, "Upstream response has no choices");
            ChatError::InvalidResponse
        })?;

        let extracted = translate::extract_reply(content);
        if extracted.is_empty() {
            error!(model = %model, "No text or image in upstream response");
            return Err(ChatError::ExtractionFailure);
        }

        // The reply is still returned; this prompt goes uncounted.
        if let Err(err) = self
            .ledger
            .record_success(&self.sessions, session_id, resolved.used_trial)
            .await
        {
            error!(
                session_id,
                model = %model,
                error = %err,
                uncounted_trial_prompts = 1u64,
                "Failed to record trial prompt"
            );
        }

        let text = extracted
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(ChatReply::success(text, extracted.image))
    }

    /// The model a session's next request would use.
    pub async fn current_model(&self, session_id: &str) -> Result<String, ChatError> {
        let session = self.sessions.load(session_id).await?;
        Ok(self.model_for(session.selected_model.as_deref()).await)
    }

    /// Set the session's model override. Returns the stored identifier.
    pub async fn select_model(
        &self,
        session_id: &str,
        model: Option<&str>,
    ) -> Result<String, ChatError> {
        let model = normalize_model(model)
            .ok_or_else(|| ChatError::InvalidRequest("Model identifier cannot be empty.".into()))?;

        self.sessions.set_selected_model(session_id, &model).await?;

        info!(model = %model, "Updated session model");
        Ok(model)
    }

    /// Save or clear the caller's own key. Returns whether a key is stored.
    pub async fn save_user_key(
        &self,
        session_id: &str,
        key: Option<&str>,
    ) -> Result<bool, ChatError> {
        let stored = self
            .ledger
            .set_user_key(&self.sessions, session_id, key)
            .await?;

        info!(stored, "Saved user API key setting");
        Ok(stored)
    }

    /// Overwrite the global default model. Returns the stored identifier.
    pub async fn update_default_model(&self, model: Option<&str>) -> Result<String, ChatError> {
        let model = normalize_model(model).ok_or_else(|| {
            ChatError::InvalidRequest("Global default model identifier cannot be empty.".into())
        })?;

        self.persona.set_default_model(&model).await?;

        info!(model = %model, "Updated global default model");
        Ok(model)
    }

    /// List upstream models using the shared key.
    pub async fn available_models(&self) -> Result<Vec<Value>, ChatError> {
        let key = self
            .config
            .trial_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty() && *k != PLACEHOLDER_KEY)
            .ok_or_else(|| {
                error!("Server trial API key needed for model listing is not configured");
                ChatError::ServerKeyMisconfigured
            })?;

        self.backend.list_models(key).await.map_err(|e| match e {
            UpstreamError::RateLimited { message } => ChatError::Upstream {
                status: 429,
                message,
            },
            UpstreamError::Status { status, message } => ChatError::Upstream { status, message },
            UpstreamError::InvalidResponse(_) => ChatError::InvalidResponse,
            UpstreamError::Timeout => ChatError::Network("timed out".to_string()),
            UpstreamError::Network(detail) | UpstreamError::Configuration(detail) => {
                ChatError::Network(detail)
            }
        })
    }

    async fn model_for(&self, session_model: Option<&str>) -> String {
        let global = match self.persona.default_model().await {
            Ok(model) => model,
            Err(err) => {
                warn!(error = %err, "Failed to read global default model, using fallback");
                None
            }
        };

        resolve_model(session_model, global.as_deref(), &self.config.fallback_model)
    }
}

fn chat_error_from_upstream(err: UpstreamError, model: &str) -> ChatError {
    match err {
        UpstreamError::RateLimited { message } => {
            warn!(model, "Upstream rate limit");
            ChatError::RateLimited {
                model: model.to_string(),
                message,
            }
        }
        UpstreamError::Status { status, message } => ChatError::Upstream { status, message },
        UpstreamError::InvalidResponse(detail) => {
            error!(detail = %detail, "Undecodable upstream response");
            ChatError::InvalidResponse
        }
        UpstreamError::Timeout => {
            error!(model, "Upstream request timed out");
            ChatError::Timeout
        }
        UpstreamError::Network(detail) | UpstreamError::Configuration(detail) => {
            error!(detail = %detail, "Failed to reach upstream");
            ChatError::Network(detail)
        }
    }
}
