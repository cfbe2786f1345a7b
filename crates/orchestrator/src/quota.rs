//! Trial quota and API key resolution.

use tracing::{info, warn};

use crate::error::{ChatError, StoreError};
use crate::store::SessionStore;

/// Placeholder shipped in sample configs; never a usable key.
pub const PLACEHOLDER_KEY: &str = "YOUR_OPENROUTER_API_KEY_HERE";

/// Number of completions a session may fund with the shared key.
pub const DEFAULT_TRIAL_LIMIT: u32 = 100;

/// Per-session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The caller's own key.
    pub user_api_key: Option<String>,
    /// Session model override.
    pub selected_model: Option<String>,
    /// Completions funded by the shared trial key.
    pub prompt_count: u32,
}

/// The key chosen for one upstream call.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    /// The API key to send.
    pub key: String,
    /// Whether the shared trial key was chosen.
    pub used_trial: bool,
}

// Keys stay out of debug output.
impl std::fmt::Debug for ResolvedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedKey")
            .field("key", &"<redacted>")
            .field("used_trial", &self.used_trial)
            .finish()
    }
}

/// Decides which key funds a call and tracks trial usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaLedger {
    trial_limit: u32,
}

impl Default for QuotaLedger {
    fn default() -> Self {
        Self::new(DEFAULT_TRIAL_LIMIT)
    }
}

impl QuotaLedger {
    /// Create a ledger with the given trial limit.
    pub fn new(trial_limit: u32) -> Self {
        Self { trial_limit }
    }

    /// The trial limit.
    pub fn trial_limit(&self) -> u32 {
        self.trial_limit
    }

    /// Pick the key for a call.
    ///
    /// The caller's own key wins. Without one, the shared key is used while
    /// the session is under the trial limit.
    pub fn resolve_key(
        &self,
        session: &SessionState,
        server_key: Option<&str>,
    ) -> Result<ResolvedKey, ChatError> {
        if let Some(user_key) = session.user_api_key.as_deref() {
            if !is_usable_key(user_key) {
                return Err(ChatError::UserKeyInvalid);
            }
            return Ok(ResolvedKey {
                key: user_key.to_string(),
                used_trial: false,
            });
        }

        if session.prompt_count >= self.trial_limit {
            info!(
                prompt_count = session.prompt_count,
                limit = self.trial_limit,
                "Trial limit reached"
            );
            return Err(ChatError::QuotaExceeded {
                limit: self.trial_limit,
            });
        }

        match server_key {
            Some(key) if is_usable_key(key) => Ok(ResolvedKey {
                key: key.to_string(),
                used_trial: true,
            }),
            _ => Err(ChatError::ServerKeyMisconfigured),
        }
    }

    /// Count a successful completion against the trial.
    ///
    /// Does nothing unless the shared key was used. Returns the new count.
    pub async fn record_success<S: SessionStore + ?Sized>(
        &self,
        sessions: &S,
        session_id: &str,
        used_trial: bool,
    ) -> Result<Option<u32>, StoreError> {
        if !used_trial {
            return Ok(None);
        }

        let count = sessions.increment_prompt_count(session_id).await?;
        info!(prompt_count = count, limit = self.trial_limit, "Recorded trial prompt");
        Ok(Some(count))
    }

    /// Save or clear the caller's own key.
    ///
    /// A non-blank key is stored trimmed and resets the trial count. A blank or
    /// missing key clears the stored key and keeps the count. Returns whether a
    /// key is now stored.
    pub async fn set_user_key<S: SessionStore + ?Sized>(
        &self,
        sessions: &S,
        session_id: &str,
        key: Option<&str>,
    ) -> Result<bool, StoreError> {
        match key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => {
                sessions.set_user_key(session_id, key).await?;
                Ok(true)
            }
            None => {
                if sessions.clear_user_key(session_id).await? {
                    warn!("Cleared user API key");
                }
                Ok(false)
            }
        }
    }
}

fn is_usable_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_KEY
}
