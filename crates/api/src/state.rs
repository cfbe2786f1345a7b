//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use openrouter_client::OpenRouterClient;
use orchestrator::ChatOrchestrator;

/// The production orchestrator: OpenRouter upstream, SQLite for everything else.
pub type Orchestrator = ChatOrchestrator<OpenRouterClient, Database, Database>;

/// Admin basic-auth credentials.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// Session cookie settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieSettings {
    /// Add the `Secure` attribute.
    pub secure: bool,
    /// Cookie lifetime in days.
    pub max_age_days: u32,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Chat pipeline.
    pub orchestrator: Arc<Orchestrator>,
    /// Admin credentials.
    pub admin: Arc<AdminCredentials>,
    /// Session cookie settings.
    pub cookies: CookieSettings,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        orchestrator: Orchestrator,
        admin: AdminCredentials,
        cookies: CookieSettings,
    ) -> Self {
        Self {
            db,
            orchestrator: Arc::new(orchestrator),
            admin: Arc::new(admin),
            cookies,
        }
    }
}
