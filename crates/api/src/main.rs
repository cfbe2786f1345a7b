//! HTTP front for the persona chat relay.
//!
//! Serves the chat, memory and instruction APIs plus the browser front-end.

mod auth;
mod config;
mod error;
mod routes;
mod session;
mod state;

use database::{session as session_store, setting, training_instruction, Database};
use openrouter_client::OpenRouterClient;
use orchestrator::{ChatOrchestrator, OrchestratorConfig, SEED_DEFAULT_MODEL};
use persona_core::SEED_INSTRUCTIONS;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::{AdminCredentials, AppState, CookieSettings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting persona relay");
    if config.uses_default_credentials() {
        warn!("Admin credentials are the defaults; set ADMIN_USERNAME and ADMIN_PASSWORD");
    }

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;
    prepare_database(&db, config.session_max_age_days).await?;

    // Build the chat pipeline
    let client = OpenRouterClient::from_env()?;
    let orchestrator_config = OrchestratorConfig::from_env();
    if orchestrator_config.trial_api_key.is_none() {
        warn!("OPENROUTER_API_KEY is not set; trial sessions will fail until it is configured");
    }
    let orchestrator = ChatOrchestrator::new(client, db.clone(), db.clone(), orchestrator_config);

    // Build application state
    let state = AppState::new(
        db,
        orchestrator,
        AdminCredentials {
            username: config.admin_username.clone(),
            password: config.admin_password.clone(),
        },
        CookieSettings {
            secure: config.secure_cookies,
            max_age_days: config.session_max_age_days,
        },
    );

    // Build router
    let app = routes::app(state, &config.static_dir);

    // Start server
    info!(addr = %config.addr, static_dir = %config.static_dir.display(), "Persona relay listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Seed settings and instructions, and drop stale sessions.
async fn prepare_database(db: &Database, session_max_age_days: u32) -> database::Result<()> {
    let pool = db.pool();

    if setting::insert_setting_if_missing(pool, setting::DEFAULT_MODEL_KEY, SEED_DEFAULT_MODEL)
        .await?
    {
        info!(model = SEED_DEFAULT_MODEL, "Initialized global default model");
    }

    training_instruction::seed_missing(pool, SEED_INSTRUCTIONS).await?;

    let pruned = session_store::prune_sessions(pool, session_max_age_days).await?;
    if pruned > 0 {
        info!(pruned, "Pruned stale sessions");
    }

    Ok(())
}
