//! SQLite persistence layer for the persona chat relay.
//!
//! This crate provides async database operations for memory facts, training
//! instructions, application settings and client sessions using SQLx with
//! SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, memory_fact};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:persona.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Store a fact about the persona
//!     let fact = memory_fact::create_fact(db.pool(), "Grew up in Seville").await?;
//!     println!("stored fact {}", fact.id);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory_fact;
pub mod models;
pub mod session;
pub mod setting;
pub mod training_instruction;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{MemoryFact, Session, TrainingInstruction};
pub use setting::DEFAULT_MODEL_KEY;
pub use training_instruction::SeedReport;
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/persona.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing, keep a single connection)
    /// let db = database::Database::connect_with_pool_size("sqlite::memory:", 1).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEEDS: &[&str] = &["Stay in character.", "Never mention being an AI."];

    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_memory_fact_crud() {
        let db = test_db().await;

        // Create
        let fact = memory_fact::create_fact(db.pool(), "Born in Seville")
            .await
            .unwrap();
        assert_eq!(fact.fact_text, "Born in Seville");

        // Read
        let fetched = memory_fact::get_fact(db.pool(), fact.id).await.unwrap();
        assert_eq!(fetched, fact);

        // Update
        let updated = memory_fact::update_fact(db.pool(), fact.id, "Born in Madrid")
            .await
            .unwrap();
        assert_eq!(updated.fact_text, "Born in Madrid");

        // List
        memory_fact::create_fact(db.pool(), "Plays guitar").await.unwrap();
        let facts = memory_fact::list_facts(db.pool()).await.unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].fact_text, "Born in Madrid");

        // Delete
        memory_fact::delete_fact(db.pool(), fact.id).await.unwrap();
        let result = memory_fact::get_fact(db.pool(), fact.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_memory_fact_missing_id() {
        let db = test_db().await;

        let update = memory_fact::update_fact(db.pool(), 42, "nope").await;
        assert!(update.unwrap_err().is_not_found());

        let delete = memory_fact::delete_fact(db.pool(), 42).await;
        assert!(delete.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_instruction_visibility() {
        let db = test_db().await;
        let pool = db.pool();

        let visible = training_instruction::create_instruction(pool, "Be kind", false)
            .await
            .unwrap();
        let hidden = training_instruction::create_instruction(pool, "Secret rule", true)
            .await
            .unwrap();

        let listed = training_instruction::list_visible(pool).await.unwrap();
        assert_eq!(listed, vec![visible.clone()]);

        let all = training_instruction::list_all(pool).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[1].is_hidden);

        let toggled = training_instruction::set_hidden(pool, hidden.id, false)
            .await
            .unwrap();
        assert!(!toggled.is_hidden);
        assert_eq!(training_instruction::list_visible(pool).await.unwrap().len(), 2);

        training_instruction::delete_instruction(pool, visible.id)
            .await
            .unwrap();
        let missing = training_instruction::delete_instruction(pool, visible.id).await;
        assert!(missing.unwrap_err().is_not_found());

        let missing = training_instruction::set_hidden(pool, 999, true).await;
        assert!(missing.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = test_db().await;
        let pool = db.pool();

        training_instruction::create_instruction(pool, "Stay in character.", false)
            .await
            .unwrap();

        let first = training_instruction::seed_missing(pool, SEEDS).await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                existing: 1,
                added: 1,
                total: 2
            }
        );

        let second = training_instruction::seed_missing(pool, SEEDS).await.unwrap();
        assert_eq!(second.added, 0);
        assert_eq!(second.total, 2);

        let all = training_instruction::list_all(pool).await.unwrap();
        let texts: Vec<_> = all.iter().map(|i| i.instruction_text.as_str()).collect();
        assert_eq!(texts, vec!["Stay in character.", "Never mention being an AI."]);
        // Existing row keeps its visibility, the seeded one is hidden
        assert!(!all[0].is_hidden);
        assert!(all[1].is_hidden);
    }

    #[tokio::test]
    async fn test_seed_deduplicates_input() {
        let db = test_db().await;
        let report = training_instruction::seed_missing(db.pool(), &["a", "a", "b"])
            .await
            .unwrap();
        assert_eq!(report.added, 2);
        assert_eq!(report.total, 2);
    }

    #[tokio::test]
    async fn test_reset_and_seed() {
        let db = test_db().await;
        let pool = db.pool();

        training_instruction::create_instruction(pool, "custom one", false)
            .await
            .unwrap();
        training_instruction::create_instruction(pool, "custom two", true)
            .await
            .unwrap();

        let (deleted, report) = training_instruction::reset_and_seed(pool, SEEDS)
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(report.existing, 0);
        assert_eq!(report.added, 2);

        let all = training_instruction::list_all(pool).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|i| i.is_hidden));
    }

    #[tokio::test]
    async fn test_settings() {
        let db = test_db().await;
        let pool = db.pool();

        assert_eq!(setting::get_setting(pool, DEFAULT_MODEL_KEY).await.unwrap(), None);

        let created = setting::insert_setting_if_missing(pool, DEFAULT_MODEL_KEY, "a/model")
            .await
            .unwrap();
        assert!(created);
        let created = setting::insert_setting_if_missing(pool, DEFAULT_MODEL_KEY, "b/model")
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(
            setting::get_setting(pool, DEFAULT_MODEL_KEY).await.unwrap(),
            Some("a/model".to_string())
        );

        setting::upsert_setting(pool, DEFAULT_MODEL_KEY, "c/model")
            .await
            .unwrap();
        assert_eq!(
            setting::get_setting(pool, DEFAULT_MODEL_KEY).await.unwrap(),
            Some("c/model".to_string())
        );
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let db = test_db().await;
        let pool = db.pool();

        assert!(session::get_session(pool, "s1").await.unwrap().is_none());

        // Increment creates the row
        assert_eq!(session::increment_prompt_count(pool, "s1").await.unwrap(), 1);
        assert_eq!(session::increment_prompt_count(pool, "s1").await.unwrap(), 2);

        session::set_selected_model(pool, "s1", "x/model").await.unwrap();
        let stored = session::get_session(pool, "s1").await.unwrap().unwrap();
        assert_eq!(stored.selected_model.as_deref(), Some("x/model"));
        assert_eq!(stored.prompt_count, 2);

        // Clearing a key that was never set touches nothing
        assert!(!session::clear_user_api_key(pool, "s1").await.unwrap());

        session::set_user_api_key(pool, "s1", "sk-user").await.unwrap();
        let stored = session::get_session(pool, "s1").await.unwrap().unwrap();
        assert_eq!(stored.user_api_key.as_deref(), Some("sk-user"));
        assert_eq!(stored.selected_model.as_deref(), Some("x/model"));
        assert_eq!(stored.prompt_count, 0);

        assert_eq!(session::increment_prompt_count(pool, "s1").await.unwrap(), 1);
        assert!(session::clear_user_api_key(pool, "s1").await.unwrap());
        let stored = session::get_session(pool, "s1").await.unwrap().unwrap();
        assert!(stored.user_api_key.is_none());
        assert_eq!(stored.selected_model.as_deref(), Some("x/model"));
        assert_eq!(stored.prompt_count, 1);

        // New sessions are created by either setter
        session::set_selected_model(pool, "s2", "a/b").await.unwrap();
        session::set_user_api_key(pool, "s3", "sk-other").await.unwrap();
        assert_eq!(
            session::get_session(pool, "s2").await.unwrap().unwrap().prompt_count,
            0
        );
        assert!(session::get_session(pool, "s3").await.unwrap().unwrap().selected_model.is_none());

        // Nothing is older than a day yet
        assert_eq!(session::prune_sessions(pool, 1).await.unwrap(), 0);
    }
}
