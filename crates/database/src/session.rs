//! Client session storage.
//!
//! A session row is created lazily on the first write; reading an unknown
//! session yields `None` and callers treat that as an empty session.

use sqlx::SqlitePool;

use crate::models::Session;
use crate::Result;

/// Get a session by ID.
pub async fn get_session(pool: &SqlitePool, session_id: &str) -> Result<Option<Session>> {
    let record = sqlx::query_as::<_, Session>(
        r#"
        SELECT session_id, user_api_key, selected_model, prompt_count, created_at, updated_at
        FROM sessions
        WHERE session_id = ?
        "#,
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Set a session's model override, creating the session if needed.
///
/// Only `selected_model` is written.
pub async fn set_selected_model(pool: &SqlitePool, session_id: &str, model: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sessions (session_id, selected_model)
        VALUES (?, ?)
        ON CONFLICT(session_id) DO UPDATE SET
            selected_model = excluded.selected_model,
            updated_at = datetime('now')
        "#,
    )
    .bind(session_id)
    .bind(model)
    .execute(pool)
    .await?;

    Ok(())
}

/// Store the caller's own key and reset the trial count.
pub async fn set_user_api_key(pool: &SqlitePool, session_id: &str, api_key: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sessions (session_id, user_api_key, prompt_count)
        VALUES (?, ?, 0)
        ON CONFLICT(session_id) DO UPDATE SET
            user_api_key = excluded.user_api_key,
            prompt_count = 0,
            updated_at = datetime('now')
        "#,
    )
    .bind(session_id)
    .bind(api_key)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove the caller's own key. The trial count is left alone.
///
/// Returns whether a key was stored.
pub async fn clear_user_api_key(pool: &SqlitePool, session_id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE sessions
        SET user_api_key = NULL, updated_at = datetime('now')
        WHERE session_id = ? AND user_api_key IS NOT NULL
        "#,
    )
    .bind(session_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Atomically add one to a session's prompt count and return the new value.
///
/// Creates the session with a count of 1 if it does not exist.
pub async fn increment_prompt_count(pool: &SqlitePool, session_id: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO sessions (session_id, prompt_count)
        VALUES (?, 1)
        ON CONFLICT(session_id) DO UPDATE SET
            prompt_count = prompt_count + 1,
            updated_at = datetime('now')
        RETURNING prompt_count
        "#,
    )
    .bind(session_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Delete sessions not updated within the given number of days.
///
/// Returns the number of removed sessions.
pub async fn prune_sessions(pool: &SqlitePool, older_than_days: u32) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE updated_at < datetime('now', ?)
        "#,
    )
    .bind(format!("-{} days", older_than_days))
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
