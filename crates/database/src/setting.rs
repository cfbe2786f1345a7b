//! Named application settings.

use sqlx::SqlitePool;

use crate::Result;

/// Key of the global default model setting.
pub const DEFAULT_MODEL_KEY: &str = "default_model";

/// Get a setting value, `None` if the row is missing or NULL.
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> = sqlx::query_scalar(
        r#"
        SELECT setting_value
        FROM app_settings
        WHERE setting_key = ?
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(value.flatten())
}

/// Create or overwrite a setting.
pub async fn upsert_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO app_settings (setting_key, setting_value)
        VALUES (?, ?)
        ON CONFLICT(setting_key) DO UPDATE SET
            setting_value = excluded.setting_value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert a setting only if it does not exist yet.
///
/// Returns `true` if the row was created.
pub async fn insert_setting_if_missing(pool: &SqlitePool, key: &str, value: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO app_settings (setting_key, setting_value)
        VALUES (?, ?)
        ON CONFLICT(setting_key) DO NOTHING
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
