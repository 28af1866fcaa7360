//! Access to the `config` key-value table.
//!
//! The table holds runtime secrets and settings with upsert semantics: a row
//! is created lazily on first write, and a missing row falls back to a
//! hardcoded default where one exists.

use crate::{db::DbPool, error::AppError, models::config_entry::ConfigEntry};

/// Config key holding the admin shared secret.
pub const ADMIN_SECRET: &str = "ADMIN_SECRET";

/// Config key holding the vision model provider credential.
pub const LLM_API_KEY: &str = "LLM_API_KEY";

/// Fallback admin secret used until the row is first written.
pub const DEFAULT_ADMIN_SECRET: &str = "admin-secret-123";

/// Fetch a config value, `None` when the row does not exist.
pub async fn get(pool: &DbPool, key: &str) -> Result<Option<String>, AppError> {
    let value = sqlx::query_scalar::<_, String>("SELECT value FROM config WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value)
}

/// The current admin shared secret, falling back to the default when the
/// `ADMIN_SECRET` row has never been written.
pub async fn admin_secret(pool: &DbPool) -> Result<String, AppError> {
    Ok(get(pool, ADMIN_SECRET)
        .await?
        .unwrap_or_else(|| DEFAULT_ADMIN_SECRET.to_string()))
}

/// Insert or overwrite a config row, returning the stored row.
pub async fn upsert(pool: &DbPool, key: &str, value: &str) -> Result<ConfigEntry, AppError> {
    let entry = sqlx::query_as::<_, ConfigEntry>(
        r#"
        INSERT INTO config (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
        RETURNING key, value
        "#,
    )
    .bind(key)
    .bind(value)
    .fetch_one(pool)
    .await?;

    Ok(entry)
}

/// All config rows, for the admin panel.
pub async fn list(pool: &DbPool) -> Result<Vec<ConfigEntry>, AppError> {
    let entries =
        sqlx::query_as::<_, ConfigEntry>("SELECT key, value FROM config ORDER BY key")
            .fetch_all(pool)
            .await?;

    Ok(entries)
}
