//! Admin panel endpoints.
//!
//! All handlers here run behind the shared-secret guard. Key issuance,
//! listing, updates, and the soft ban; config reads/writes; secret rotation;
//! and a connectivity probe against the vision model provider.

use std::time::Duration;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        api_key::{
            ApiKey, CreateKeyRequest, ListKeysQuery, STATUS_BANNED, UpdateKeyRequest,
            expiry_after, generate_key_value,
        },
        config_entry::{ChangePasswordRequest, ConfigEntry, ConfigUpdate},
    },
    services::config_store,
    state::AppState,
};

/// Upper bound on the provider connectivity probe.
const LLM_STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Verify the admin secret.
///
/// # Endpoint
///
/// `POST /admin/login`
///
/// The guard already checked the secret; reaching the handler means the
/// login succeeded.
pub async fn login() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Rotate the admin shared secret.
///
/// # Endpoint
///
/// `POST /admin/change-password`
///
/// Requires presenting the current secret as `old_password` even though the
/// guard already validated the header, so a leaked session header alone
/// cannot rotate the secret. Upserts the `ADMIN_SECRET` config row.
pub async fn change_password(
    State(state): State<AppState>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let current = config_store::admin_secret(&state.db).await?;

    if request.old_password != current {
        return Err(AppError::IncorrectOldPassword);
    }

    config_store::upsert(&state.db, config_store::ADMIN_SECRET, &request.new_password).await?;

    Ok(Json(json!({
        "status": "ok",
        "message": "Password changed successfully"
    })))
}

/// Issue a new API key.
///
/// # Endpoint
///
/// `POST /admin/keys`
///
/// Generates a random `sk-` token. `days_valid` absent or zero means the key
/// never expires. The full record, including the key string, is returned here
/// and again on every listing (the admin panel displays keys back to the
/// operator).
pub async fn create_key(
    State(state): State<AppState>,
    Json(request): Json<CreateKeyRequest>,
) -> Result<Json<ApiKey>, AppError> {
    let expiry = request
        .days_valid
        .filter(|days| *days > 0)
        .map(|days| expiry_after(Utc::now(), days));

    let key = sqlx::query_as::<_, ApiKey>(
        r#"
        INSERT INTO api_keys (key_value, user_identifier, expiry_date)
        VALUES ($1, $2, $3)
        RETURNING id, key_value, user_identifier, eldorado_email, expiry_date,
                  created_at, last_used_at, usage_count, status
        "#,
    )
    .bind(generate_key_value())
    .bind(&request.user_identifier)
    .bind(expiry)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(key))
}

/// List issued keys with pagination.
///
/// # Endpoint
///
/// `GET /admin/keys?skip&limit` (defaults: skip 0, limit 100)
pub async fn list_keys(
    State(state): State<AppState>,
    Query(query): Query<ListKeysQuery>,
) -> Result<Json<Vec<ApiKey>>, AppError> {
    let keys = sqlx::query_as::<_, ApiKey>(
        r#"
        SELECT id, key_value, user_identifier, eldorado_email, expiry_date,
               created_at, last_used_at, usage_count, status
        FROM api_keys
        ORDER BY created_at
        OFFSET $1 LIMIT $2
        "#,
    )
    .bind(query.skip)
    .bind(query.limit)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(keys))
}

/// Update a key's status, expiry, or bound email.
///
/// # Endpoint
///
/// `PUT /admin/keys/{id}`
///
/// Only present fields are applied:
/// - `status`: set verbatim (blank ignored)
/// - `days_valid`: expiry becomes now + days, overwriting any prior expiry
/// - `eldorado_email`: set; a blank string clears the binding (admins may
///   rebind freely, unlike the one-shot client endpoint)
pub async fn update_key(
    State(state): State<AppState>,
    Path(key_id): Path<Uuid>,
    Json(request): Json<UpdateKeyRequest>,
) -> Result<Json<ApiKey>, AppError> {
    let mut key = fetch_key(&state, key_id).await?.ok_or(AppError::KeyNotFound)?;

    if let Some(status) = request.status.filter(|s| !s.is_empty()) {
        key.status = status;
    }

    if let Some(days) = request.days_valid {
        key.expiry_date = Some(expiry_after(Utc::now(), days));
    }

    if let Some(email) = request.eldorado_email {
        key.eldorado_email = if email.trim().is_empty() {
            None
        } else {
            Some(email)
        };
    }

    let updated = sqlx::query_as::<_, ApiKey>(
        r#"
        UPDATE api_keys
        SET status = $1, expiry_date = $2, eldorado_email = $3
        WHERE id = $4
        RETURNING id, key_value, user_identifier, eldorado_email, expiry_date,
                  created_at, last_used_at, usage_count, status
        "#,
    )
    .bind(&key.status)
    .bind(key.expiry_date)
    .bind(&key.eldorado_email)
    .bind(key_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// Ban a key.
///
/// # Endpoint
///
/// `DELETE /admin/keys/{id}`
///
/// Exposed as DELETE but deliberately a soft ban: the record is kept with
/// `status = banned` so its usage history survives and the key string can
/// never be reissued to someone else.
pub async fn ban_key(
    State(state): State<AppState>,
    Path(key_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let result = sqlx::query("UPDATE api_keys SET status = $1 WHERE id = $2")
        .bind(STATUS_BANNED)
        .bind(key_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::KeyNotFound);
    }

    Ok(Json(json!({ "message": "Key banned" })))
}

async fn fetch_key(state: &AppState, key_id: Uuid) -> Result<Option<ApiKey>, AppError> {
    let key = sqlx::query_as::<_, ApiKey>(
        r#"
        SELECT id, key_value, user_identifier, eldorado_email, expiry_date,
               created_at, last_used_at, usage_count, status
        FROM api_keys
        WHERE id = $1
        "#,
    )
    .bind(key_id)
    .fetch_optional(&state.db)
    .await?;

    Ok(key)
}

/// List all config rows.
///
/// # Endpoint
///
/// `GET /admin/config`
pub async fn get_config(State(state): State<AppState>) -> Result<Json<Vec<ConfigEntry>>, AppError> {
    Ok(Json(config_store::list(&state.db).await?))
}

/// Create or overwrite a config row.
///
/// # Endpoint
///
/// `PUT /admin/config/{key}`
pub async fn update_config(
    State(state): State<AppState>,
    Path(config_key): Path<String>,
    Json(update): Json<ConfigUpdate>,
) -> Result<Json<ConfigEntry>, AppError> {
    Ok(Json(
        config_store::upsert(&state.db, &config_key, &update.value).await?,
    ))
}

/// Connectivity state of the vision model provider.
#[derive(Debug, Serialize)]
pub struct LlmStatusResponse {
    pub status: String,
    pub message: String,
}

impl LlmStatusResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// Probe the vision model provider.
///
/// # Endpoint
///
/// `GET /admin/llm-status`
///
/// A single lightweight request to the provider's model-listing endpoint
/// with a short timeout. Always 200; the body carries ok/error. Probe
/// failures are mapped to the error message, never to an HTTP error.
pub async fn llm_status(State(state): State<AppState>) -> Result<Json<LlmStatusResponse>, AppError> {
    let Some(llm_key) = config_store::get(&state.db, config_store::LLM_API_KEY)
        .await?
        .filter(|v| !v.is_empty())
    else {
        return Ok(Json(LlmStatusResponse::error("API Key not configured")));
    };

    let response = state
        .http
        .get(format!("{}/models", state.config.llm_base_url))
        .bearer_auth(&llm_key)
        .timeout(LLM_STATUS_TIMEOUT)
        .send()
        .await;

    let status = match response {
        Ok(resp) if resp.status().is_success() => {
            LlmStatusResponse::ok("Connected successfully")
        }
        Ok(resp) => LlmStatusResponse::error(format!("API Error: {}", resp.status().as_u16())),
        Err(e) => LlmStatusResponse::error(e.to_string()),
    };

    Ok(Json(status))
}
