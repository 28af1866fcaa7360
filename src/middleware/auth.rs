//! API key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the API key from the Authorization header
//! 2. Look up the matching record and check status and expiry
//! 3. Persist usage stats (last-used timestamp, usage counter)
//! 4. Inject the key record into the request for downstream handlers

use crate::{
    error::AppError,
    models::api_key::ApiKey,
    state::AppState,
};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

/// Strip an optional `Bearer ` prefix from the Authorization header value.
///
/// Clients may send either `Authorization: sk-abc` or
/// `Authorization: Bearer sk-abc`; both carry the same credential.
pub fn strip_bearer(header_value: &str) -> &str {
    header_value.strip_prefix("Bearer ").unwrap_or(header_value)
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Extract the `Authorization` header (401 if absent)
/// 2. Strip the optional `Bearer ` prefix
/// 3. Look up the key record by its stored value (401 if unknown)
/// 4. Reject banned/inactive keys (403) and expired keys (403)
/// 5. Bump `last_used_at` and `usage_count` in a single atomic UPDATE,
///    persisted before the handler runs
/// 6. Insert the refreshed [`ApiKey`] record into request extensions and
///    call the next handler
///
/// An unknown, banned, or expired credential is never authorized regardless
/// of any other field on the record.
pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::MissingCredentials)?;

    let key_value = strip_bearer(auth_header);

    let key = sqlx::query_as::<_, ApiKey>(
        r#"
        SELECT id, key_value, user_identifier, eldorado_email, expiry_date,
               created_at, last_used_at, usage_count, status
        FROM api_keys
        WHERE key_value = $1
        "#,
    )
    .bind(key_value)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::InvalidApiKey)?;

    if !key.is_active() {
        return Err(AppError::KeyInactive);
    }

    if key.is_expired(Utc::now()) {
        return Err(AppError::KeyExpired);
    }

    // Single UPDATE keeps the counter bump atomic under concurrent requests
    let key = sqlx::query_as::<_, ApiKey>(
        r#"
        UPDATE api_keys
        SET last_used_at = NOW(),
            usage_count = usage_count + 1
        WHERE id = $1
        RETURNING id, key_value, user_identifier, eldorado_email, expiry_date,
                  created_at, last_used_at, usage_count, status
        "#,
    )
    .bind(key.id)
    .fetch_one(&state.db)
    .await?;

    // Route handlers can now extract this using Extension<ApiKey>
    request.extensions_mut().insert(key);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bearer_prefix() {
        assert_eq!(strip_bearer("Bearer sk-abc123"), "sk-abc123");
    }

    #[test]
    fn leaves_bare_key_untouched() {
        assert_eq!(strip_bearer("sk-abc123"), "sk-abc123");
    }

    #[test]
    fn prefix_must_match_exactly() {
        // lowercase "bearer" is not a recognized prefix, the whole value is the key
        assert_eq!(strip_bearer("bearer sk-abc123"), "bearer sk-abc123");
    }
}
