//! Admin shared-secret guard.
//!
//! Admin routes bypass the per-key access guard entirely; they are gated by a
//! static secret carried in the `X-Admin-Secret` header and compared against
//! the `ADMIN_SECRET` config row (with a hardcoded fallback when the row has
//! never been written).

use crate::{error::AppError, services::config_store, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Header carrying the admin shared secret.
pub const ADMIN_SECRET_HEADER: &str = "X-Admin-Secret";

/// Reject requests whose `X-Admin-Secret` header does not match the stored
/// admin secret. No side effects on success.
pub async fn require_admin_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get(ADMIN_SECRET_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::AdminForbidden)?;

    let expected = config_store::admin_secret(&state.db).await?;

    if presented != expected {
        return Err(AppError::AdminForbidden);
    }

    Ok(next.run(request).await)
}
