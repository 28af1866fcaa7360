//! Key-value configuration rows.
//!
//! The `config` table stores runtime settings and secrets (vision model key,
//! admin shared secret). Absence of a row implies a hardcoded default; rows
//! are created lazily on first write.

use serde::{Deserialize, Serialize};

/// A single configuration row.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

/// Request body for `PUT /admin/config/{key}`.
#[derive(Debug, Deserialize)]
pub struct ConfigUpdate {
    pub value: String,
}

/// Request body for `POST /admin/change-password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}
