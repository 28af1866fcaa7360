//! API Key model and admin request types.
//!
//! Keys are stored as opaque strings and looked up verbatim: the admin panel
//! lists them back to the operator, so they cannot be hashed at rest. Records
//! are never deleted, only banned.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key status granting access.
pub const STATUS_ACTIVE: &str = "active";
/// Key status for soft-deleted (banned) keys.
pub const STATUS_BANNED: &str = "banned";

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `id`: Unique identifier (UUID)
/// - `key_value`: The opaque credential string, globally unique
/// - `user_identifier`: Who the key was issued to (e.g. email or user ID)
/// - `eldorado_email`: Marketplace account email, bindable once by the client
/// - `expiry_date`: Optional expiry; NULL means the key never expires
/// - `created_at`: When the key was issued
/// - `last_used_at`: Updated on every successful authenticated request
/// - `usage_count`: Bumped on every successful authenticated request
/// - `status`: `active` or `banned`
///
/// The record is serialized back to callers as-is (`GET /me`, admin listing),
/// so there is no separate response type.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ApiKey {
    pub id: Uuid,
    pub key_value: String,
    pub user_identifier: String,
    pub eldorado_email: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub usage_count: i64,
    pub status: String,
}

impl ApiKey {
    /// Whether the key status grants access.
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }

    /// Whether the key has an expiry timestamp in the past.
    ///
    /// Keys without an expiry never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < now)
    }
}

/// Generate a fresh credential string for a new key.
///
/// Format: `sk-` followed by 32 hex characters (16 random bytes).
pub fn generate_key_value() -> String {
    let bytes: [u8; 16] = rand::random();
    format!("sk-{}", hex::encode(bytes))
}

/// Compute an expiry timestamp `days` from now.
///
/// Used both at key creation and on admin updates; an update always
/// overwrites any prior expiry.
pub fn expiry_after(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now + Duration::days(days)
}

/// Request body for `POST /admin/keys`.
///
/// `days_valid` absent means the key never expires.
#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    pub user_identifier: String,
    pub days_valid: Option<i64>,
}

/// Request body for `PUT /admin/keys/{id}`.
///
/// Every field is optional; only present fields are applied. A present but
/// blank `eldorado_email` clears the binding.
#[derive(Debug, Deserialize)]
pub struct UpdateKeyRequest {
    pub status: Option<String>,
    pub days_valid: Option<i64>,
    pub eldorado_email: Option<String>,
}

/// Request body for the client-facing `POST /bind-email`.
#[derive(Debug, Deserialize)]
pub struct BindEmailRequest {
    pub eldorado_email: String,
}

/// Pagination query for `GET /admin/keys`.
#[derive(Debug, Deserialize)]
pub struct ListKeysQuery {
    #[serde(default)]
    pub skip: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(status: &str, expiry: Option<DateTime<Utc>>) -> ApiKey {
        ApiKey {
            id: Uuid::new_v4(),
            key_value: generate_key_value(),
            user_identifier: "tester".to_string(),
            eldorado_email: None,
            expiry_date: expiry,
            created_at: Utc::now(),
            last_used_at: None,
            usage_count: 0,
            status: status.to_string(),
        }
    }

    #[test]
    fn generated_key_has_prefix_and_length() {
        let value = generate_key_value();
        assert!(value.starts_with("sk-"));
        assert_eq!(value.len(), 3 + 32);
        assert!(value[3..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_keys_are_unique() {
        assert_ne!(generate_key_value(), generate_key_value());
    }

    #[test]
    fn active_status_check() {
        assert!(key(STATUS_ACTIVE, None).is_active());
        assert!(!key(STATUS_BANNED, None).is_active());
        assert!(!key("suspended", None).is_active());
    }

    #[test]
    fn key_without_expiry_never_expires() {
        let now = Utc::now();
        assert!(!key(STATUS_ACTIVE, None).is_expired(now));
    }

    #[test]
    fn key_with_past_expiry_is_expired() {
        let now = Utc::now();
        assert!(key(STATUS_ACTIVE, Some(now - Duration::hours(1))).is_expired(now));
        assert!(!key(STATUS_ACTIVE, Some(now + Duration::hours(1))).is_expired(now));
    }

    #[test]
    fn expiry_after_adds_whole_days() {
        let now = Utc::now();
        let expiry = expiry_after(now, 7);
        assert_eq!(expiry - now, Duration::days(7));
    }
}
