//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Credential Errors**: Missing, unknown, banned, or expired API keys
/// - **Admin Authorization Errors**: Wrong shared secret
/// - **Resource Errors**: Requested key not found
/// - **Configuration Errors**: Required secret not present in the config table
/// - **Validation Errors**: Invalid request data
///
/// Upstream provider failures (vision model, marketplace scrape) never appear
/// here: those calls degrade into well-formed fallback payloads instead of
/// failing the request. See `services::extraction` and `services::market`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No credential was supplied in the Authorization header.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Could not validate credentials")]
    MissingCredentials,

    /// The supplied credential does not match any stored key.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API Key")]
    InvalidApiKey,

    /// The key exists but its status is not `active`.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("API Key is banned or inactive")]
    KeyInactive,

    /// The key exists but its expiry timestamp is in the past.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("API Key has expired")]
    KeyExpired,

    /// Admin shared secret missing or wrong.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Not authorized")]
    AdminForbidden,

    /// Presented old password does not match the current admin secret.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Incorrect old password")]
    IncorrectOldPassword,

    /// Requested key record does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Key not found")]
    KeyNotFound,

    /// The key already has a bound marketplace email; binding is one-shot.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Email already bound. Contact admin to change.")]
    EmailAlreadyBound,

    /// The vision model credential is not present in the config table.
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("LLM API key not configured")]
    LlmNotConfigured,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "missing_credentials",
                self.to_string(),
            ),
            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                self.to_string(),
            ),
            AppError::KeyInactive => (StatusCode::FORBIDDEN, "key_inactive", self.to_string()),
            AppError::KeyExpired => (StatusCode::FORBIDDEN, "key_expired", self.to_string()),
            AppError::AdminForbidden => {
                (StatusCode::FORBIDDEN, "not_authorized", self.to_string())
            }
            AppError::IncorrectOldPassword => (
                StatusCode::FORBIDDEN,
                "incorrect_old_password",
                self.to_string(),
            ),
            AppError::KeyNotFound => (StatusCode::NOT_FOUND, "key_not_found", self.to_string()),
            AppError::EmailAlreadyBound => (
                StatusCode::BAD_REQUEST,
                "email_already_bound",
                self.to_string(),
            ),
            AppError::LlmNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "llm_not_configured",
                self.to_string(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Return the response with status code and JSON body
        (status, body).into_response()
    }
}
