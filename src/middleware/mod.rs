//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! They can:
//! - Authenticate requests
//! - Short-circuit requests (reject unauthorized)

/// Admin shared-secret guard
pub mod admin;
/// API key authentication middleware
pub mod auth;
