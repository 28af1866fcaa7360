//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Performs business logic (database queries, service calls)
//! 3. Returns HTTP response (JSON, status code)

/// Admin panel endpoints (key management, config, provider status)
pub mod admin;
/// Key-authenticated client endpoints
pub mod client;
/// Health check endpoint
pub mod health;
