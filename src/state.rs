//! Shared application state for the api server.

use crate::{config::Config, db::DbPool};

/// State handed to every handler and middleware via Axum's `State` extractor.
///
/// Cloning is cheap: the pool and the reqwest client are both handles around
/// shared connection state.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub db: DbPool,

    /// Outbound HTTP client (vision model, scraper service)
    ///
    /// A single client is reused so connections can be pooled. Per-call
    /// timeouts are set on each request builder, not here.
    pub http: reqwest::Client,

    /// Environment-derived settings
    pub config: Config,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self {
            db,
            http: reqwest::Client::new(),
            config,
        }
    }
}
