//! Marketplace Assistant API - Main Application Entry Point
//!
//! This is the client/admin-facing REST server. It validates API keys,
//! forwards item screenshots to a vision model for structured extraction,
//! serves aggregated market prices via the scraper service, and exposes an
//! admin panel for key and config management.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: stored API keys for clients, a shared secret for admins
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

use tracing_subscriber::EnvFilter;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use eldorado_assistant::{config, db, handlers, middleware, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = AppState::new(pool, config);

    // Client routes, gated by the API key access guard
    let client_routes = Router::new()
        .route("/me", get(handlers::client::me))
        .route("/bind-email", post(handlers::client::bind_email))
        .route("/analyze", post(handlers::client::analyze_image))
        .route("/market", get(handlers::client::market_prices))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_api_key,
        ));

    // Admin routes, gated by the shared-secret guard instead
    let admin_routes = Router::new()
        .route("/admin/login", post(handlers::admin::login))
        .route(
            "/admin/change-password",
            post(handlers::admin::change_password),
        )
        .route(
            "/admin/keys",
            post(handlers::admin::create_key).get(handlers::admin::list_keys),
        )
        .route(
            "/admin/keys/{id}",
            put(handlers::admin::update_key).delete(handlers::admin::ban_key),
        )
        .route("/admin/config", get(handlers::admin::get_config))
        .route("/admin/config/{key}", put(handlers::admin::update_config))
        .route("/admin/llm-status", get(handlers::admin::llm_status))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::admin::require_admin_secret,
        ));

    let app = Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        // Merge guarded route groups
        .merge(client_routes)
        .merge(admin_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Browser extension clients call from arbitrary origins
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Bind to network address and start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, app).await?;

    Ok(())
}
