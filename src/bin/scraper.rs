//! Marketplace Scraper Service - Entry Point
//!
//! A small standalone HTTP service that drives a headless browser against
//! the marketplace search page and returns raw offer listings. The api
//! server consumes it over HTTP so the DOM-facing code never runs in the
//! request path of the main backend.
//!
//! No database, no credentials: the only state is the listen port.

use axum::{Json, Router, extract::Query, routing::get};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use eldorado_assistant::{
    config::ScraperConfig,
    models::offer::{MarketFilters, ScrapedOffer},
    scrape,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ScraperConfig::from_env()?;

    let app = Router::new()
        .route("/", get(root))
        .route("/search", get(search))
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.scraper_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Scraper service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Liveness probe.
async fn root() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Eldorado scraper service is running"
    }))
}

/// Search the marketplace with the given filters.
///
/// # Endpoint
///
/// `GET /search?ms_rate&mutations&category&item_name`
///
/// Returns the scraped offer triples. An empty array is a normal response:
/// it covers both "no matching listings" and a failed scrape (failures are
/// logged server-side, not surfaced).
async fn search(Query(filters): Query<MarketFilters>) -> Json<Vec<ScrapedOffer>> {
    tracing::info!("Received search request for filters: {filters:?}");

    let results = scrape::fetch_search_results(&filters).await;

    tracing::info!("Returning {} results", results.len());
    Json(results)
}
