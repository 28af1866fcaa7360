//! Marketplace assistant backend for Eldorado trading.
//!
//! The crate builds two binaries that share this library:
//!
//! - `api`: the client/admin-facing REST server. It issues and validates
//!   API keys, forwards screenshots to a vision model for item extraction,
//!   and serves aggregated market prices.
//! - `scraper`: a standalone HTTP service that drives a headless browser
//!   against the marketplace search page and returns raw offer listings.
//!
//! The `api` server never talks to the browser directly; it only consumes
//! the scraper service over HTTP, so the fragile DOM-facing code stays
//! isolated in `scrape`.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod scrape;
pub mod services;
pub mod state;
