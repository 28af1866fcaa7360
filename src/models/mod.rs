//! Data models: database entities and API request/response types.

/// API key credential model
pub mod api_key;
/// Key-value configuration rows
pub mod config_entry;
/// Vision model extraction result
pub mod extraction;
/// Marketplace offers, filters, and the aggregated summary
pub mod offer;
