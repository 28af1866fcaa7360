//! Marketplace offer types and search filters.
//!
//! Everything here is ephemeral: offers are produced per scrape and discarded
//! after the response is written.

use serde::{Deserialize, Serialize};

/// A single listing exactly as scraped from the marketplace page.
///
/// `price` is the raw display string and may carry currency symbols and
/// thousands separators (e.g. `"¥70,894"`). This is also the wire format of
/// the scraper service's `GET /search` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedOffer {
    pub title: String,
    pub price: String,
    pub seller: String,
}

/// An offer with its price normalized to a numeric value.
///
/// Derived 1:1 from [`ScrapedOffer`]; `price_val` is `0.0` when the raw
/// string holds no parseable number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOffer {
    pub title: String,
    pub price_raw: String,
    pub price_val: f64,
    pub seller: String,
}

/// Response of the market-price endpoint: normalized offers sorted by price
/// plus the mean over positive prices.
///
/// `error` is populated on the degraded path (scraper unreachable, bad
/// payload) so callers can tell "no listings" from "the fetch failed" while
/// the shape stays identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSummary {
    pub items: Vec<NormalizedOffer>,
    pub average: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MarketSummary {
    /// Empty result with zero average, used for the no-filter short-circuit.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            average: 0.0,
            error: None,
        }
    }

    /// Empty result carrying the reason the upstream fetch failed.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            average: 0.0,
            error: Some(reason.into()),
        }
    }
}

/// Optional search parameters constraining a marketplace search.
///
/// Shared between the backend's `GET /market` and the scraper service's
/// `GET /search` query strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketFilters {
    pub ms_rate: Option<String>,
    pub mutations: Option<String>,
    pub category: Option<String>,
    pub item_name: Option<String>,
}

fn has(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

impl MarketFilters {
    /// True when no filter carries a value. An empty filter set short-circuits
    /// the market pipeline without any outbound call.
    pub fn is_empty(&self) -> bool {
        !has(&self.ms_rate) && !has(&self.mutations) && !has(&self.category) && !has(&self.item_name)
    }

    /// The present, non-empty filters as query pairs for the scraper service.
    pub fn present(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(v) = self.ms_rate.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("ms_rate", v));
        }
        if let Some(v) = self.mutations.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("mutations", v));
        }
        if let Some(v) = self.category.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("category", v));
        }
        if let Some(v) = self.item_name.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("item_name", v));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_are_empty() {
        assert!(MarketFilters::default().is_empty());
    }

    #[test]
    fn blank_strings_count_as_absent() {
        let filters = MarketFilters {
            ms_rate: Some(String::new()),
            mutations: None,
            category: Some(String::new()),
            item_name: None,
        };
        assert!(filters.is_empty());
        assert!(filters.present().is_empty());
    }

    #[test]
    fn present_skips_missing_filters() {
        let filters = MarketFilters {
            item_name: Some("Skibidi Toilet".to_string()),
            ..Default::default()
        };
        assert!(!filters.is_empty());
        assert_eq!(filters.present(), vec![("item_name", "Skibidi Toilet")]);
    }
}
