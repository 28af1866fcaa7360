//! Market price pipeline: fetch raw offers from the scraper service, then
//! normalize, sort, and average their prices.
//!
//! The pipeline is a single pass with no retries. Upstream failures degrade
//! into an empty summary carrying the reason, never into an error response.

use std::time::Duration;

use anyhow::Context;

use crate::models::offer::{MarketFilters, MarketSummary, NormalizedOffer, ScrapedOffer};

/// Upper bound on one call to the scraper service.
const SCRAPER_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetch market data for the given filters and aggregate it.
///
/// An empty filter set short-circuits to an empty summary without any
/// outbound call. Otherwise the scraper service is queried once; on any
/// failure the summary is empty with `error` set, and the failure is logged.
pub async fn fetch_market_prices(
    http: &reqwest::Client,
    scraper_url: &str,
    filters: &MarketFilters,
) -> MarketSummary {
    if filters.is_empty() {
        return MarketSummary::empty();
    }

    match fetch_offers(http, scraper_url, filters).await {
        Ok(offers) => aggregate(offers),
        Err(e) => {
            tracing::error!("Error fetching market prices: {e:#}");
            MarketSummary::degraded(e.to_string())
        }
    }
}

async fn fetch_offers(
    http: &reqwest::Client,
    scraper_url: &str,
    filters: &MarketFilters,
) -> anyhow::Result<Vec<ScrapedOffer>> {
    let offers = http
        .get(scraper_url)
        .query(&filters.present())
        .timeout(SCRAPER_TIMEOUT)
        .send()
        .await
        .context("request to scraper service failed")?
        .error_for_status()
        .context("scraper service returned an error status")?
        .json()
        .await
        .context("scraper service response was not valid JSON")?;

    Ok(offers)
}

/// Normalize a raw price string to a numeric value.
///
/// Every character that is not an ASCII digit or a decimal point is stripped
/// (currency symbols, thousands separators), then the remainder is parsed as
/// a float. Unparseable results are 0.0, not an error.
pub fn normalize_price(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    cleaned.parse().unwrap_or(0.0)
}

/// Normalize, sort, and average a batch of scraped offers.
///
/// Offers are sorted ascending by numeric price with a stable sort, so
/// equal-priced entries (including the zero-priced parse failures) keep
/// their scraped order. The average is the mean over strictly positive
/// prices rounded to two decimals, 0.0 when no positive entry exists.
pub fn aggregate(offers: Vec<ScrapedOffer>) -> MarketSummary {
    let mut items: Vec<NormalizedOffer> = offers
        .into_iter()
        .map(|offer| NormalizedOffer {
            title: offer.title,
            price_val: normalize_price(&offer.price),
            price_raw: offer.price,
            seller: offer.seller,
        })
        .collect();

    // Vec::sort_by is stable
    items.sort_by(|a, b| a.price_val.total_cmp(&b.price_val));

    let positive: Vec<f64> = items
        .iter()
        .map(|item| item.price_val)
        .filter(|v| *v > 0.0)
        .collect();

    let average = if positive.is_empty() {
        0.0
    } else {
        round2(positive.iter().sum::<f64>() / positive.len() as f64)
    };

    MarketSummary {
        items,
        average,
        error: None,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(title: &str, price: &str) -> ScrapedOffer {
        ScrapedOffer {
            title: title.to_string(),
            price: price.to_string(),
            seller: "seller".to_string(),
        }
    }

    #[test]
    fn currency_symbols_and_separators_are_stripped() {
        assert_eq!(normalize_price("¥70,894"), 70894.0);
        assert_eq!(normalize_price("$1,234.56"), 1234.56);
        assert_eq!(normalize_price("1200"), 1200.0);
    }

    #[test]
    fn no_digits_normalizes_to_zero() {
        assert_eq!(normalize_price("N/A"), 0.0);
        assert_eq!(normalize_price(""), 0.0);
        assert_eq!(normalize_price("free!"), 0.0);
    }

    #[test]
    fn multiple_dots_normalize_to_zero() {
        // "1.2.3" survives the character filter but fails the float parse
        assert_eq!(normalize_price("1.2.3"), 0.0);
    }

    #[test]
    fn offers_are_sorted_ascending_by_price() {
        let summary = aggregate(vec![
            offer("c", "¥300"),
            offer("a", "¥100"),
            offer("b", "¥200"),
        ]);
        let titles: Vec<&str> = summary.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn zero_priced_entries_sort_first_in_original_order() {
        let summary = aggregate(vec![
            offer("priced", "¥500"),
            offer("first_zero", "N/A"),
            offer("second_zero", "no price"),
        ]);
        let titles: Vec<&str> = summary.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["first_zero", "second_zero", "priced"]);
    }

    #[test]
    fn average_excludes_zero_entries() {
        let summary = aggregate(vec![
            offer("a", "¥100"),
            offer("b", "N/A"),
            offer("c", "¥200"),
        ]);
        // mean of 100 and 200, the zero entry is excluded from the denominator
        assert_eq!(summary.average, 150.0);
    }

    #[test]
    fn average_is_rounded_to_two_decimals() {
        let summary = aggregate(vec![
            offer("a", "1"),
            offer("b", "1"),
            offer("c", "2"),
        ]);
        assert_eq!(summary.average, 1.33);
    }

    #[test]
    fn empty_and_all_zero_batches_average_zero() {
        assert_eq!(aggregate(Vec::new()).average, 0.0);
        let summary = aggregate(vec![offer("a", "N/A"), offer("b", "-")]);
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.items.len(), 2);
    }

    #[test]
    fn skibidi_toilet_scenario() {
        let summary = aggregate(vec![ScrapedOffer {
            title: "Lava Skibidi Toilet".to_string(),
            price: "¥1,200".to_string(),
            seller: "bob".to_string(),
        }]);
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.items[0].price_val, 1200.0);
        assert_eq!(summary.items[0].price_raw, "¥1,200");
        assert_eq!(summary.items[0].seller, "bob");
        assert_eq!(summary.average, 1200.0);
    }

    #[tokio::test]
    async fn empty_filter_set_short_circuits_without_network() {
        let http = reqwest::Client::new();
        // The URL is unroutable; reaching it would fail, proving no call is made
        let summary = fetch_market_prices(
            &http,
            "http://invalid.localdomain:1/search",
            &MarketFilters::default(),
        )
        .await;
        assert!(summary.items.is_empty());
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.error, None);
    }
}
