//! Browser-driven marketplace scraping.
//!
//! The search page hydrates its offer list client-side, so a plain HTTP GET
//! returns an empty shell. Each call launches a headless Chrome session via
//! CDP, waits (bounded) for the offer nodes to appear, and hands the rendered
//! markup to the DOM parser. One browser per call, closed on every exit path,
//! never pooled or reused.
//!
//! This module is the only place that knows the marketplace URL template and
//! selectors; everything upstream consumes it as "filters in, offer triples
//! out" so a markup change stays contained here.

pub mod parse;

use std::time::Duration;

use anyhow::Context;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use url::Url;

use crate::models::offer::{MarketFilters, ScrapedOffer};

/// Marketplace search page for the game's item category.
const SEARCH_PAGE_URL: &str = "https://www.eldorado.gg/steal-a-brainrot-brainrots/i/259";

/// Desktop user agent presented to the marketplace.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Upper bound on page navigation.
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(45);

/// Upper bound on waiting for offer nodes to hydrate. Exceeding it is
/// tolerated: the page is read as-is.
const OFFER_WAIT_TIMEOUT: Duration = Duration::from_secs(20);

/// Settle delay after the offer nodes appear, for final hydration.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Build the marketplace search URL for a filter set.
///
/// Present, non-sentinel filter values map to fixed query parameters:
///
/// - `ms_rate` -> `steal-a-brainrot-ms` (sentinels `"0"` and `"none"` are
///   treated as absent)
/// - `mutations` -> `steal-a-brainrot-mutations` (sentinel `"none"`)
/// - `category`/`item_name` -> the filter-tree triple `te_v0=Brainrot`,
///   `te_v1=<category>`, `te_v2=<item_name>`; `te_v0` is emitted whenever
///   either is present, and the sentinel `"Other"` suppresses `te_v2`
///
/// Pagination is fixed to the first page of 24 offers.
pub fn build_search_url(filters: &MarketFilters) -> String {
    let mut url = Url::parse(SEARCH_PAGE_URL).expect("base search URL is valid");

    {
        let mut params = url.query_pairs_mut();

        if let Some(ms_rate) = filters
            .ms_rate
            .as_deref()
            .filter(|v| !v.is_empty() && *v != "0" && *v != "none")
        {
            params.append_pair("steal-a-brainrot-ms", ms_rate);
        }

        if let Some(mutations) = filters
            .mutations
            .as_deref()
            .filter(|v| !v.is_empty() && *v != "none")
        {
            params.append_pair("steal-a-brainrot-mutations", mutations);
        }

        let category = filters.category.as_deref().filter(|v| !v.is_empty());
        let item_name = filters.item_name.as_deref().filter(|v| !v.is_empty());

        if category.is_some() || item_name.is_some() {
            params.append_pair("te_v0", "Brainrot");
            if let Some(category) = category {
                params.append_pair("te_v1", category);
            }
            if let Some(item_name) = item_name.filter(|v| *v != "Other") {
                params.append_pair("te_v2", item_name);
            }
        }

        params.append_pair("gamePageOfferIndex", "1");
        params.append_pair("gamePageOfferSize", "24");
    }

    url.into()
}

/// Fetch and parse the marketplace search results for a filter set.
///
/// # Failure policy
///
/// Never returns an error: browser launch or navigation failures are logged
/// and yield an empty sequence, indistinguishable from a search with no
/// matches. Individual malformed offer nodes are skipped by the parser, not
/// fatal to the batch.
pub async fn fetch_search_results(filters: &MarketFilters) -> Vec<ScrapedOffer> {
    let url = build_search_url(filters);

    match fetch_rendered_page(&url).await {
        Ok(html) => parse::parse_offers(&html),
        Err(e) => {
            tracing::error!("Error in browser fetch: {e:#}");
            Vec::new()
        }
    }
}

/// Drive a headless browser to `url` and return the rendered markup.
///
/// The browser process is closed on every exit path, success or failure.
async fn fetch_rendered_page(url: &str) -> anyhow::Result<String> {
    let config = BrowserConfig::builder()
        .arg("--no-sandbox")
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

    let (mut browser, mut handler) = Browser::launch(config)
        .await
        .context("failed to launch browser")?;

    // The CDP event handler must be polled for the browser to make progress
    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    let result = fetch_page_content(&browser, url).await;

    let _ = browser.close().await;
    let _ = browser.wait().await;
    handler_task.abort();

    result
}

async fn fetch_page_content(browser: &Browser, url: &str) -> anyhow::Result<String> {
    let page = browser.new_page("about:blank").await?;

    page.execute(SetUserAgentOverrideParams::new(USER_AGENT.to_string()))
        .await?;

    tracing::info!("Navigating to: {url}");
    tokio::time::timeout(NAVIGATION_TIMEOUT, page.goto(url))
        .await
        .map_err(|_| {
            anyhow::anyhow!(
                "navigation timed out after {}s for {url}",
                NAVIGATION_TIMEOUT.as_secs()
            )
        })?
        .with_context(|| format!("navigation failed for {url}"))?;

    // Wait for offer nodes to hydrate; a timeout here is logged and tolerated
    if wait_for_selector(&page, "eld-offer-item", OFFER_WAIT_TIMEOUT).await {
        tracing::info!("Offer items detected");
    } else {
        tracing::warn!("Timeout waiting for offer items, reading page content as-is");
    }

    // Allow a bit more time for any final hydration
    tokio::time::sleep(SETTLE_DELAY).await;

    let content = page.content().await?;
    let _ = page.close().await;

    Ok(content)
}

/// Poll for a selector until it matches or the timeout elapses.
///
/// CDP's DOM query is single-shot, so the bounded wait is a polling loop.
async fn wait_for_selector(page: &Page, selector: &str, timeout: Duration) -> bool {
    let poll = async {
        loop {
            if page.find_element(selector).await.is_ok() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    };

    tokio::time::timeout(timeout, poll).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(
        ms_rate: Option<&str>,
        mutations: Option<&str>,
        category: Option<&str>,
        item_name: Option<&str>,
    ) -> MarketFilters {
        MarketFilters {
            ms_rate: ms_rate.map(String::from),
            mutations: mutations.map(String::from),
            category: category.map(String::from),
            item_name: item_name.map(String::from),
        }
    }

    #[test]
    fn no_filters_yields_only_pagination() {
        let url = build_search_url(&MarketFilters::default());
        assert_eq!(
            url,
            format!("{SEARCH_PAGE_URL}?gamePageOfferIndex=1&gamePageOfferSize=24")
        );
    }

    #[test]
    fn rate_and_mutation_map_to_fixed_params() {
        let url = build_search_url(&filters(Some("1-plus-bs"), Some("lava"), None, None));
        assert!(url.contains("steal-a-brainrot-ms=1-plus-bs"));
        assert!(url.contains("steal-a-brainrot-mutations=lava"));
        assert!(!url.contains("te_v0"));
    }

    #[test]
    fn rate_sentinels_are_dropped() {
        for sentinel in ["0", "none"] {
            let url = build_search_url(&filters(Some(sentinel), None, None, None));
            assert!(!url.contains("steal-a-brainrot-ms"), "sentinel {sentinel:?}");
        }
    }

    #[test]
    fn mutation_sentinel_is_dropped() {
        let url = build_search_url(&filters(None, Some("none"), None, None));
        assert!(!url.contains("steal-a-brainrot-mutations"));
    }

    #[test]
    fn item_name_emits_filter_tree() {
        let url = build_search_url(&filters(None, None, None, Some("Skibidi Toilet")));
        assert!(url.contains("te_v0=Brainrot"));
        assert!(url.contains("te_v2=Skibidi+Toilet"));
        assert!(!url.contains("te_v1"));
    }

    #[test]
    fn category_alone_emits_tree_root() {
        let url = build_search_url(&filters(None, None, Some("Secret"), None));
        assert!(url.contains("te_v0=Brainrot"));
        assert!(url.contains("te_v1=Secret"));
        assert!(!url.contains("te_v2"));
    }

    #[test]
    fn other_item_sentinel_keeps_tree_but_drops_leaf() {
        let url = build_search_url(&filters(None, None, Some("OG"), Some("Other")));
        assert!(url.contains("te_v0=Brainrot"));
        assert!(url.contains("te_v1=OG"));
        assert!(!url.contains("te_v2"));
    }
}
