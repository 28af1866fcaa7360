//! Offer extraction from the rendered marketplace markup.

use scraper::{ElementRef, Html, Selector};

use crate::models::offer::ScrapedOffer;

/// Parse every offer node out of the rendered search page.
///
/// Each `eld-offer-item` element yields one offer; a missing title, price, or
/// seller sub-element defaults that field to `"N/A"` rather than skipping the
/// node. No offer nodes (or an unrenderable page) yields an empty vec.
pub fn parse_offers(html: &str) -> Vec<ScrapedOffer> {
    let document = Html::parse_document(html);

    let offer_selector = Selector::parse("eld-offer-item").expect("static selector is valid");
    let title_selector = Selector::parse(".offer-title").expect("static selector is valid");
    let price_selector =
        Selector::parse("eld-offer-price strong").expect("static selector is valid");
    let seller_selector =
        Selector::parse(".seller-details .username").expect("static selector is valid");

    let offers: Vec<ScrapedOffer> = document
        .select(&offer_selector)
        .map(|item| ScrapedOffer {
            title: text_or_na(item.select(&title_selector).next()),
            price: text_or_na(item.select(&price_selector).next()),
            seller: text_or_na(item.select(&seller_selector).next()),
        })
        .collect();

    if offers.is_empty() {
        tracing::info!("No offers found in HTML");
    }

    offers
}

fn text_or_na(element: Option<ElementRef>) -> String {
    match element {
        Some(el) => el.text().collect::<String>().trim().to_string(),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFER_PAGE: &str = r#"
        <html><body>
          <eld-offer-item>
            <div class="offer-title">Lava Skibidi Toilet</div>
            <eld-offer-price><strong>¥1,200</strong></eld-offer-price>
            <div class="seller-details"><span class="username">bob</span></div>
          </eld-offer-item>
          <eld-offer-item>
            <div class="offer-title">Rainbow Camera Man</div>
            <eld-offer-price><strong>$88.50</strong></eld-offer-price>
            <div class="seller-details"><span class="username">alice</span></div>
          </eld-offer-item>
        </body></html>
    "#;

    #[test]
    fn parses_all_offer_nodes() {
        let offers = parse_offers(OFFER_PAGE);
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].title, "Lava Skibidi Toilet");
        assert_eq!(offers[0].price, "¥1,200");
        assert_eq!(offers[0].seller, "bob");
        assert_eq!(offers[1].seller, "alice");
    }

    #[test]
    fn missing_sub_elements_default_to_na() {
        let html = r#"
            <eld-offer-item>
              <div class="offer-title">Mystery Item</div>
            </eld-offer-item>
        "#;
        let offers = parse_offers(html);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].title, "Mystery Item");
        assert_eq!(offers[0].price, "N/A");
        assert_eq!(offers[0].seller, "N/A");
    }

    #[test]
    fn page_without_offers_yields_empty_vec() {
        assert!(parse_offers("<html><body><p>no results</p></body></html>").is_empty());
        assert!(parse_offers("").is_empty());
    }

    #[test]
    fn nested_text_is_flattened_and_trimmed() {
        let html = r#"
            <eld-offer-item>
              <div class="offer-title">  Lava <b>Skibidi</b> Toilet  </div>
              <eld-offer-price><strong> ¥70,894 </strong></eld-offer-price>
              <div class="seller-details"><span class="username">carol</span></div>
            </eld-offer-item>
        "#;
        let offers = parse_offers(html);
        assert_eq!(offers[0].title, "Lava Skibidi Toilet");
        assert_eq!(offers[0].price, "¥70,894");
    }
}
