//! Best Buy Canada clearance listing parser.
//!
//! The collection page renders one card per product. Each card holds an
//! anchor to the product page, a thumbnail, a name block and a price block.
//! Cards are read in document order; a card that lacks one of these keeps
//! the rest of its fields and gets an empty string for the missing one.
//!
//! # URL Pattern
//!
//! Product links are site-relative (`/en-ca/product/<slug>/<sku>?...`) and
//! are resolved against the base URL with tracking query strings dropped.
//!
//! # Embedded Page Data
//!
//! When the listing is rendered client-side the served HTML has no cards.
//! In that case the products are read from the `__NEXT_DATA__` payload
//! instead; see [`super::next_data`].

use crate::config::SelectorConfig;
use crate::error::ScrapeError;
use crate::models::ProductRecord;
use crate::scrapers::next_data;
use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

/// Fallback for cards whose visible price is only exposed to screen readers.
static PRICE_LABEL: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"[aria-label*="$"]"#).unwrap());

/// A dollar amount anywhere in a card's text, e.g. `$1,249.99` or `$ 20`.
static DISPLAY_PRICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s*\d{1,3}(?:[,\s]\d{3})*(?:\.\d{2})?").unwrap());

/// Compiled form of a [`SelectorConfig`].
#[derive(Debug, Clone)]
pub struct CardSelectors {
    card: Selector,
    title: Selector,
    price: Selector,
    link: Selector,
    image: Selector,
}

impl CardSelectors {
    /// Parse every selector, failing on the first invalid one.
    pub fn compile(config: &SelectorConfig) -> Result<Self, ScrapeError> {
        Ok(CardSelectors {
            card: parse_selector("card", &config.card)?,
            title: parse_selector("title", &config.title)?,
            price: parse_selector("price", &config.price)?,
            link: parse_selector("link", &config.link)?,
            image: parse_selector("image", &config.image)?,
        })
    }
}

fn parse_selector(field: &'static str, raw: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(raw).map_err(|e| ScrapeError::Selector {
        field,
        selector: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Extract one [`ProductRecord`] per product card in `html`.
///
/// Falls back to the embedded page data when no card matches. Never fails:
/// a page with neither yields an empty list.
#[instrument(level = "info", skip_all, fields(bytes = html.len()))]
pub fn extract_products(html: &str, selectors: &CardSelectors, base: &Url) -> Vec<ProductRecord> {
    let document = Html::parse_document(html);
    let products: Vec<ProductRecord> = document
        .select(&selectors.card)
        .map(|card| extract_card(card, selectors, base))
        .collect();

    if !products.is_empty() {
        info!(count = products.len(), "Extracted product cards");
        return products;
    }

    let products = next_data::extract_products(&document, base);
    info!(count = products.len(), "No product cards; read embedded page data");
    products
}

fn extract_card(card: ElementRef<'_>, selectors: &CardSelectors, base: &Url) -> ProductRecord {
    let link = card.select(&selectors.link).next();

    let name = first_text(card, &selectors.title)
        .or_else(|| link.and_then(|a| attr(a, "aria-label")))
        .unwrap_or_default();

    let url = link
        .and_then(|a| attr(a, "href"))
        .and_then(|href| resolve_link(base, &href))
        .unwrap_or_default();

    let image_url = card
        .select(&selectors.image)
        .next()
        .and_then(|img| attr(img, "src").or_else(|| attr(img, "data-src")))
        .and_then(|src| resolve(base, &src))
        .map(String::from)
        .unwrap_or_default();

    let price = display_price(card, &selectors.price).unwrap_or_default();

    let record = ProductRecord {
        name,
        price,
        url,
        image_url,
    };
    debug!(?record, "Parsed card");
    record
}

/// Collapsed text of the first match, if it has any.
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|text| !text.is_empty())
}

/// Trimmed, non-empty attribute value.
fn attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Price text, trying the price block, then an `aria-label` carrying a
/// dollar sign, then the first dollar amount in the card's text.
fn display_price(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    first_text(card, selector)
        .or_else(|| {
            card.select(&PRICE_LABEL)
                .next()
                .and_then(|el| attr(el, "aria-label"))
        })
        .or_else(|| {
            let text = card.text().collect::<Vec<_>>().join(" ");
            DISPLAY_PRICE.find(&text).map(|m| m.as_str().to_string())
        })
}

pub(super) fn resolve(base: &Url, raw: &str) -> Option<Url> {
    base.join(raw).ok()
}

/// Absolute product URL without query or fragment.
///
/// `""`, `#...` and `?...` point back at the listing itself and yield `None`.
pub(super) fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    let target = href.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
    if target.is_empty() {
        return None;
    }
    let mut url = resolve(base, href)?;
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}
