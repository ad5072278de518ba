//! Products from the page's embedded `__NEXT_DATA__` JSON.
//!
//! Used only when the served HTML carries no product cards. The payload is
//! read from `<script id="__NEXT_DATA__">` or, failing that, from a
//! `__NEXT_DATA__ = {...};` assignment inside any other script. The product
//! list is the first array whose entries are all objects carrying both `sku`
//! and `name`.

use crate::models::ProductRecord;
use crate::scrapers::bestbuy::{resolve, resolve_link};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

static NEXT_DATA_SCRIPT: Lazy<Selector> = Lazy::new(|| Selector::parse("script#__NEXT_DATA__").unwrap());
static ANY_SCRIPT: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());
static NEXT_DATA_ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)__NEXT_DATA__\s*=\s*(\{.*?\})\s*;").unwrap());

/// First non-null wins.
const PRICE_FIELDS: &[&str] = &["salePrice", "price", "priceWithEcoFee", "priceWithFees"];
const URL_FIELDS: &[&str] = &["url", "canonicalUrl"];
const IMAGE_FIELDS: &[&str] = &["thumbnailImage", "highResImage", "image"];

/// Records from the embedded payload, in payload order. Empty when the page
/// has no payload or the payload holds no product list.
pub fn extract_products(document: &Html, base: &Url) -> Vec<ProductRecord> {
    let Some(payload) = payload(document) else {
        debug!("No __NEXT_DATA__ payload on page");
        return Vec::new();
    };
    let Some(entries) = find_product_list(&payload) else {
        debug!("__NEXT_DATA__ payload has no product list");
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| to_record(entry, base))
        .collect()
}

fn payload(document: &Html) -> Option<Value> {
    if let Some(script) = document.select(&NEXT_DATA_SCRIPT).next() {
        let text: String = script.text().collect();
        match serde_json::from_str(text.trim()) {
            Ok(value) => return Some(value),
            Err(e) => warn!(error = %e, "Unparseable __NEXT_DATA__ script"),
        }
    }

    document.select(&ANY_SCRIPT).find_map(|script| {
        let text: String = script.text().collect();
        let captures = NEXT_DATA_ASSIGNMENT.captures(&text)?;
        serde_json::from_str(&captures[1]).ok()
    })
}

fn find_product_list(root: &Value) -> Option<&Vec<Value>> {
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        match current {
            Value::Array(items) if is_product_list(items) => return Some(items),
            Value::Array(items) => stack.extend(items.iter().rev()),
            Value::Object(map) => stack.extend(map.values().rev()),
            _ => {}
        }
    }
    None
}

fn is_product_list(items: &[Value]) -> bool {
    !items.is_empty()
        && items.iter().all(|item| {
            item.as_object()
                .is_some_and(|o| o.contains_key("sku") && o.contains_key("name"))
        })
}

fn to_record(entry: &Map<String, Value>, base: &Url) -> ProductRecord {
    let name = entry
        .get("name")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let price = PRICE_FIELDS
        .iter()
        .filter_map(|key| entry.get(*key))
        .find(|v| !v.is_null())
        .and_then(display_amount)
        .unwrap_or_default();

    let url = first_str(entry, URL_FIELDS)
        .and_then(|href| resolve_link(base, href))
        .unwrap_or_default();

    let image_url = first_str(entry, IMAGE_FIELDS)
        .and_then(|src| resolve(base, src))
        .map(String::from)
        .unwrap_or_default();

    ProductRecord {
        name,
        price,
        url,
        image_url,
    }
}

fn first_str<'a>(entry: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| entry.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Numbers render the way the listing displays them (`$9.99`); strings are
/// taken as already formatted.
fn display_amount(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_f64().map(|amount| format!("${amount:.2}")),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
