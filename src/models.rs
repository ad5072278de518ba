//! Data models for scraped clearance products.
//!
//! - [`ProductRecord`]: one product card as extracted from the listing page
//! - [`RunSummary`]: counts reported once a run completes

use serde::{Deserialize, Serialize};

/// A product as extracted from one card on the clearance listing page.
///
/// Every field is a plain string and may be empty when the card lacks the
/// corresponding element. Field order here is the key order in the JSON
/// output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProductRecord {
    /// Product title, whitespace-trimmed.
    pub name: String,
    /// Price text exactly as displayed (e.g. `"$9.99"`).
    pub price: String,
    /// Absolute URL of the product page.
    pub url: String,
    /// Absolute URL of the thumbnail image.
    pub image_url: String,
}

/// Counts describing the outcome of one scrape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub products: usize,
    pub with_price: usize,
    pub with_image: usize,
}

impl RunSummary {
    pub fn from_products(products: &[ProductRecord]) -> Self {
        RunSummary {
            products: products.len(),
            with_price: products.iter().filter(|p| !p.price.is_empty()).count(),
            with_image: products.iter().filter(|p| !p.image_url.is_empty()).count(),
        }
    }
}
