//! Fetching and parsing of the clearance listing.
//!
//! | Module | Role |
//! |--------|------|
//! | [`http`] | One GET of the listing page with the identifying headers |
//! | [`bestbuy`] | Product-card extraction from the returned HTML |
//! | [`next_data`] | Fallback: products from the embedded `__NEXT_DATA__` JSON |
//!
//! Fetch failures are errors. Parsing is best-effort: a card missing a
//! field still yields a record, with that field left empty.

pub mod bestbuy;
pub mod http;
pub mod next_data;
