//! Files written by a run.
//!
//! - [`json`]: the product records, as a JSON array
//! - [`snapshot`]: the raw listing HTML, when requested
//!
//! ```text
//! data/
//! ├── clearance_products.json   # always
//! └── clearance_page.html       # only with --html
//! ```

pub mod json;
pub mod snapshot;
