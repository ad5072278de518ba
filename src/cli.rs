//! Command-line interface definitions for the clearance scraper.
//!
//! Every option has a default, so a bare invocation scrapes the Best Buy
//! Canada clearance collection into `data/clearance_products.json`.

use crate::config::{DEFAULT_OUTPUT, DEFAULT_TOKEN_HEADER, DEFAULT_URL};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the clearance scraper.
///
/// # Examples
///
/// ```sh
/// # Defaults
/// clearance_scraper
///
/// # Custom destination and a raw HTML snapshot for debugging
/// clearance_scraper -o out/clearance.json --html out/page.html
///
/// # Extra headers
/// clearance_scraper -H "Accept-Language: fr-CA" --token "$BESTBUY_TOKEN"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to save the scraped JSON data
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Clearance collection URL to scrape
    #[arg(short, long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Optional YAML file overriding base URL, headers and selectors
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Also save the raw HTML of the fetched page to this path
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Extra request header as `Name: Value`; may be repeated
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Access token sent with the request
    #[arg(long, env = "BESTBUY_TOKEN")]
    pub token: Option<String>,

    /// Header name that carries the access token
    #[arg(long, env = "BESTBUY_TOKEN_HEADER", default_value = DEFAULT_TOKEN_HEADER)]
    pub token_header: String,
}
