//! # Clearance Scraper
//!
//! Fetches the Best Buy Canada clearance collection page, extracts one record
//! per product card (name, price, product URL, image URL) and writes them to
//! a JSON file.
//!
//! ## Usage
//!
//! ```sh
//! clearance_scraper --output data/clearance_products.json
//! ```
//!
//! ## Architecture
//!
//! One linear run, no retries and no concurrency:
//! 1. **Fetch**: a single GET of the listing page
//! 2. **Extract**: walk the product cards with CSS selectors
//! 3. **Write**: serialize the records as a JSON array
//!
//! Scheduling and artifact storage are left to whatever invokes the binary.

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

#[cfg(test)]
mod test_support;

use cli::Cli;
use config::ScrapeConfig;
use error::ScrapeError;
use models::RunSummary;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(url = %args.url, output = %args.output.display(), "Parsed CLI arguments");

    match scrape(&args).await {
        Ok(summary) => {
            info!(
                products = summary.products,
                output = %args.output.display(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Saved clearance products"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            // Reported once, on stderr.
            debug!(error = ?e, "Scrape failed");
            eprintln!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

async fn scrape(args: &Cli) -> Result<RunSummary, ScrapeError> {
    let config = ScrapeConfig::from_cli(args)?;
    info!(url = %config.url, "clearance_scraper starting up");
    pipeline::run(&config).await
}

fn failure_message(e: &ScrapeError) -> String {
    format!("error: {e}")
}
