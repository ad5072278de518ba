//! Raw HTML snapshot of the fetched listing.
//!
//! Kept for debugging selector drift: when the site changes its markup the
//! saved page shows what the extractor actually saw.

use crate::error::ScrapeError;
use crate::utils::ensure_parent_dir;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Save `html` verbatim to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display(), bytes = html.len()))]
pub async fn write_html(html: &str, path: &Path) -> Result<(), ScrapeError> {
    ensure_parent_dir(path).await?;
    fs::write(path, html)
        .await
        .map_err(|e| ScrapeError::io(path, e))?;
    info!("Saved HTML snapshot");
    Ok(())
}
