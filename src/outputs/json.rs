//! JSON output of the extracted products.
//!
//! The whole array is serialized in memory before the destination is
//! opened, so a failed run never leaves a truncated file behind.

use crate::error::ScrapeError;
use crate::models::ProductRecord;
use crate::utils::ensure_parent_dir;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `products` to `path` as a pretty-printed JSON array.
///
/// Parent directories are created as needed and an existing file is
/// overwritten.
///
/// # Errors
///
/// [`ScrapeError::Io`] if the directory cannot be created or the file
/// cannot be written.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = products.len()))]
pub async fn write_products(products: &[ProductRecord], path: &Path) -> Result<(), ScrapeError> {
    let json = serde_json::to_string_pretty(products)?;

    ensure_parent_dir(path).await?;
    if let Err(e) = fs::write(path, json).await {
        error!(error = %e, "Failed to write products JSON");
        return Err(ScrapeError::io(path, e));
    }

    info!("Wrote products JSON");
    Ok(())
}
