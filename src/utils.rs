//! Small helpers for text cleanup, log previews and output paths.

use crate::error::ScrapeError;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Collapse every run of whitespace into a single space and trim the ends.
///
/// Card text in the listing is split across several nodes with layout
/// whitespace between them; this turns it into one readable line.
///
/// ```ignore
/// assert_eq!(collapse_whitespace("  Open\n  Box  "), "Open Box");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with an
/// ellipsis and the number of dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Create the parent directory of `path` if it has one.
///
/// A bare file name (no parent component) needs nothing created.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> Result<(), ScrapeError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    fs::create_dir_all(parent)
        .await
        .map_err(|e| ScrapeError::io(parent, e))?;
    debug!(dir = %parent.display(), "Output directory ready");
    Ok(())
}
