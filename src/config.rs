//! Run configuration.
//!
//! A [`ScrapeConfig`] is assembled once in `main` from the command line and
//! an optional YAML file, then passed by reference into the pipeline. Tests
//! build their own instead of touching shared state.
//!
//! # Config file
//!
//! Every key is optional; anything left out keeps its default.
//!
//! ```yaml
//! base_url: https://www.bestbuy.ca
//! headers:
//!   Accept-Language: fr-CA
//! selectors:
//!   card: div.x-productListItem
//!   price: '[data-automation="product-price"] span'
//! ```

use crate::cli::Cli;
use crate::error::ScrapeError;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_URL: &str = "https://www.bestbuy.ca/en-ca/collection/clearance-products/113065";
pub const DEFAULT_BASE_URL: &str = "https://www.bestbuy.ca";
pub const DEFAULT_OUTPUT: &str = "data/clearance_products.json";
pub const DEFAULT_TOKEN_HEADER: &str = "X-Token";

/// CSS selectors locating a product card and the fields inside it.
///
/// `title`, `price`, `link` and `image` are matched against the card's
/// descendants, never the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorConfig {
    pub card: String,
    pub title: String,
    pub price: String,
    pub link: String,
    pub image: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            card: "div.x-productListItem".to_string(),
            title: r#"[data-automation="productItemName"]"#.to_string(),
            price: r#"[data-automation="product-price"] span"#.to_string(),
            link: "a[href]".to_string(),
            image: "img".to_string(),
        }
    }
}

/// Optional overrides read from a YAML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    /// Kept in file order; a later entry overrides an earlier one with the
    /// same name (case-insensitive).
    #[serde(deserialize_with = "ordered_headers")]
    pub headers: Vec<(String, String)>,
    pub selectors: SelectorConfig,
}

fn ordered_headers<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct HeadersVisitor;

    impl<'de> Visitor<'de> for HeadersVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of header names to values")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut headers = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, String>()? {
                headers.push(entry);
            }
            Ok(headers)
        }
    }

    deserializer.deserialize_map(HeadersVisitor)
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ScrapeError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ScrapeError::io(path, e))?;
        let config = Self::from_yaml(&raw).map_err(|e| ScrapeError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(FileConfig::default());
        }
        serde_yaml::from_str(raw)
    }
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Listing page to fetch.
    pub url: String,
    /// Base that relative links and image paths resolve against.
    pub base_url: Url,
    /// Where the JSON array of records is written.
    pub output: PathBuf,
    /// Where the raw page body is saved, if anywhere.
    pub html_snapshot: Option<PathBuf>,
    /// Header overrides in application order; later entries win.
    pub headers: Vec<(String, String)>,
    pub selectors: SelectorConfig,
}

impl ScrapeConfig {
    /// Configuration with default base URL, headers and selectors.
    pub fn new(url: impl Into<String>, output: impl Into<PathBuf>) -> Result<Self, ScrapeError> {
        Ok(ScrapeConfig {
            url: url.into(),
            base_url: parse_url(DEFAULT_BASE_URL)?,
            output: output.into(),
            html_snapshot: None,
            headers: Vec::new(),
            selectors: SelectorConfig::default(),
        })
    }

    /// Merge the command line over the optional config file over defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, ScrapeError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        parse_url(&cli.url)?;
        let mut config = ScrapeConfig::new(cli.url.clone(), cli.output.clone())?;
        if let Some(base) = &file.base_url {
            config.base_url = parse_url(base)?;
        }
        config.selectors = file.selectors;
        config.html_snapshot = cli.html.clone();

        config.headers.extend(file.headers);
        if let Some(token) = &cli.token {
            config
                .headers
                .push((cli.token_header.clone(), token.clone()));
        }
        for raw in &cli.headers {
            config.headers.push(parse_header_arg(raw)?);
        }

        debug!(
            url = %config.url,
            base_url = %config.base_url,
            output = %config.output.display(),
            header_overrides = config.headers.len(),
            "Resolved configuration"
        );
        Ok(config)
    }
}

fn parse_url(raw: &str) -> Result<Url, ScrapeError> {
    Url::parse(raw).map_err(|source| ScrapeError::Url {
        url: raw.to_string(),
        source,
    })
}

/// Split a `Name: Value` command-line header into its parts.
pub fn parse_header_arg(raw: &str) -> Result<(String, String), ScrapeError> {
    let invalid = |reason: &str| ScrapeError::Header {
        header: raw.to_string(),
        reason: reason.to_string(),
    };
    let (name, value) = raw.split_once(':').ok_or_else(|| invalid("expected `Name: Value`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid("empty header name"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
