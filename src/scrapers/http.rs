//! HTTP fetch of the listing page.
//!
//! The request carries a browser-like header set; the site answers bare
//! clients with a block page. Header overrides from the config file or the
//! command line replace defaults of the same name.

use crate::error::ScrapeError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, info, instrument, warn};

/// Headers sent with every request unless overridden.
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    ),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    ),
    ("Accept-Language", "en-CA,en-US;q=0.9,en;q=0.8"),
    ("Connection", "keep-alive"),
];

/// Build the request headers: defaults first, then `overrides` in order.
///
/// Names compare case-insensitively, so `accept-language` replaces the
/// default `Accept-Language`.
pub fn build_headers(overrides: &[(String, String)]) -> Result<HeaderMap, ScrapeError> {
    let mut headers = HeaderMap::new();
    let defaults = DEFAULT_HEADERS.iter().map(|(n, v)| (*n, *v));
    let extra = overrides.iter().map(|(n, v)| (n.as_str(), v.as_str()));

    for (name, value) in defaults.chain(extra) {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| ScrapeError::Header {
            header: name.to_string(),
            reason: e.to_string(),
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ScrapeError::Header {
            header: name.to_string(),
            reason: e.to_string(),
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Issues the single GET of a run.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Client that sends `headers` with every request.
    pub fn new(headers: HeaderMap) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ScrapeError::Client)?;
        Ok(Fetcher::from_client(client))
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client) -> Self {
        Fetcher { client }
    }

    /// Fetch `url` and return the decoded body.
    ///
    /// A 4xx or 5xx status is [`ScrapeError::Http`]; anything that stops a
    /// response from arriving is [`ScrapeError::Network`]. No retries.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let network = |source| ScrapeError::Network {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(network)?;
        let status = response.status();

        if status.is_client_error() || status.is_server_error() {
            // Body is only read for the log preview; failures here don't matter.
            let preview = response.text().await.unwrap_or_default();
            warn!(
                %status,
                body = %truncate_for_log(&preview, 300),
                "Listing request rejected"
            );
            return Err(ScrapeError::Http {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(network)?;
        info!(%status, bytes = body.len(), "Fetched listing page");
        debug!(preview = %truncate_for_log(&body, 200), "Listing body");
        Ok(body)
    }
}
