//! The fetch → extract → write run.
//!
//! Each stage runs once and in order. Any error stops the run where it
//! happens, so the records file is only touched after the full list of
//! products exists.

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::models::RunSummary;
use crate::outputs::{json, snapshot};
use crate::scrapers::bestbuy::{self, CardSelectors};
use crate::scrapers::http::{Fetcher, build_headers};
use tracing::{info, instrument, warn};

/// Run one scrape with a client built from `config`'s headers.
pub async fn run(config: &ScrapeConfig) -> Result<RunSummary, ScrapeError> {
    let fetcher = Fetcher::new(build_headers(&config.headers)?)?;
    run_with(&fetcher, config).await
}

/// Run one scrape using `fetcher` for the request.
#[instrument(level = "info", skip_all, fields(url = %config.url, output = %config.output.display()))]
pub async fn run_with(fetcher: &Fetcher, config: &ScrapeConfig) -> Result<RunSummary, ScrapeError> {
    // Selectors come from config; reject bad ones before making the request
    let selectors = CardSelectors::compile(&config.selectors)?;

    let html = fetcher.fetch(&config.url).await?;

    if let Some(path) = &config.html_snapshot {
        snapshot::write_html(&html, path).await?;
    }

    let products = bestbuy::extract_products(&html, &selectors, &config.base_url);
    let summary = RunSummary::from_products(&products);
    if products.is_empty() {
        warn!("No product cards matched; the page layout may have changed");
    }
    info!(
        products = summary.products,
        with_price = summary.with_price,
        with_image = summary.with_image,
        "Extraction complete"
    );

    json::write_products(&products, &config.output).await?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;
    use crate::models::ProductRecord;
    use crate::test_support::{LISTING_PAGE, local_client, serve_once};
    use reqwest::StatusCode;

    fn fetcher() -> Fetcher {
        Fetcher::from_client(local_client(build_headers(&[]).unwrap()))
    }

    #[tokio::test]
    async fn test_run_writes_extracted_products() {
        let server = serve_once("200 OK", LISTING_PAGE).await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("data/clearance_products.json");
        let config = ScrapeConfig::new(server.url.clone(), &output).unwrap();

        let summary = run_with(&fetcher(), &config).await.unwrap();
        assert_eq!(
            summary,
            RunSummary {
                products: 3,
                with_price: 2,
                with_image: 3
            }
        );

        let written: Vec<ProductRecord> =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(written[1].name, "Gadget Pro 2");
        assert_eq!(
            written[1].url,
            "https://www.bestbuy.ca/en-ca/product/gadget/15000002"
        );
    }

    #[tokio::test]
    async fn test_run_saves_snapshot_when_asked() {
        let server = serve_once("200 OK", LISTING_PAGE).await;
        let dir = tempfile::tempdir().unwrap();
        let mut config = ScrapeConfig::new(server.url.clone(), dir.path().join("out.json")).unwrap();
        let html_path = dir.path().join("debug/page.html");
        config.html_snapshot = Some(html_path.clone());

        run_with(&fetcher(), &config).await.unwrap();
        assert_eq!(std::fs::read_to_string(&html_path).unwrap(), LISTING_PAGE);
    }

    #[tokio::test]
    async fn test_page_without_cards_writes_empty_array() {
        let server = serve_once("200 OK", "<html><body>Maintenance</body></html>").await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        let config = ScrapeConfig::new(server.url.clone(), &output).unwrap();

        let summary = run_with(&fetcher(), &config).await.unwrap();
        assert_eq!(summary.products, 0);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_client_rendered_page_uses_embedded_data() {
        let page = r#"<html><body><div id="root"></div>
            <script id="__NEXT_DATA__" type="application/json">
              {"props":{"pageProps":{"products":[
                {"sku":"15000001","name":"Widget","salePrice":9.99,"url":"/p/widget"}
              ]}}}
            </script></body></html>"#;
        let server = serve_once("200 OK", page).await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        let config = ScrapeConfig::new(server.url.clone(), &output).unwrap();

        let summary = run_with(&fetcher(), &config).await.unwrap();
        assert_eq!(summary.products, 1);
        assert_eq!(summary.with_price, 1);

        let written: Vec<ProductRecord> =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written[0].name, "Widget");
        assert_eq!(written[0].url, "https://www.bestbuy.ca/p/widget");
    }

    #[tokio::test]
    async fn test_http_error_halts_before_writing() {
        let server = serve_once("500 Internal Server Error", LISTING_PAGE).await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("data/out.json");
        let mut config = ScrapeConfig::new(server.url.clone(), &output).unwrap();
        config.html_snapshot = Some(dir.path().join("page.html"));

        let err = run_with(&fetcher(), &config).await.unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::Http { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert!(!output.exists());
        assert!(!dir.path().join("data").exists());
        assert!(!dir.path().join("page.html").exists());
    }

    #[tokio::test]
    async fn test_http_error_leaves_previous_output_untouched() {
        let server = serve_once("404 Not Found", "").await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        std::fs::write(&output, r#"[{"name":"old"}]"#).unwrap();
        let config = ScrapeConfig::new(server.url.clone(), &output).unwrap();

        assert!(run_with(&fetcher(), &config).await.is_err());
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            r#"[{"name":"old"}]"#
        );
    }

    #[tokio::test]
    async fn test_invalid_selector_fails_before_request() {
        let mut server = serve_once("200 OK", LISTING_PAGE).await;
        let dir = tempfile::tempdir().unwrap();
        let mut config = ScrapeConfig::new(server.url.clone(), dir.path().join("out.json")).unwrap();
        config.selectors = SelectorConfig {
            card: "div[".to_string(),
            ..SelectorConfig::default()
        };

        let err = run_with(&fetcher(), &config).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Selector { field: "card", .. }));
        // The server task is still waiting, so nothing was sent
        assert!(server.request.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_header_override() {
        let dir = tempfile::tempdir().unwrap();
        let mut config =
            ScrapeConfig::new("http://127.0.0.1:9/", dir.path().join("out.json")).unwrap();
        config.headers.push(("Bad Header".to_string(), "x".to_string()));

        let err = run(&config).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Header { .. }));
    }
}
