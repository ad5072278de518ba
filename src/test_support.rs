//! Fixtures shared by the fetcher and pipeline tests.

use reqwest::Client;
use reqwest::header::HeaderMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A listing page with two complete cards and one card missing its price.
pub const LISTING_PAGE: &str = r#"<!doctype html>
<html>
  <body>
    <ul class="productList">
      <div class="col-xs-12 x-productListItem">
        <a class="link" href="/en-ca/product/widget/15000001?source=clearance">
          <img src="https://multimedia.bbycastatic.ca/widget.jpg" alt="Widget">
          <div data-automation="productItemName">  Widget
          </div>
          <div data-automation="product-price"><span>$9.99</span><span>SAVE $5</span></div>
        </a>
      </div>
      <div class="col-xs-12 x-productListItem">
        <a class="link" href="/en-ca/product/gadget/15000002">
          <img src="/img/gadget.jpg" alt="Gadget">
          <div data-automation="productItemName">Gadget Pro 2</div>
          <div data-automation="product-price"><span>$1,249.99</span></div>
        </a>
      </div>
      <div class="col-xs-12 x-productListItem">
        <a class="link" href="/en-ca/product/cable/15000003">
          <img data-src="/img/cable.jpg" alt="Cable">
          <div data-automation="productItemName">Cable</div>
        </a>
      </div>
    </ul>
  </body>
</html>"#;

/// A local server that answers exactly one request.
pub struct CannedServer {
    /// URL of the listing path on the server.
    pub url: String,
    /// Raw text of the request the server received.
    pub request: oneshot::Receiver<String>,
}

/// Serve one HTTP/1.1 response with the given status line and body.
pub async fn serve_once(status: &str, body: &str) -> CannedServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let n = socket.read(&mut buf).await.unwrap();
        let _ = tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });

    CannedServer {
        url: format!("http://{addr}/clearance-products"),
        request: rx,
    }
}

/// URL of a port nothing is listening on.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/clearance-products")
}

/// Client that ignores any proxy configured in the environment.
pub fn local_client(headers: HeaderMap) -> Client {
    Client::builder()
        .default_headers(headers)
        .no_proxy()
        .build()
        .unwrap()
}
