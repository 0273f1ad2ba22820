//! Retrieval of raw HTML documents.
//!
//! [`FetchDocument`] is the seam the aggregator and article extractor depend
//! on; [`HttpFetcher`] is the production implementation over a shared
//! `reqwest::Client`. Every request carries a desktop-browser User-Agent
//! because several outlets serve a different page (or nothing) to unknown
//! clients, and every request is bounded by a deadline.
//!
//! HTTP status codes are deliberately not inspected: an error page is still a
//! document, and the extractors simply find nothing in it.

use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Browser identity sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can turn a URL into document text within a deadline.
#[async_trait]
pub trait FetchDocument: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

/// Fetcher backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher sending [`BROWSER_USER_AGENT`].
    pub fn new() -> Result<Self, FetchError> {
        Self::with_user_agent(BROWSER_USER_AGENT)
    }

    pub fn with_user_agent(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    async fn get_text(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%url, %status, "Non-success status; reading body anyway");
        }
        response.text().await
    }
}

#[async_trait]
impl FetchDocument for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let t0 = Instant::now();
        match tokio::time::timeout(timeout, self.get_text(url)).await {
            Ok(Ok(body)) => {
                debug!(
                    bytes = body.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Fetched document"
                );
                Ok(body)
            }
            Ok(Err(source)) => {
                warn!(error = %source, "Fetch failed");
                Err(FetchError::Network {
                    url: url.to_string(),
                    source,
                })
            }
            Err(_) => {
                warn!(?timeout, "Fetch timed out");
                Err(FetchError::Timeout {
                    url: url.to_string(),
                    after: timeout,
                })
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one canned HTTP response and report the raw request back.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&buf[..n]).to_string());
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        (format!("http://{addr}/"), rx)
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_sends_browser_agent() {
        let (url, request) = serve_once("200 OK", "<html><body>hola</body></html>").await;
        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher.fetch(&url, Duration::from_secs(5)).await.unwrap();
        assert_eq!(body, "<html><body>hola</body></html>");

        let raw = request.await.unwrap().to_lowercase();
        assert!(raw.contains("user-agent: mozilla/5.0 (windows nt 10.0; win64; x64)"));
    }

    #[tokio::test]
    async fn test_non_success_status_still_yields_body() {
        let (url, _request) = serve_once("404 Not Found", "<p>no está</p>").await;
        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher.fetch(&url, Duration::from_secs(5)).await.unwrap();
        assert_eq!(body, "<p>no está</p>");
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let fetcher = HttpFetcher::new().unwrap();
        let t0 = Instant::now();
        let err = fetcher
            .fetch(&format!("http://{addr}/"), Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(t0.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        // Bind then drop to get a port with nobody listening.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch(&format!("http://{addr}/"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }
}
