//! Best-effort URL fetching.

use std::time::Duration;

use pipewright_config::FetchConfig;
use pipewright_core::error::FetchError;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Raw bytes fetched from a URL.
#[derive(Debug, Clone)]
pub struct ByteStream {
    pub url: String,
    /// MIME type without parameters (e.g. "text/html")
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ByteStream {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// HTTP client shared by the fetch-based pipelines.
#[derive(Clone)]
pub struct LinkFetcher {
    client: reqwest::Client,
}

impl LinkFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self { client }
    }

    /// Fetch every URL in order. Failures are logged and skipped.
    pub async fn fetch_urls(&self, urls: &[String]) -> Vec<ByteStream> {
        let mut streams = Vec::with_capacity(urls.len());
        for url in urls {
            match self.fetch(url).await {
                Ok(stream) => streams.push(stream),
                Err(e) => warn!(url = %url, error = %e, "Fetch failed, skipping"),
            }
        }
        streams
    }

    /// Fetch a single URL.
    pub async fn fetch(&self, url: &str) -> Result<ByteStream, FetchError> {
        let response = self.get(url).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

        let bytes = response.bytes().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!(url, len = bytes.len(), content_type = ?content_type, "Fetched");

        Ok(ByteStream {
            url: url.to_string(),
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    /// GET a URL and decode its JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.get(url).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::InvalidPayload {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::{StatusCode, header};
    use axum::routing::get;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn test_app() -> Router {
        Router::new()
            .route(
                "/page",
                get(|| async {
                    (
                        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                        "<p>hello</p>",
                    )
                }),
            )
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route("/json", get(|| async { "[1, 2, 3]" }))
    }

    #[tokio::test]
    async fn fetch_strips_content_type_parameters() {
        let base = serve(test_app()).await;
        let fetcher = LinkFetcher::new(&FetchConfig::default());

        let stream = fetcher.fetch(&format!("{base}/page")).await.unwrap();
        assert_eq!(stream.content_type.as_deref(), Some("text/html"));
        assert_eq!(stream.text(), "<p>hello</p>");
    }

    #[tokio::test]
    async fn failing_urls_are_skipped() {
        let base = serve(test_app()).await;
        let fetcher = LinkFetcher::new(&FetchConfig::default());

        let urls = vec![
            format!("{base}/missing"),
            format!("{base}/page"),
            "http://127.0.0.1:1/unreachable".to_string(),
        ];
        let streams = fetcher.fetch_urls(&urls).await;
        assert_eq!(streams.len(), 1);
        assert!(streams[0].url.ends_with("/page"));
    }

    #[tokio::test]
    async fn status_error_carries_code() {
        let base = serve(test_app()).await;
        let fetcher = LinkFetcher::new(&FetchConfig::default());

        let err = fetcher.fetch(&format!("{base}/missing")).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn get_json_decodes_and_reports_bad_payloads() {
        let base = serve(test_app()).await;
        let fetcher = LinkFetcher::new(&FetchConfig::default());

        let ids: Vec<u64> = fetcher.get_json(&format!("{base}/json")).await.unwrap();
        assert_eq!(ids, vec![1, 2, 3]);

        let err = fetcher
            .get_json::<Vec<u64>>(&format!("{base}/page"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidPayload { .. }));
    }
}
