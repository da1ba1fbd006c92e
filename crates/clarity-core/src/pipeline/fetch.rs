//! Remote image retrieval.
//!
//! One GET per request, bounded by a whole-request timeout and a body size
//! cap. The declared content type is ignored: whatever the server sends is
//! handed to the analyzer, which decides whether it is an image.

use async_trait::async_trait;
use futures_util::StreamExt;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::{PipelineError, PipelineResult};

/// Anything that can turn a URL into raw image bytes.
///
/// The HTTP implementation is [`HttpFetcher`]; tests substitute in-memory sources.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Retrieve the bytes behind `url`. Single attempt, no retries.
    async fn fetch(&self, url: &str) -> PipelineResult<Vec<u8>>;
}

/// Fetches images over HTTP(S) with `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_body_mb: u64,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> PipelineResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PipelineError::Unexpected {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            timeout: Duration::from_millis(config.timeout_ms),
            max_body_mb: config.max_body_mb,
        })
    }

    fn max_body_bytes(&self) -> u64 {
        self.max_body_mb.saturating_mul(1024 * 1024)
    }

    fn map_reqwest_error(&self, url: &str, e: reqwest::Error) -> PipelineError {
        if e.is_timeout() {
            PipelineError::Timeout {
                url: url.to_string(),
                stage: "fetch".to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            PipelineError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ImageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> PipelineResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch {
                url: url.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let max_bytes = self.max_body_bytes();
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(PipelineError::BodyTooLarge {
                url: url.to_string(),
                max_mb: self.max_body_mb,
            });
        }

        let mut body = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.map_reqwest_error(url, e))?;
            if body.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(PipelineError::BodyTooLarge {
                    url: url.to_string(),
                    max_mb: self.max_body_mb,
                });
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(url, bytes = body.len(), "Fetched image");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{serve_once, serve_silent, unreachable_url};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body_regardless_of_content_type() {
        let url = serve_once("200 OK", "text/html", b"<html>hi</html>".to_vec()).await;
        let bytes = fetcher().fetch(&url).await.unwrap();
        assert_eq!(bytes, b"<html>hi</html>");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let url = serve_once("404 Not Found", "text/plain", b"nope".to_vec()).await;
        let err = fetcher().fetch(&url).await.unwrap_err();
        match err {
            PipelineError::Fetch { message, .. } => assert!(message.contains("404")),
            other => panic!("expected fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_error() {
        let err = fetcher().fetch(&unreachable_url()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_fetch_malformed_url_is_error() {
        let err = fetcher().fetch("not a url").await.unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let config = FetchConfig {
            timeout_ms: 200,
            ..FetchConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        let url = serve_silent().await;

        let err = fetcher.fetch(&url).await.unwrap_err();
        match err {
            PipelineError::Timeout {
                stage, timeout_ms, ..
            } => {
                assert_eq!(stage, "fetch");
                assert_eq!(timeout_ms, 200);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_body() {
        let config = FetchConfig {
            max_body_mb: 1,
            ..FetchConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        let url = serve_once("200 OK", "image/png", vec![0u8; 1024 * 1024 + 1]).await;

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, PipelineError::BodyTooLarge { max_mb: 1, .. }));
    }
}
