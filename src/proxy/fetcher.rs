//! Single-shot retrieval of proxy list sources

use crate::error::FetchError;
use crate::proxy::sources::SourceDescriptor;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Default user agent for HTTP requests
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Retrieves the raw text of one source
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Perform one retrieval. No retries: a failure is final for this run.
    async fn fetch(&self, source: &SourceDescriptor) -> std::result::Result<String, FetchError>;
}

/// HTTP GET fetcher with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        // sources are fetched directly, never through an environment proxy
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .no_proxy()
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, source: &SourceDescriptor) -> std::result::Result<String, FetchError> {
        let response = self.client.get(&source.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_fetcher_creation() {
        assert!(HttpFetcher::new(Duration::from_secs(5), DEFAULT_USER_AGENT).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_other() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1), DEFAULT_USER_AGENT).unwrap();
        let err = fetcher
            .fetch(&SourceDescriptor::plain("not a url"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Other(_)));
    }
}
