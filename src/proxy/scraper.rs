//! Scrape coordinator: fetch every source with bounded concurrency and
//! aggregate the validated candidates into one deduplicated set.

use crate::error::{FetchError, PipelineError};
use crate::proxy::aggregator::EndpointSet;
use crate::proxy::events::{EventSink, ScrapeEvent, ScrapeSummary, SourceOutcome, SourceProgress};
use crate::proxy::fetcher::{Fetch, HttpFetcher, DEFAULT_USER_AGENT};
use crate::proxy::parser::ProxyParser;
use crate::proxy::sources::SourceDescriptor;
use crate::Result;
use futures::future;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default timeout for source requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of sources fetched at once
const DEFAULT_CONCURRENCY: usize = 50;

/// Configuration for the scrape stage
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Timeout for each source request
    pub timeout: Duration,
    /// Number of concurrent fetches
    pub concurrency: usize,
    /// User agent for HTTP requests
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScrapeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(PipelineError::InvalidConcurrency(self.concurrency).into());
        }
        if self.timeout.is_zero() {
            return Err(PipelineError::InvalidTimeout.into());
        }
        Ok(())
    }
}

/// Drives a list of sources through a [`Fetch`] implementation
pub struct Scraper<F = HttpFetcher> {
    config: ScrapeConfig,
    fetcher: Arc<F>,
}

impl Scraper<HttpFetcher> {
    /// Create a scraper with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ScrapeConfig::default())
    }

    /// Create an HTTP scraper with custom configuration
    pub fn with_config(config: ScrapeConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(config.timeout, &config.user_agent)?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: Fetch + 'static> Scraper<F> {
    /// Create a scraper around any fetcher
    pub fn with_fetcher(config: ScrapeConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher: Arc::new(fetcher),
        }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Fetch every source and return the deduplicated candidates.
    ///
    /// Each source is handled by its own spawned task, at most `concurrency` at a
    /// time. A failing source only produces a failure event. The `Finished` event
    /// is emitted after every source has reported.
    pub async fn run<S>(&self, sources: &[SourceDescriptor], sink: &S) -> Result<ScrapeSummary>
    where
        S: EventSink<ScrapeEvent> + ?Sized,
    {
        self.config.validate()?;
        if sources.is_empty() {
            return Err(PipelineError::NoSources.into());
        }

        let start = Instant::now();
        let endpoints = Arc::new(EndpointSet::new());
        let mut sources_failed = 0;

        stream::iter(sources.iter().cloned())
            .map(|source| {
                let source_url = source.url.clone();
                let fetcher = Arc::clone(&self.fetcher);
                let endpoints = Arc::clone(&endpoints);
                let worker = tokio::spawn(async move {
                    scrape_source(fetcher.as_ref(), &source, &endpoints).await
                });
                async move {
                    let outcome = worker.await.unwrap_or_else(|e| {
                        warn!(source = %source_url, error = %e, "scrape worker failed");
                        SourceOutcome::Failure(FetchError::Other(format!("worker failed: {}", e)))
                    });
                    (source_url, outcome)
                }
            })
            .buffer_unordered(self.config.concurrency)
            .for_each(|(source_url, outcome)| {
                if matches!(outcome, SourceOutcome::Failure(_)) {
                    sources_failed += 1;
                }
                sink.emit(ScrapeEvent::Source(SourceProgress { source_url, outcome }));
                future::ready(())
            })
            .await;

        let summary = ScrapeSummary {
            endpoints: endpoints.snapshot(),
            elapsed: start.elapsed(),
            sources_ok: sources.len() - sources_failed,
            sources_failed,
        };

        sink.emit(ScrapeEvent::Finished(summary.clone()));
        Ok(summary)
    }
}

/// Fetch one source, validate its lines and merge the survivors
async fn scrape_source<F: Fetch + ?Sized>(
    fetcher: &F,
    source: &SourceDescriptor,
    endpoints: &EndpointSet,
) -> SourceOutcome {
    match fetcher.fetch(source).await {
        Ok(body) => {
            let candidates = ProxyParser::parse_string(&body);
            let accepted = candidates.len();
            let added = endpoints.merge(candidates);
            debug!(source = %source.url, accepted, added, "source merged");
            SourceOutcome::Success { accepted, added }
        }
        Err(e) => {
            debug!(source = %source.url, error = %e, "source failed");
            SourceOutcome::Failure(e)
        }
    }
}
