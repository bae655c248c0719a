//! Check coordinator: probe every candidate with bounded concurrency while
//! keeping running statistics and the live results

use crate::error::PipelineError;
use crate::proxy::events::{CheckEvent, CheckSummary, EventSink, ProbeProgress};
use crate::proxy::geo::GeoLocator;
use crate::proxy::models::{EndpointCandidate, Protocol};
use crate::proxy::prober::{HttpProber, Probe, DEFAULT_REFLECTOR_URL};
use crate::proxy::stats::CheckLedger;
use crate::Result;
use futures::future;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Default timeout for proxy checks in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of concurrent checks
const DEFAULT_CONCURRENCY: usize = 150;

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each proxy check
    pub timeout: Duration,
    /// Number of concurrent checks
    pub concurrency: usize,
    /// Transport used to reach the reflector through each candidate
    pub protocol_hint: Protocol,
    /// Geolocation endpoint fetched through each candidate
    pub reflector_url: String,
    /// Path to MMDB file for filling unknown locations (optional)
    pub mmdb_path: Option<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            protocol_hint: Protocol::Http,
            reflector_url: DEFAULT_REFLECTOR_URL.to_string(),
            mmdb_path: None,
        }
    }
}

impl CheckerConfig {
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

    pub fn with_protocol_hint(mut self, hint: Protocol) -> Self {
        self.protocol_hint = hint;
        self
    }

    pub fn with_reflector_url(mut self, url: String) -> Self {
        self.reflector_url = url;
        self
    }

    pub fn with_mmdb_path(mut self, path: String) -> Self {
        self.mmdb_path = Some(path);
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

/// Proxy checker driving candidates through a [`Probe`] implementation
pub struct ProxyChecker<P = HttpProber> {
    config: CheckerConfig,
    prober: Arc<P>,
}

impl ProxyChecker<HttpProber> {
    /// Create a new proxy checker with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(CheckerConfig::default())
    }

    /// Create a new proxy checker with custom configuration
    pub fn with_config(config: CheckerConfig) -> Result<Self> {
        config.validate()?;

        let mut prober = HttpProber::new(
            config.timeout,
            config.protocol_hint,
            config.reflector_url.clone(),
        );

        if let Some(path) = &config.mmdb_path {
            match GeoLocator::from_path(path) {
                Ok(geo) => prober = prober.with_geo_locator(geo),
                Err(e) => warn!(path = %path, error = %e, "geolocation database unavailable"),
            }
        }

        Ok(Self::with_prober(config, prober))
    }
}

impl<P: Probe + 'static> ProxyChecker<P> {
    /// Create a checker around any prober
    pub fn with_prober(config: CheckerConfig, prober: P) -> Self {
        Self {
            config,
            prober: Arc::new(prober),
        }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Probe every candidate once and return the live results with the final
    /// statistics.
    ///
    /// Each probe runs in its own spawned task, at most `concurrency` at a time,
    /// and is counted in the shared ledger from that task. Every probe emits a
    /// `Probed` event carrying the statistics right after it was counted;
    /// `Finished` follows once all probes are done.
    pub async fn run<S>(&self, candidates: Vec<EndpointCandidate>, sink: &S) -> Result<CheckSummary>
    where
        S: EventSink<CheckEvent> + ?Sized,
    {
        self.config.validate()?;
        if candidates.is_empty() {
            return Err(PipelineError::NoCandidates.into());
        }

        let ledger = Arc::new(CheckLedger::new(candidates.len()));

        stream::iter(candidates)
            .map(|candidate| {
                let prober = Arc::clone(&self.prober);
                let worker_ledger = Arc::clone(&ledger);
                let target = candidate.clone();
                let worker = tokio::spawn(async move {
                    let result = prober.probe(&target).await;
                    let stats = worker_ledger.record(result.clone());
                    (result, stats)
                });

                let ledger = Arc::clone(&ledger);
                async move {
                    let (result, stats) = match worker.await {
                        Ok(recorded) => recorded,
                        Err(e) => {
                            warn!(candidate = %candidate, error = %e, "probe worker failed");
                            (None, ledger.record(None))
                        }
                    };
                    ProbeProgress {
                        candidate,
                        result,
                        stats,
                    }
                }
            })
            .buffer_unordered(self.config.concurrency)
            .for_each(|progress| {
                sink.emit(CheckEvent::Probed(progress));
                future::ready(())
            })
            .await;

        let (stats, live) = ledger.take_parts();
        let summary = CheckSummary { live, stats };

        sink.emit(CheckEvent::Finished(summary.clone()));
        Ok(summary)
    }
}
