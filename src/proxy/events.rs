//! Progress events emitted by the scrape and check stages
//!
//! Coordinators never render anything themselves. They push typed events into an
//! [`EventSink`]; a presentation layer (console, TUI, log file) consumes them.
//! Within a stage, per-unit events arrive in completion order and the
//! `Finished` event is always emitted once, last.

use crate::error::FetchError;
use crate::proxy::models::{EndpointCandidate, ProbeResult};
use crate::proxy::stats::RunStatistics;
use parking_lot::Mutex;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// What happened to one source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SourceOutcome {
    /// `accepted` lines passed validation, `added` of them were new to the set
    Success { accepted: usize, added: usize },
    Failure(FetchError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceProgress {
    pub source_url: String,
    pub outcome: SourceOutcome,
}

/// Terminal result of a scrape run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeSummary {
    /// Deduplicated candidates, sorted
    pub endpoints: Vec<EndpointCandidate>,
    pub elapsed: Duration,
    pub sources_ok: usize,
    pub sources_failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScrapeEvent {
    Source(SourceProgress),
    Finished(ScrapeSummary),
}

/// Outcome of probing one candidate, with the statistics right after it was counted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeProgress {
    pub candidate: EndpointCandidate,
    /// `None` when the candidate is dead
    pub result: Option<ProbeResult>,
    pub stats: RunStatistics,
}

/// Terminal result of a check run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckSummary {
    /// Live results in completion order
    pub live: Vec<ProbeResult>,
    pub stats: RunStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CheckEvent {
    Probed(ProbeProgress),
    Finished(CheckSummary),
}

/// Receiver of stage events
pub trait EventSink<E>: Send + Sync {
    fn emit(&self, event: E);
}

/// Forward events into a channel; a dropped receiver silently discards them
impl<E: Send> EventSink<E> for UnboundedSender<E> {
    fn emit(&self, event: E) {
        let _ = self.send(event);
    }
}

/// Collect events in memory
impl<E: Send> EventSink<E> for Mutex<Vec<E>> {
    fn emit(&self, event: E) {
        self.lock().push(event);
    }
}

/// Discard every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl<E> EventSink<E> for NoopSink {
    fn emit(&self, _event: E) {}
}

/// Render events as log lines
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink<ScrapeEvent> for LogSink {
    fn emit(&self, event: ScrapeEvent) {
        match event {
            ScrapeEvent::Source(progress) => match progress.outcome {
                SourceOutcome::Success { accepted, added } => {
                    info!(
                        source = %progress.source_url,
                        accepted,
                        "✓ scraped (+{})",
                        added
                    );
                }
                SourceOutcome::Failure(error) => {
                    warn!(source = %progress.source_url, "✗ scrape failed: {}", error);
                }
            },
            ScrapeEvent::Finished(summary) => {
                info!(
                    sources_ok = summary.sources_ok,
                    sources_failed = summary.sources_failed,
                    "Scraped {} unique proxies in {:.2}s",
                    summary.endpoints.len(),
                    summary.elapsed.as_secs_f64()
                );
            }
        }
    }
}

impl EventSink<CheckEvent> for LogSink {
    fn emit(&self, event: CheckEvent) {
        match event {
            CheckEvent::Probed(progress) => {
                let stats = &progress.stats;
                match progress.result {
                    Some(result) => info!(
                        checked = stats.checked,
                        total = stats.total,
                        "LIVE {} {} {}ms {}",
                        result.candidate,
                        result.protocol.label(),
                        result.latency_ms,
                        result.country
                    ),
                    None => debug!(
                        checked = stats.checked,
                        total = stats.total,
                        "dead {}",
                        progress.candidate
                    ),
                }
            }
            CheckEvent::Finished(summary) => {
                let stats = &summary.stats;
                info!(
                    total = stats.total,
                    live = stats.live,
                    dead = stats.dead,
                    cpm = stats.checks_per_minute(),
                    "Check completed: {}/{} live ({}%)",
                    stats.live,
                    stats.total,
                    stats.success_rate()
                );
            }
        }
    }
}
