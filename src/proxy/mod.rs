//! Proxy scraping and checking
//!
//! This module provides functionality for:
//! - Fetching proxy lists from remote sources with bounded concurrency
//! - Validating and deduplicating `ip:port` candidates
//! - Probing each candidate through a geolocation reflector
//! - Grouping and exporting the live results

pub mod aggregator;
pub mod checker;
pub mod events;
pub mod export;
pub mod fetcher;
pub mod geo;
pub mod models;
pub mod parser;
pub mod prober;
pub mod scraper;
pub mod sources;
pub mod stats;
pub mod store;

pub use aggregator::EndpointSet;
pub use checker::{CheckerConfig, ProxyChecker};
pub use events::{
    CheckEvent, CheckSummary, EventSink, LogSink, NoopSink, ProbeProgress, ScrapeEvent,
    ScrapeSummary, SourceOutcome, SourceProgress,
};
pub use fetcher::{Fetch, HttpFetcher};
pub use geo::{GeoLocation, GeoLocator};
pub use models::{Anonymity, EndpointCandidate, Outcome, ProbeResult, Protocol};
pub use parser::ProxyParser;
pub use prober::{HttpProber, Probe};
pub use scraper::{ScrapeConfig, Scraper};
pub use sources::{SourceDescriptor, SourceFormat};
pub use stats::{CheckLedger, RunStatistics};
pub use store::ResultStore;
