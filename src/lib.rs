//! Proxy Master - Proxy Scraper and Checker
//!
//! Collects proxy candidates from many remote text lists, deduplicates them and
//! checks each one by fetching an IP-geolocation reflector through it. Both
//! stages run as bounded worker pools and report progress through typed events.

pub mod error;
pub mod proxy;

pub use error::{FetchError, PipelineError, ProbeError};
pub use proxy::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
