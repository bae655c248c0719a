//! Error types for the scrape and check pipeline
//!
//! Per-unit failures ([`FetchError`], [`ProbeError`]) are recovered inside the
//! coordinators and only ever surface as events. [`PipelineError`] covers the
//! conditions that abort a run before any worker starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal conditions reported to the caller of a stage
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no proxy sources configured")]
    NoSources,
    #[error("no proxy candidates to check")]
    NoCandidates,
    #[error("invalid concurrency: {0} (must be at least 1)")]
    InvalidConcurrency(usize),
    #[error("invalid timeout: must be greater than zero")]
    InvalidTimeout,
    #[error("cannot read input {path}: {reason}")]
    UnreadableInput { path: String, reason: String },
}

/// Failure of a single source retrieval
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed")]
    ConnectionRefused,
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::ConnectionRefused
        } else if let Some(status) = e.status() {
            FetchError::HttpStatus(status.as_u16())
        } else {
            FetchError::Other(e.to_string())
        }
    }
}

/// Failure of a single probe through a candidate
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeError {
    #[error("probe timed out")]
    Timeout,
    #[error("connection through proxy failed")]
    ConnectionRefused,
    #[error("reflector answered HTTP {0}")]
    HttpStatus(u16),
    #[error("reflector body could not be decoded: {0}")]
    Decode(String),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProbeError::Timeout
        } else if e.is_connect() {
            ProbeError::ConnectionRefused
        } else if let Some(status) = e.status() {
            ProbeError::HttpStatus(status.as_u16())
        } else {
            ProbeError::Other(e.to_string())
        }
    }
}
