//! Read-only views over the live results of a finished check run

use crate::proxy::models::{ProbeResult, Protocol};
use std::collections::BTreeMap;

/// Live results ordered by latency, plus protocol and country groupings
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    all: Vec<ProbeResult>,
    by_protocol: BTreeMap<Protocol, Vec<ProbeResult>>,
    by_country: BTreeMap<String, Vec<ProbeResult>>,
}

impl ResultStore {
    /// Build the store from the terminal live-results collection
    pub fn from_live(mut live: Vec<ProbeResult>) -> Self {
        live.retain(ProbeResult::is_live);
        live.sort_by(|a, b| {
            a.latency_ms
                .cmp(&b.latency_ms)
                .then_with(|| a.candidate.cmp(&b.candidate))
        });

        let mut by_protocol: BTreeMap<Protocol, Vec<ProbeResult>> = BTreeMap::new();
        let mut by_country: BTreeMap<String, Vec<ProbeResult>> = BTreeMap::new();
        for result in &live {
            by_protocol
                .entry(result.protocol)
                .or_default()
                .push(result.clone());
            by_country
                .entry(result.country.clone())
                .or_default()
                .push(result.clone());
        }

        Self {
            all: live,
            by_protocol,
            by_country,
        }
    }

    /// All live results, fastest first
    pub fn all(&self) -> &[ProbeResult] {
        &self.all
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn by_protocol(&self) -> &BTreeMap<Protocol, Vec<ProbeResult>> {
        &self.by_protocol
    }

    /// Groups keyed by the exact country string (case-sensitive)
    pub fn by_country(&self) -> &BTreeMap<String, Vec<ProbeResult>> {
        &self.by_country
    }

    /// Results whose country contains `country` (case-insensitive) and whose
    /// latency is at most `max_latency_ms`. An empty country matches everything.
    pub fn filter(&self, country: &str, max_latency_ms: u64) -> Vec<ProbeResult> {
        let needle = country.trim().to_lowercase();
        self.all
            .iter()
            .filter(|r| needle.is_empty() || r.country.to_lowercase().contains(&needle))
            .filter(|r| r.latency_ms <= max_latency_ms)
            .cloned()
            .collect()
    }
}
