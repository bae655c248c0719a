//! Running statistics for a check run

use crate::proxy::models::ProbeResult;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters of one check run.
///
/// `checked == live + dead` and `checked <= total` hold for every value handed out
/// by [`CheckLedger`], since all counters move in a single critical section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub total: usize,
    pub checked: usize,
    pub live: usize,
    pub dead: usize,
    pub started_at: DateTime<Utc>,
}

impl RunStatistics {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            checked: 0,
            live: 0,
            dead: 0,
            started_at: Utc::now(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.checked == self.total
    }

    /// Live share of the total, in percent rounded to two decimals
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.live as f64 / self.total as f64 * 10_000.0).round() / 100.0
    }

    pub fn elapsed(&self) -> Duration {
        (Utc::now() - self.started_at).to_std().unwrap_or_default()
    }

    /// Checks per minute since the run started
    pub fn checks_per_minute(&self) -> u64 {
        let secs = self.elapsed().as_secs_f64();
        if secs <= 0.0 {
            return 0;
        }
        (self.checked as f64 / secs * 60.0) as u64
    }
}

struct LedgerState {
    stats: RunStatistics,
    live: Vec<ProbeResult>,
}

/// Shared statistics and live results of a check run, guarded by one lock
pub struct CheckLedger {
    state: Mutex<LedgerState>,
}

impl CheckLedger {
    pub fn new(total: usize) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                stats: RunStatistics::new(total),
                live: Vec::new(),
            }),
        }
    }

    /// Record one probe outcome and return the statistics right after it.
    ///
    /// `Some` counts as live and is kept; `None` counts as dead.
    pub fn record(&self, result: Option<ProbeResult>) -> RunStatistics {
        let mut state = self.state.lock();
        debug_assert!(state.stats.checked < state.stats.total);

        state.stats.checked += 1;
        match result {
            Some(result) => {
                state.stats.live += 1;
                state.live.push(result);
            }
            None => state.stats.dead += 1,
        }
        state.stats.clone()
    }

    pub fn snapshot(&self) -> RunStatistics {
        self.state.lock().stats.clone()
    }

    /// Statistics and the live results recorded so far; the live list is moved out
    pub fn take_parts(&self) -> (RunStatistics, Vec<ProbeResult>) {
        let mut state = self.state.lock();
        let live = std::mem::take(&mut state.live);
        (state.stats.clone(), live)
    }
}
