//! Deduplicating aggregation of scraped candidates

use crate::proxy::models::EndpointCandidate;
use parking_lot::Mutex;
use std::collections::HashSet;

/// Set of unique candidates, shared by all fetch workers of a scrape run
#[derive(Debug, Default)]
pub struct EndpointSet {
    inner: Mutex<HashSet<EndpointCandidate>>,
}

impl EndpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a batch and return how many entries were new.
    ///
    /// The count is taken inside the same critical section as the insertions, so
    /// concurrent callers never see each other's additions in their own count.
    pub fn merge<I>(&self, candidates: I) -> usize
    where
        I: IntoIterator<Item = EndpointCandidate>,
    {
        let mut set = self.inner.lock();
        candidates
            .into_iter()
            .filter(|candidate| set.insert(candidate.clone()))
            .count()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn contains(&self, candidate: &EndpointCandidate) -> bool {
        self.inner.lock().contains(candidate)
    }

    /// Sorted copy of the current members
    pub fn snapshot(&self) -> Vec<EndpointCandidate> {
        let mut members: Vec<_> = self.inner.lock().iter().cloned().collect();
        members.sort();
        members
    }

    /// Consume the set, returning its members sorted
    pub fn into_sorted_vec(self) -> Vec<EndpointCandidate> {
        let mut members: Vec<_> = self.inner.into_inner().into_iter().collect();
        members.sort();
        members
    }
}

impl FromIterator<EndpointCandidate> for EndpointSet {
    fn from_iter<T: IntoIterator<Item = EndpointCandidate>>(iter: T) -> Self {
        let set = Self::new();
        set.merge(iter);
        set
    }
}
