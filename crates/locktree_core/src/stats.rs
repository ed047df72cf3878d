//! Engine statistics.
//!
//! Counters are atomic and may be read while other callers are acquiring
//! and releasing.
//!
//! ```rust,ignore
//! let stats = engine.stats();
//! println!("granted immediately: {}", stats.immediate_grants);
//! println!("still waiting: {}", stats.pending_requests());
//! ```

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live lock engine counters.
#[derive(Debug, Default)]
pub struct LockStats {
    /// Requests added to the queue.
    requests_enqueued: AtomicU64,
    /// Requests granted within the `acquire` call that issued them.
    immediate_grants: AtomicU64,
    /// Requests granted by a later `acquire` or `release`.
    deferred_grants: AtomicU64,
    /// Locks removed from the tree.
    releases: AtomicU64,
    /// Release calls for handles the engine did not hold.
    unknown_releases: AtomicU64,
    /// Requests discarded because their future was dropped.
    abandoned_requests: AtomicU64,
    /// Scheduling passes run.
    scheduling_passes: AtomicU64,
}

impl LockStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_enqueue(&self) {
        self.requests_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_grant(&self, immediate: bool) {
        if immediate {
            self.immediate_grants.fetch_add(1, Ordering::Relaxed);
        } else {
            self.deferred_grants.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unknown_release(&self) {
        self.unknown_releases.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_abandoned(&self) {
        self.abandoned_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_pass(&self) {
        self.scheduling_passes.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests_enqueued: self.requests_enqueued.load(Ordering::Relaxed),
            immediate_grants: self.immediate_grants.load(Ordering::Relaxed),
            deferred_grants: self.deferred_grants.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            unknown_releases: self.unknown_releases.load(Ordering::Relaxed),
            abandoned_requests: self.abandoned_requests.load(Ordering::Relaxed),
            scheduling_passes: self.scheduling_passes.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`LockStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Requests added to the queue.
    pub requests_enqueued: u64,
    /// Requests granted within the `acquire` call that issued them.
    pub immediate_grants: u64,
    /// Requests granted by a later `acquire` or `release`.
    pub deferred_grants: u64,
    /// Locks removed from the tree.
    pub releases: u64,
    /// Release calls for handles the engine did not hold.
    pub unknown_releases: u64,
    /// Requests discarded because their future was dropped.
    pub abandoned_requests: u64,
    /// Scheduling passes run.
    pub scheduling_passes: u64,
}

impl StatsSnapshot {
    /// Total grants, immediate or deferred.
    #[must_use]
    pub fn grants(&self) -> u64 {
        self.immediate_grants + self.deferred_grants
    }

    /// Requests neither granted nor abandoned yet.
    #[must_use]
    pub fn pending_requests(&self) -> u64 {
        self.requests_enqueued
            .saturating_sub(self.grants())
            .saturating_sub(self.abandoned_requests)
    }

    /// Locks granted and not yet released.
    #[must_use]
    pub fn held_locks(&self) -> u64 {
        self.grants().saturating_sub(self.releases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = LockStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn derived_counts() {
        let stats = LockStats::new();
        for _ in 0..4 {
            stats.record_enqueue();
        }
        stats.record_grant(true);
        stats.record_grant(false);
        stats.record_abandoned();
        stats.record_release();

        let snap = stats.snapshot();
        assert_eq!(snap.grants(), 2);
        assert_eq!(snap.pending_requests(), 1);
        assert_eq!(snap.held_locks(), 1);
    }

    #[test]
    fn snapshot_serializes() {
        let stats = LockStats::new();
        stats.record_pass();
        let json = serde_json::to_string(&stats.snapshot()).unwrap();
        assert!(json.contains("\"scheduling_passes\":1"));
    }
}
