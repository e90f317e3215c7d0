//! Sync engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Push events merged into the store
    pub events_applied: AtomicU64,
    /// Push payloads dropped as malformed
    pub events_dropped: AtomicU64,
    /// Push connections successfully opened
    pub connections_opened: AtomicU64,
    /// Reconnects scheduled after an unexpected closure
    pub reconnects_scheduled: AtomicU64,
    /// Pages written into the store
    pub pages_loaded: AtomicU64,
    /// Fetch responses discarded because the session changed
    pub stale_responses: AtomicU64,
    /// Mutation requests that failed after the optimistic write
    pub mutations_failed: AtomicU64,
}

impl EngineMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a merged push event
    pub fn event_applied(&self) {
        self.events_applied.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dropped push payload
    pub fn event_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an opened push connection
    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a scheduled reconnect
    pub fn reconnect_scheduled(&self) {
        self.reconnects_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a page written into the store
    pub fn page_loaded(&self) {
        self.pages_loaded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a discarded stale response
    pub fn stale_response(&self) {
        self.stale_responses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed mutation request
    pub fn mutation_failed(&self) {
        self.mutations_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_applied: self.events_applied.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            reconnects_scheduled: self.reconnects_scheduled.load(Ordering::Relaxed),
            pages_loaded: self.pages_loaded.load(Ordering::Relaxed),
            stale_responses: self.stale_responses.load(Ordering::Relaxed),
            mutations_failed: self.mutations_failed.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Push events merged into the store
    pub events_applied: u64,
    /// Push payloads dropped as malformed
    pub events_dropped: u64,
    /// Push connections successfully opened
    pub connections_opened: u64,
    /// Reconnects scheduled after an unexpected closure
    pub reconnects_scheduled: u64,
    /// Pages written into the store
    pub pages_loaded: u64,
    /// Fetch responses discarded because the session changed
    pub stale_responses: u64,
    /// Mutation requests that failed after the optimistic write
    pub mutations_failed: u64,
}
