//! Metrics registry for objindex
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::json;

/// Operational counters shared by the index components and the HTTP server.
///
/// Relaxed ordering: counters are independent and only ever read for reporting.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Creation notifications handed to the Indexer
    notifications_received: AtomicU64,
    /// Index entries committed
    entries_indexed: AtomicU64,
    /// Notifications no-oped by a tombstone
    suppressed: AtomicU64,
    /// Deletion requests handed to the Remover
    removals_received: AtomicU64,
    /// Tombstones committed
    tombstones_written: AtomicU64,
    /// Invocations ending in Conflict
    conflicts: AtomicU64,
    /// Conflicted transactions resubmitted
    retries: AtomicU64,
    /// Encoding and transport errors
    internal_errors: AtomicU64,
    /// Invocations without a configured table
    config_errors: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_notifications_received(&self) {
        self.notifications_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_entries_indexed(&self) {
        self.entries_indexed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_removals_received(&self) {
        self.removals_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tombstones_written(&self) {
        self.tombstones_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_conflicts(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_retries(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_internal_errors(&self) {
        self.internal_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_config_errors(&self) {
        self.config_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn entries_indexed(&self) -> u64 {
        self.entries_indexed.load(Ordering::Relaxed)
    }

    pub fn suppressed(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    pub fn tombstones_written(&self) -> u64 {
        self.tombstones_written.load(Ordering::Relaxed)
    }

    pub fn conflicts(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }

    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    pub fn config_errors(&self) -> u64 {
        self.config_errors.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            notifications_received: self.notifications_received.load(Ordering::Relaxed),
            entries_indexed: self.entries_indexed(),
            suppressed: self.suppressed(),
            removals_received: self.removals_received.load(Ordering::Relaxed),
            tombstones_written: self.tombstones_written(),
            conflicts: self.conflicts(),
            retries: self.retries(),
            internal_errors: self.internal_errors.load(Ordering::Relaxed),
            config_errors: self.config_errors(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!(self.snapshot())
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub notifications_received: u64,
    pub entries_indexed: u64,
    pub suppressed: u64,
    pub removals_received: u64,
    pub tombstones_written: u64,
    pub conflicts: u64,
    pub retries: u64,
    pub internal_errors: u64,
    pub config_errors: u64,
}
