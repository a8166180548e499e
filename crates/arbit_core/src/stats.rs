//! Replication statistics.
//!
//! Counters shared by the handle (producer side) and the log writer
//! (consumer side).
//!
//! # Usage
//!
//! ```rust,ignore
//! let bits = Arbit::open(1024, "bits.log")?;
//! bits.set(3);
//! bits.close()?;
//!
//! let stats = bits.stats();
//! assert_eq!(stats.records_enqueued, 2);
//! assert_eq!(stats.records_flushed, 2);
//! assert_eq!(stats.records_synced, 2);
//! ```
//!
//! `records_flushed` counts records handed to the OS by a completed flush.
//! They are only durable once `records_synced` covers them too: every
//! flush syncs under `Config::sync_on_flush(true)`, otherwise only the
//! final flush at close does.

use std::sync::atomic::{AtomicU64, Ordering};

/// Replication counters.
///
/// All counters are atomic and can be read while the writer is running.
/// Values are monotonically increasing.
#[derive(Debug, Default)]
pub struct ReplicationStats {
    /// Records accepted by the command queue.
    records_enqueued: AtomicU64,
    /// Records rejected because the writer had stopped.
    records_lost: AtomicU64,
    /// Records appended to the log buffer.
    records_written: AtomicU64,
    /// Records covered by a completed flush, synced or not.
    records_flushed: AtomicU64,
    /// Records covered by a completed sync.
    records_synced: AtomicU64,
    /// Total bytes appended.
    bytes_written: AtomicU64,
    /// Completed forced flushes (periodic and final).
    flushes: AtomicU64,
}

impl ReplicationStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_enqueue(&self) {
        self.records_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lost(&self, count: u64) {
        self.records_lost.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self, bytes: u64) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_flush(&self, records: u64) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        self.records_flushed.fetch_add(records, Ordering::Relaxed);
    }

    pub(crate) fn record_sync(&self, records: u64) {
        self.records_synced.fetch_add(records, Ordering::Relaxed);
    }

    /// Returns the number of records accepted by the queue.
    pub fn records_enqueued(&self) -> u64 {
        self.records_enqueued.load(Ordering::Relaxed)
    }

    /// Returns the number of records rejected or dropped after a writer stop.
    pub fn records_lost(&self) -> u64 {
        self.records_lost.load(Ordering::Relaxed)
    }

    /// Returns the number of records appended to the log buffer.
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    /// Returns the number of records handed to the OS by a flush.
    pub fn records_flushed(&self) -> u64 {
        self.records_flushed.load(Ordering::Relaxed)
    }

    /// Returns the number of records known to be on stable storage.
    pub fn records_synced(&self) -> u64 {
        self.records_synced.load(Ordering::Relaxed)
    }

    /// Returns the total bytes appended.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Returns the number of forced flushes.
    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all stats.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            records_enqueued: self.records_enqueued(),
            records_lost: self.records_lost(),
            records_written: self.records_written(),
            records_flushed: self.records_flushed(),
            records_synced: self.records_synced(),
            bytes_written: self.bytes_written(),
            flushes: self.flushes(),
        }
    }
}

/// A point-in-time snapshot of replication statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Records accepted by the command queue.
    pub records_enqueued: u64,
    /// Records rejected or dropped after a writer stop.
    pub records_lost: u64,
    /// Records appended to the log buffer.
    pub records_written: u64,
    /// Records handed to the OS by a completed flush. Without
    /// `sync_on_flush` these may still be in the OS page cache.
    pub records_flushed: u64,
    /// Records covered by a completed sync.
    pub records_synced: u64,
    /// Total bytes appended.
    pub bytes_written: u64,
    /// Completed forced flushes.
    pub flushes: u64,
}

impl StatsSnapshot {
    /// Records accepted but not yet flushed.
    pub fn pending(&self) -> u64 {
        self.records_enqueued.saturating_sub(self.records_flushed)
    }

    /// Records accepted but not yet synced.
    pub fn unsynced(&self) -> u64 {
        self.records_enqueued.saturating_sub(self.records_synced)
    }
}
