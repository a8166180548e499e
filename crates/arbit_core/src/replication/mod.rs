//! Asynchronous replication of bit vector mutations to a durable log.
//!
//! Mutating calls hand a [`CommandRecord`](arbit_codec::CommandRecord) to the
//! [`CommandQueue`](crate::queue::CommandQueue); a single [`LogWriter`]
//! thread drains it, encodes each record into its 9-byte form and appends it
//! to the storage backend.
//!
//! ## Durability
//!
//! Appends are buffered. Buffered records become durable when:
//!
//! - the periodic flush deadline passes (every `Config::flush_interval`)
//! - the writer shuts down (final flush and sync before the backend closes)
//!
//! A crash loses at most one flush interval of accepted records.
//!
//! ## Failure
//!
//! The writer stops writing on the first storage or encode error. The
//! failure is stored in [`ReplicationState`] for the handle to report. Until
//! the stop signal arrives the writer keeps taking records off the queue and
//! discards them, so producers never block on a dead log and every record
//! accepted after the failure is counted as lost.

mod writer;

pub(crate) use writer::LogWriter;

use crate::error::ReplicationFailure;
use crate::stats::ReplicationStats;
use parking_lot::Mutex;

/// State shared between a handle and its log writer.
#[derive(Debug, Default)]
pub(crate) struct ReplicationState {
    pub(crate) stats: ReplicationStats,
    failure: Mutex<Option<ReplicationFailure>>,
}

impl ReplicationState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records the error that stopped the writer. The first failure wins.
    pub(crate) fn fail(&self, failure: ReplicationFailure) {
        let mut slot = self.failure.lock();
        if slot.is_none() {
            self.stats.record_lost(failure.lost_records);
            *slot = Some(failure);
        }
    }

    /// Counts records dropped after the failure.
    pub(crate) fn discard(&self, records: u64) {
        self.stats.record_lost(records);
        if let Some(failure) = self.failure.lock().as_mut() {
            failure.lost_records += records;
        }
    }

    pub(crate) fn failure(&self) -> Option<ReplicationFailure> {
        self.failure.lock().clone()
    }

    pub(crate) fn has_failed(&self) -> bool {
        self.failure.lock().is_some()
    }
}
