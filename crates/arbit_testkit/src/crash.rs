//! Crash and I/O failure simulation.
//!
//! [`CrashableBackend`] wraps a real backend and starts failing once a byte
//! budget is used up (optionally writing the partial record that straddles
//! the limit), or on demand at the next flush. Its [`CrashControl`] stays
//! with the test after the backend is handed to a writer.
//!
//! [`run_crash_scenario`] drives a handle into such a failure and reports
//! what the log looks like afterwards.

use crate::fixtures::TempLog;
use arbit_core::{audit_log, Arbit, Config, CoreError, LogSummary};
use arbit_storage::{FileBackend, StorageBackend, StorageError, StorageResult};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Faults {
    crash_after_bytes: AtomicUsize,
    bytes_written: AtomicUsize,
    crashed: AtomicBool,
    fail_on_flush: AtomicBool,
}

impl Faults {
    fn crash(&self, what: &str) -> StorageError {
        self.crashed.store(true, Ordering::SeqCst);
        StorageError::Io(io::Error::other(format!("simulated crash during {what}")))
    }
}

/// A storage backend wrapper that can simulate crashes.
pub struct CrashableBackend {
    inner: Box<dyn StorageBackend>,
    faults: Arc<Faults>,
}

impl CrashableBackend {
    /// Creates a new crashable backend wrapping an inner backend.
    pub fn new(inner: Box<dyn StorageBackend>) -> Self {
        Self {
            inner,
            faults: Arc::new(Faults {
                crash_after_bytes: AtomicUsize::new(usize::MAX),
                bytes_written: AtomicUsize::new(0),
                crashed: AtomicBool::new(false),
                fail_on_flush: AtomicBool::new(false),
            }),
        }
    }

    /// Returns a control that outlives moving the backend into a writer.
    pub fn control(&self) -> CrashControl {
        CrashControl {
            faults: Arc::clone(&self.faults),
        }
    }
}

/// Remote control for a [`CrashableBackend`].
#[derive(Debug, Clone)]
pub struct CrashControl {
    faults: Arc<Faults>,
}

impl CrashControl {
    /// Sets the backend to crash after writing the specified number of bytes.
    pub fn crash_after(&self, bytes: usize) {
        self.faults.crash_after_bytes.store(bytes, Ordering::SeqCst);
    }

    /// Sets whether flush and sync should fail.
    pub fn set_fail_on_flush(&self, fail: bool) {
        self.faults.fail_on_flush.store(fail, Ordering::SeqCst);
    }

    /// Returns whether the backend has crashed.
    pub fn has_crashed(&self) -> bool {
        self.faults.crashed.load(Ordering::SeqCst)
    }

    /// Bytes offered to the backend so far, including rejected ones.
    pub fn bytes_offered(&self) -> usize {
        self.faults.bytes_written.load(Ordering::SeqCst)
    }
}

impl StorageBackend for CrashableBackend {
    fn append(&mut self, bytes: &[u8]) -> StorageResult<u64> {
        let current = self.faults.bytes_written.fetch_add(bytes.len(), Ordering::SeqCst);
        let crash_threshold = self.faults.crash_after_bytes.load(Ordering::SeqCst);

        if current >= crash_threshold {
            return Err(self.faults.crash("write"));
        }

        // The write straddles the threshold: keep the part before it.
        if current + bytes.len() > crash_threshold {
            let partial_len = crash_threshold - current;
            let _ = self.inner.append(&bytes[..partial_len]);
            return Err(self.faults.crash("partial write"));
        }

        self.inner.append(bytes)
    }

    fn flush(&mut self) -> StorageResult<()> {
        if self.faults.fail_on_flush.load(Ordering::SeqCst) {
            return Err(self.faults.crash("flush"));
        }
        self.inner.flush()
    }

    fn sync(&mut self) -> StorageResult<()> {
        if self.faults.fail_on_flush.load(Ordering::SeqCst) {
            return Err(self.faults.crash("sync"));
        }
        self.inner.sync()
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn close(&mut self) -> StorageResult<()> {
        self.inner.close()
    }
}

/// Outcome of a crash scenario.
#[derive(Debug)]
pub struct CrashReport {
    /// Records the handle accepted, `INIT` included.
    pub accepted: u64,
    /// Accepted records reported as not durable.
    pub lost: u64,
    /// The error `close` returned, if any.
    pub close_error: Option<CoreError>,
    /// Audit of the log left on disk.
    pub audit: LogSummary,
}

/// Opens a file log that crashes after `crash_after` bytes, sets bits
/// `0..mutations`, closes, and audits what survived.
///
/// The buffered file writer is dropped without a final sync when the writer
/// stops, which is how a partial record ends up on disk.
///
/// # Panics
///
/// Panics if the fixture cannot be set up or the surviving log fails audit.
pub fn run_crash_scenario(length: u64, mutations: u64, crash_after: usize) -> CrashReport {
    let log = TempLog::new();
    let file = FileBackend::create(log.path()).expect("Failed to create log");
    let backend = CrashableBackend::new(Box::new(file));
    backend.control().crash_after(crash_after);

    let bits = Arbit::with_backend(length, Box::new(backend), Config::default())
        .expect("Failed to open bit vector");
    for pos in 0..mutations {
        bits.set(pos % length);
    }
    let close_error = bits.close().err();
    let stats = bits.stats();
    drop(bits);

    CrashReport {
        accepted: stats.records_enqueued,
        lost: stats.records_lost,
        close_error,
        audit: audit_log(log.path()).expect("Surviving log failed audit"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbit_codec::RECORD_SIZE;
    use arbit_storage::InMemoryBackend;

    #[test]
    fn crash_mid_record_leaves_partial_tail() {
        let report = run_crash_scenario(100, 10, 3 * RECORD_SIZE + 4);

        assert!(matches!(report.close_error, Some(CoreError::Replication(_))));
        assert_eq!(report.accepted, 11);
        assert_eq!(report.audit.records, 3);
        assert_eq!(report.audit.trailing_bytes, 4);
        assert_eq!(report.lost, 11);
    }

    #[test]
    fn no_crash_within_budget() {
        let report = run_crash_scenario(100, 10, usize::MAX);
        assert!(report.close_error.is_none());
        assert_eq!(report.audit.records, 11);
        assert_eq!(report.lost, 0);
    }

    #[test]
    fn failing_sync_is_reported_by_close() {
        let backend = CrashableBackend::new(Box::new(InMemoryBackend::new()));
        let control = backend.control();
        control.set_fail_on_flush(true);

        let bits = Arbit::with_backend(8, Box::new(backend), Config::default()).unwrap();
        bits.set(1);
        let err = bits.close().unwrap_err();

        assert!(control.has_crashed());
        assert!(err.to_string().contains("simulated crash during sync"));
        assert_eq!(bits.last_error().unwrap().lost_records, 2);
    }

    #[test]
    fn control_tracks_offered_bytes() {
        let mut backend = CrashableBackend::new(Box::new(InMemoryBackend::new()));
        let control = backend.control();
        control.crash_after(10);

        backend.append(&[0; 9]).unwrap();
        assert!(backend.append(&[0; 9]).is_err());
        assert!(control.has_crashed());
        assert_eq!(control.bytes_offered(), 18);
        assert_eq!(backend.size(), 10);
    }
}
