//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Shared {
    flushed: RwLock<Vec<u8>>,
    flushes: AtomicU64,
    syncs: AtomicU64,
    closed: AtomicBool,
}

/// An in-memory log backend.
///
/// Appended bytes are held in a private buffer and only become visible
/// through a [`MemoryHandle`] once flushed, which mirrors a buffered file
/// closely enough to observe flush timing in tests.
///
/// # Example
///
/// ```rust
/// use arbit_storage::{StorageBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// let handle = backend.handle();
///
/// backend.append(b"test data").unwrap();
/// assert!(handle.data().is_empty());
///
/// backend.flush().unwrap();
/// assert_eq!(handle.data(), b"test data");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    shared: Arc<Shared>,
    pending: Vec<u8>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle that observes this backend after it is moved away.
    #[must_use]
    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    fn check_open(&self) -> StorageResult<()> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(StorageError::Closed);
        }
        Ok(())
    }

    fn drain_pending(&mut self) {
        if !self.pending.is_empty() {
            self.shared.flushed.write().append(&mut self.pending);
        }
        self.shared.flushes.fetch_add(1, Ordering::Relaxed);
    }
}

impl StorageBackend for InMemoryBackend {
    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        self.check_open()?;
        let offset = self.size();
        self.pending.extend_from_slice(data);
        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.check_open()?;
        self.drain_pending();
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.check_open()?;
        self.drain_pending();
        self.shared.syncs.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn size(&self) -> u64 {
        (self.shared.flushed.read().len() + self.pending.len()) as u64
    }

    fn close(&mut self) -> StorageResult<()> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Ok(());
        }
        self.sync()?;
        self.shared.closed.store(true, Ordering::Release);
        Ok(())
    }
}

/// Read-only view of an [`InMemoryBackend`].
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    shared: Arc<Shared>,
}

impl MemoryHandle {
    /// Returns a copy of all flushed bytes.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.shared.flushed.read().clone()
    }

    /// Number of flushed bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.flushed.read().len()
    }

    /// Whether nothing has been flushed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of flush or sync calls.
    #[must_use]
    pub fn flushes(&self) -> u64 {
        self.shared.flushes.load(Ordering::Relaxed)
    }

    /// Number of sync calls.
    #[must_use]
    pub fn syncs(&self) -> u64 {
        self.shared.syncs.load(Ordering::Relaxed)
    }

    /// Whether the backend has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}
