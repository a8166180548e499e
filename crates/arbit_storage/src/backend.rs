//! Storage backend trait definition.

use crate::error::StorageResult;

/// An append-only byte sink for the replication log.
///
/// Backends are **opaque byte stores**: they never interpret record bytes.
/// A backend is owned by exactly one writer at a time and may buffer
/// appended bytes in memory until [`flush`](Self::flush).
///
/// # Invariants
///
/// - `append` returns the offset where data was written
/// - bytes become visible in the underlying store in append order
/// - after `sync` returns, every appended byte survives process termination
/// - after `close` returns, further appends fail with `Closed`
///
/// # Implementors
///
/// - [`super::FileBackend`] - For persistent logs
/// - [`super::InMemoryBackend`] - For testing
pub trait StorageBackend: Send {
    /// Appends data to the end of the log.
    ///
    /// Returns the offset where the data was written. The bytes may remain
    /// buffered until the next flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed or an I/O error occurs.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Pushes all buffered bytes to the underlying store.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Flushes and forces the underlying store to stable storage.
    ///
    /// This is a stronger guarantee than `flush`: file data and metadata
    /// are durable once it returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Returns the number of bytes appended so far, buffered or not.
    ///
    /// This is the offset where the next `append` will write.
    fn size(&self) -> u64;

    /// Syncs and releases the underlying store.
    ///
    /// Closing an already closed backend is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the final sync fails.
    fn close(&mut self) -> StorageResult<()>;
}
