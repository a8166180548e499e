//! The replicated bit vector handle.

use crate::config::Config;
use crate::error::{CoreError, CoreResult, ReplicationFailure};
use crate::queue::{CommandQueue, QueueClosed, QueueProducer};
use crate::replication::{LogWriter, ReplicationState};
use crate::stats::StatsSnapshot;
use arbit_bits::{BitVector, PagedBitVector};
use arbit_codec::{CommandRecord, MAX_VALUE};
use arbit_storage::{FileBackend, StorageBackend};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{error, info, warn};

/// A bit vector whose mutations are replicated to an append-only log.
///
/// Reads and writes go straight to the in-memory [`BitVector`]; every
/// mutation is then queued for a background writer that appends it to the
/// log. Calls block only when the queue is full.
///
/// The log starts with one `INIT` record carrying the length, followed by
/// one record per `set`/`clear`/`flip` in the order the queue accepted them.
///
/// # Example
///
/// ```rust,no_run
/// use arbit_core::Arbit;
///
/// let bits = Arbit::open(1000, "bits.log")?;
/// assert!(!bits.set(5));
/// assert!(bits.get(5));
/// bits.close()?;
/// # Ok::<(), arbit_core::CoreError>(())
/// ```
pub struct Arbit<B: BitVector = PagedBitVector> {
    bits: B,
    producer: QueueProducer,
    state: Arc<ReplicationState>,
    writer: Mutex<Option<JoinHandle<CoreResult<()>>>>,
    path: Option<PathBuf>,
}

impl Arbit {
    /// Creates a vector of `length` clear bits logging to `path`.
    ///
    /// The log file is created or truncated and locked exclusively for the
    /// lifetime of the handle.
    ///
    /// `length` may be at most [`MAX_VALUE`] (`2^56 - 1`). That is narrower
    /// than `u64` on purpose: the `INIT` record and every position must fit
    /// the log's 8-byte varint field.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LengthTooLarge`] for a length above
    /// [`MAX_VALUE`], before the file is touched. Also returns an error if
    /// the file cannot be opened or is locked by another handle, or the
    /// writer thread cannot be started.
    pub fn open(length: u64, path: impl AsRef<Path>) -> CoreResult<Self> {
        Self::open_with_config(length, path, Config::default())
    }

    /// Like [`open`](Self::open) with explicit tuning.
    ///
    /// # Errors
    ///
    /// As [`open`](Self::open), plus [`CoreError::InvalidConfig`].
    pub fn open_with_config(
        length: u64,
        path: impl AsRef<Path>,
        config: Config,
    ) -> CoreResult<Self> {
        Self::open_typed(length, path, config)
    }

    /// Creates a vector logging to a caller-supplied backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the length or configuration is invalid, or the
    /// writer thread cannot be started.
    pub fn with_backend(
        length: u64,
        backend: Box<dyn StorageBackend>,
        config: Config,
    ) -> CoreResult<Self> {
        Self::with_backend_typed(length, backend, config)
    }
}

impl<B: BitVector> Arbit<B> {
    /// [`open_with_config`](Arbit::open_with_config) for any [`BitVector`].
    ///
    /// # Errors
    ///
    /// As [`Arbit::open_with_config`].
    pub fn open_typed(length: u64, path: impl AsRef<Path>, config: Config) -> CoreResult<Self> {
        let path = path.as_ref();
        config.validate()?;
        check_length(length)?;

        let backend = if config.create_dirs {
            FileBackend::create_with_dirs(path, config.buffer_size)?
        } else {
            FileBackend::create_with_capacity(path, config.buffer_size)?
        };
        let arbit = Self::start(length, Box::new(backend), &config, Some(path.to_path_buf()))?;
        info!(length, path = %path.display(), "opened replicated bit vector");
        Ok(arbit)
    }

    /// [`with_backend`](Arbit::with_backend) for any [`BitVector`].
    ///
    /// # Errors
    ///
    /// As [`Arbit::with_backend`].
    pub fn with_backend_typed(
        length: u64,
        backend: Box<dyn StorageBackend>,
        config: Config,
    ) -> CoreResult<Self> {
        config.validate()?;
        check_length(length)?;
        let arbit = Self::start(length, backend, &config, None)?;
        info!(length, "opened replicated bit vector");
        Ok(arbit)
    }

    fn start(
        length: u64,
        backend: Box<dyn StorageBackend>,
        config: &Config,
        path: Option<PathBuf>,
    ) -> CoreResult<Self> {
        let bits = B::with_length(length);
        let (producer, consumer) = CommandQueue::bounded(config.queue_capacity);
        let state = Arc::new(ReplicationState::new());
        let writer = LogWriter::new(
            backend,
            consumer,
            Arc::clone(&state),
            config.flush_interval,
            config.sync_on_flush,
            config.max_batch,
        )
        .spawn()?;

        let arbit = Self {
            bits,
            producer,
            state,
            writer: Mutex::new(Some(writer)),
            path,
        };

        if arbit.producer.enqueue(CommandRecord::init(length)).is_err() {
            return Err(arbit.close().err().unwrap_or(CoreError::WriterPanicked));
        }
        arbit.state.stats.record_enqueue();
        Ok(arbit)
    }

    /// Number of bits.
    pub fn length(&self) -> u64 {
        self.bits.length()
    }

    /// Returns the bit at `pos`. Not logged.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= length()`.
    pub fn get(&self, pos: u64) -> bool {
        self.bits.get(pos)
    }

    /// Sets the bit at `pos` and logs a `SET` record. Returns the previous value.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= length()`; nothing is logged in that case.
    pub fn set(&self, pos: u64) -> bool {
        let previous = self.bits.set(pos);
        self.replicate(CommandRecord::set(pos));
        previous
    }

    /// Clears the bit at `pos` and logs a `CLEAR` record. Returns the previous value.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= length()`; nothing is logged in that case.
    pub fn clear(&self, pos: u64) -> bool {
        let previous = self.bits.clear(pos);
        self.replicate(CommandRecord::clear(pos));
        previous
    }

    /// Inverts the bit at `pos` and logs a `FLIP` record. Returns the previous value.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= length()`; nothing is logged in that case.
    pub fn flip(&self, pos: u64) -> bool {
        let previous = self.bits.flip(pos);
        self.replicate(CommandRecord::flip(pos));
        previous
    }

    fn replicate(&self, record: CommandRecord) {
        match self.producer.enqueue(record) {
            Ok(()) => self.state.stats.record_enqueue(),
            Err(QueueClosed(record)) => {
                self.state.stats.record_lost(1);
                warn!(%record, "replication stopped, record not logged");
            }
        }
    }

    /// Stops replication and waits for the log to be complete.
    ///
    /// Every record accepted before the call is written, flushed and synced,
    /// and the backend is closed, before this returns. Calling `close` again
    /// returns `Ok(())`. Mutations after `close` still change the bits but
    /// are not logged; they are counted in [`StatsSnapshot::records_lost`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Replication`] if the writer stopped on an error,
    /// or [`CoreError::WriterPanicked`].
    pub fn close(&self) -> CoreResult<()> {
        let mut writer = self.writer.lock();
        let Some(handle) = writer.take() else {
            return Ok(());
        };

        // Fails only if the writer already stopped on an error.
        let _ = self.producer.shutdown();
        handle.join().map_err(|_| CoreError::WriterPanicked)??;

        let stats = self.state.stats.snapshot();
        info!(
            records = stats.records_synced,
            bytes = stats.bytes_written,
            "closed replicated bit vector"
        );
        Ok(())
    }

    /// Current replication counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.state.stats.snapshot()
    }

    /// The error that stopped the writer, if any.
    pub fn last_error(&self) -> Option<ReplicationFailure> {
        self.state.failure()
    }

    /// `false` once the writer has stopped on an error.
    pub fn is_healthy(&self) -> bool {
        !self.state.has_failed()
    }

    /// The log file path, or `None` for a caller-supplied backend.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl<B: BitVector> Drop for Arbit<B> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            error!(error = %err, "replication log incomplete at drop");
        }
    }
}

impl<B: BitVector> std::fmt::Debug for Arbit<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arbit")
            .field("length", &self.bits.length())
            .field("path", &self.path)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn check_length(length: u64) -> CoreResult<()> {
    if length > MAX_VALUE {
        return Err(CoreError::LengthTooLarge {
            length,
            max: MAX_VALUE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbit_codec::{decode_record, RECORD_SIZE};
    use arbit_storage::{InMemoryBackend, MemoryHandle};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn open_in_memory(length: u64) -> (Arbit, MemoryHandle) {
        let backend = InMemoryBackend::new();
        let handle = backend.handle();
        let arbit = Arbit::with_backend(length, Box::new(backend), Config::default()).unwrap();
        (arbit, handle)
    }

    fn records(handle: &MemoryHandle) -> Vec<CommandRecord> {
        handle
            .data()
            .chunks_exact(RECORD_SIZE)
            .map(|chunk| decode_record(chunk).unwrap())
            .collect()
    }

    #[test]
    fn mutations_are_logged_in_order() {
        let (bits, handle) = open_in_memory(1000);

        assert!(!bits.set(5));
        assert!(bits.get(5));
        assert!(bits.clear(5));
        assert!(!bits.flip(5));
        bits.close().unwrap();

        assert_eq!(
            records(&handle),
            vec![
                CommandRecord::init(1000),
                CommandRecord::set(5),
                CommandRecord::clear(5),
                CommandRecord::flip(5),
            ]
        );
        assert!(handle.is_closed());
    }

    #[test]
    fn reads_are_not_logged() {
        let (bits, handle) = open_in_memory(16);
        for pos in 0..16 {
            assert!(!bits.get(pos));
        }
        assert_eq!(bits.length(), 16);
        bits.close().unwrap();
        assert_eq!(records(&handle), vec![CommandRecord::init(16)]);
    }

    #[test]
    fn stats_after_close() {
        let (bits, _handle) = open_in_memory(64);
        bits.set(1);
        bits.flip(2);
        bits.close().unwrap();

        let stats = bits.stats();
        assert_eq!(stats.records_enqueued, 3);
        assert_eq!(stats.records_flushed, 3);
        assert_eq!(stats.records_synced, 3);
        assert_eq!(stats.records_lost, 0);
        assert_eq!(stats.bytes_written, 27);
        assert_eq!(stats.pending(), 0);
        assert!(bits.is_healthy());
        assert!(bits.last_error().is_none());
        assert!(bits.path().is_none());
    }

    #[test]
    fn close_is_idempotent() {
        let (bits, _handle) = open_in_memory(8);
        bits.close().unwrap();
        bits.close().unwrap();
    }

    #[test]
    fn mutation_after_close_is_counted_lost() {
        let (bits, handle) = open_in_memory(8);
        bits.close().unwrap();

        assert!(!bits.set(3));
        assert!(bits.get(3));
        assert_eq!(bits.stats().records_lost, 1);
        assert_eq!(records(&handle), vec![CommandRecord::init(8)]);
    }

    #[test]
    fn drop_closes() {
        let backend = InMemoryBackend::new();
        let handle = backend.handle();
        {
            let bits = Arbit::with_backend(4, Box::new(backend), Config::default()).unwrap();
            bits.set(0);
        }
        assert!(handle.is_closed());
        assert_eq!(
            records(&handle),
            vec![CommandRecord::init(4), CommandRecord::set(0)]
        );
    }

    #[test]
    fn rejects_oversized_length() {
        let err = Arbit::with_backend(
            MAX_VALUE + 1,
            Box::new(InMemoryBackend::new()),
            Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::LengthTooLarge { .. }));
    }

    #[test]
    fn longest_encodable_length_opens() {
        let backend = InMemoryBackend::new();
        let handle = backend.handle();
        let config = Config::new().queue_capacity(16);
        let bits = Arbit::with_backend(MAX_VALUE, Box::new(backend), config).unwrap();

        assert_eq!(bits.length(), MAX_VALUE);
        assert!(!bits.flip(MAX_VALUE - 1));
        assert!(bits.get(MAX_VALUE - 1));
        bits.close().unwrap();

        assert_eq!(
            records(&handle),
            vec![CommandRecord::init(MAX_VALUE), CommandRecord::flip(MAX_VALUE - 1)]
        );
    }

    #[test]
    fn rejects_invalid_config() {
        let err = Arbit::with_backend(
            10,
            Box::new(InMemoryBackend::new()),
            Config::new().queue_capacity(0),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_panics() {
        let (bits, _handle) = open_in_memory(10);
        bits.set(10);
    }

    /// A lock-based vector that also records whether it was ever written.
    struct TracingBits {
        bits: parking_lot::Mutex<Vec<bool>>,
        touched: AtomicBool,
    }

    impl BitVector for TracingBits {
        fn with_length(length: u64) -> Self {
            Self {
                bits: parking_lot::Mutex::new(vec![false; length as usize]),
                touched: AtomicBool::new(false),
            }
        }

        fn length(&self) -> u64 {
            self.bits.lock().len() as u64
        }

        fn get(&self, pos: u64) -> bool {
            self.bits.lock()[pos as usize]
        }

        fn set(&self, pos: u64) -> bool {
            self.touched.store(true, Ordering::Relaxed);
            std::mem::replace(&mut self.bits.lock()[pos as usize], true)
        }

        fn clear(&self, pos: u64) -> bool {
            self.touched.store(true, Ordering::Relaxed);
            std::mem::replace(&mut self.bits.lock()[pos as usize], false)
        }

        fn flip(&self, pos: u64) -> bool {
            self.touched.store(true, Ordering::Relaxed);
            let mut bits = self.bits.lock();
            let previous = bits[pos as usize];
            bits[pos as usize] = !previous;
            previous
        }
    }

    #[test]
    fn custom_bit_vector() {
        let backend = InMemoryBackend::new();
        let handle = backend.handle();
        let bits = Arbit::<TracingBits>::with_backend_typed(
            32,
            Box::new(backend),
            Config::default(),
        )
        .unwrap();

        assert!(!bits.flip(31));
        assert!(bits.get(31));
        assert!(bits.bits.touched.load(Ordering::Relaxed));
        bits.close().unwrap();

        assert_eq!(
            records(&handle),
            vec![CommandRecord::init(32), CommandRecord::flip(31)]
        );
    }
}
