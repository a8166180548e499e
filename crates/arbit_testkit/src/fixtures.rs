//! Test fixtures and log helpers.
//!
//! Provides scratch log files and convenience functions for reading back
//! what a handle wrote.

use arbit_codec::{CommandRecord, RecordReader};
use arbit_core::{Arbit, Config};
use arbit_storage::{InMemoryBackend, MemoryHandle};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A log path inside a temporary directory that is removed on drop.
pub struct TempLog {
    path: PathBuf,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TempLog {
    /// Creates a fresh, not yet existing, log path.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        Self {
            path: temp_dir.path().join("arbit.log"),
            _temp_dir: temp_dir,
        }
    }

    /// Returns the log path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a handle of `length` bits on this log.
    pub fn open(&self, length: u64) -> Arbit {
        Arbit::open(length, &self.path).expect("Failed to open replicated bit vector")
    }

    /// Opens a handle with explicit tuning.
    pub fn open_with_config(&self, length: u64, config: Config) -> Arbit {
        Arbit::open_with_config(length, &self.path, config)
            .expect("Failed to open replicated bit vector")
    }

    /// Returns the raw log bytes (empty if the file does not exist yet).
    pub fn bytes(&self) -> Vec<u8> {
        fs::read(&self.path).unwrap_or_default()
    }

    /// Returns the current file size.
    pub fn len(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if the file is missing or empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes every complete record in the log.
    pub fn records(&self) -> Vec<CommandRecord> {
        read_records(&self.path)
    }
}

impl Default for TempLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes every complete record in the log at `path`.
///
/// # Panics
///
/// Panics if the file cannot be read or holds an undecodable record.
pub fn read_records(path: impl AsRef<Path>) -> Vec<CommandRecord> {
    let bytes = fs::read(path.as_ref()).expect("Failed to read log");
    decode_records(&bytes)
}

/// Decodes every complete record in `bytes`, ignoring a partial tail.
///
/// # Panics
///
/// Panics on an undecodable record.
pub fn decode_records(bytes: &[u8]) -> Vec<CommandRecord> {
    RecordReader::new(bytes)
        .map(|item| item.expect("Failed to decode record").1)
        .collect()
}

/// Opens a handle on an in-memory backend.
///
/// The returned [`MemoryHandle`] shows what the writer has flushed.
pub fn memory_log(length: u64, config: Config) -> (Arbit, MemoryHandle) {
    let backend = InMemoryBackend::new();
    let handle = backend.handle();
    let bits = Arbit::with_backend(length, Box::new(backend), config)
        .expect("Failed to open in-memory bit vector");
    (bits, handle)
}

/// Runs a test with a handle on a temporary log file.
///
/// # Example
///
/// ```rust,ignore
/// use arbit_testkit::with_temp_log;
///
/// #[test]
/// fn my_test() {
///     with_temp_log(64, |bits, log| {
///         bits.flip(3);
///         bits.close().unwrap();
///         assert_eq!(log.len(), 18);
///     });
/// }
/// ```
pub fn with_temp_log<F, R>(length: u64, f: F) -> R
where
    F: FnOnce(&Arbit, &TempLog) -> R,
{
    let log = TempLog::new();
    let bits = log.open(length);
    f(&bits, &log)
}
