//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Another handle holds the exclusive lock on the log file.
    #[error("log file locked by another writer: {}", path.display())]
    Locked {
        /// The contested file.
        path: PathBuf,
    },

    /// The storage is closed.
    #[error("storage is closed")]
    Closed,
}
