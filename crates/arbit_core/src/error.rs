//! Error types for Arbit core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in Arbit core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] arbit_storage::StorageError),

    /// Record codec error.
    #[error("codec error: {0}")]
    Codec(#[from] arbit_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The declared length cannot be written to the log.
    #[error("length {length} exceeds the largest loggable length {max}")]
    LengthTooLarge {
        /// Requested length.
        length: u64,
        /// Largest length the record format can carry.
        max: u64,
    },

    /// A configuration value is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// The log writer stopped on an error.
    #[error("replication failed: {0}")]
    Replication(ReplicationFailure),

    /// The log writer thread panicked.
    #[error("replication writer panicked")]
    WriterPanicked,

    /// A log file breaks the structural rules of the format.
    #[error("log violation at offset {offset}: {message}")]
    LogViolation {
        /// Offset of the offending record.
        offset: u64,
        /// Description of the violation.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a log violation error.
    pub fn log_violation(offset: u64, message: impl Into<String>) -> Self {
        Self::LogViolation {
            offset,
            message: message.into(),
        }
    }
}

/// The error that stopped a log writer, as seen by the handle.
///
/// `lost_records` counts records that were accepted by the queue but never
/// made durable: the ones appended since the last successful flush plus the
/// ones still queued when the writer stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({lost_records} accepted records not durable)")]
pub struct ReplicationFailure {
    /// Rendered cause.
    pub message: String,
    /// Accepted records that did not reach stable storage.
    pub lost_records: u64,
}
