//! Error types for the codec crate.

use std::io;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Fewer bytes than a full record were available.
    #[error("unexpected end of input: needed {needed} bytes, got {available}")]
    UnexpectedEof {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// The opcode byte does not name a known command.
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),

    /// The value does not fit in the 8-byte varint field.
    #[error("value {value} exceeds the encodable maximum {max}")]
    ValueOutOfRange {
        /// The rejected value.
        value: u64,
        /// Largest encodable value.
        max: u64,
    },

    /// The value field does not hold a well-formed varint.
    #[error("invalid varint: {message}")]
    InvalidVarint {
        /// Description of the problem.
        message: String,
    },

    /// Reading from the underlying source failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Create an invalid varint error.
    pub fn invalid_varint(message: impl Into<String>) -> Self {
        Self::InvalidVarint {
            message: message.into(),
        }
    }
}
