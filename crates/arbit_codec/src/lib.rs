//! # Arbit Codec
//!
//! Binary record encoding for the Arbit replication log.
//!
//! A log is a flat sequence of fixed-width records with no file header:
//!
//! ```text
//! | opcode (1) | value varint, zero padded (8) |
//! ```
//!
//! ## Format Rules
//!
//! - Opcode tags: `1=Init`, `2=Set`, `3=Clear`, `4=Flip`
//! - The value is an unsigned LEB128 varint, left-justified in its field
//! - The field is always 8 bytes, whatever the varint's length
//! - Values above [`MAX_VALUE`] (56 bits) cannot be represented
//!
//! ## Usage
//!
//! ```
//! use arbit_codec::{decode_record, encode_record, CommandRecord};
//!
//! let record = CommandRecord::set(42);
//! let bytes = encode_record(&record).unwrap();
//! assert_eq!(bytes.len(), arbit_codec::RECORD_SIZE);
//! assert_eq!(decode_record(&bytes).unwrap(), record);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod record;
pub mod varint;

pub use decoder::{decode_record, RecordReader};
pub use encoder::{encode_into, encode_record};
pub use error::{CodecError, CodecResult};
pub use record::{CommandRecord, Opcode};

/// Size of one encoded record in bytes.
pub const RECORD_SIZE: usize = 1 + VALUE_FIELD_SIZE;

/// Size of the value field in bytes.
pub const VALUE_FIELD_SIZE: usize = 8;

/// Largest value that fits in the value field (7 payload bits per byte).
///
/// This is `2^56 - 1`, not `u64::MAX`. The field is a fixed 8 bytes and a
/// LEB128 varint carries only 7 bits per byte, so lengths and positions in
/// `MAX_VALUE + 1..=u64::MAX` are deliberately outside the log format.
/// They are rejected with an error, never truncated or wrapped.
pub const MAX_VALUE: u64 = (1 << (7 * VALUE_FIELD_SIZE)) - 1;
