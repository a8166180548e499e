//! # Arbit Storage
//!
//! Append-only byte sinks for the Arbit replication log.
//!
//! This crate provides the lowest-level storage abstraction for Arbit.
//! Storage backends are **opaque byte stores** - they do not interpret
//! the records they hold.
//!
//! ## Design Principles
//!
//! - Backends are simple sinks (append, flush, sync, close)
//! - No knowledge of the record format
//! - Owned by a single writer, so only `Send` is required
//! - Buffering is the backend's business; durability is explicit
//!
//! ## Available Backends
//!
//! - [`FileBackend`] - Exclusive, buffered file log
//! - [`InMemoryBackend`] - For testing
//!
//! ## Example
//!
//! ```rust
//! use arbit_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let handle = backend.handle();
//! let offset = backend.append(b"hello world").unwrap();
//! backend.close().unwrap();
//! assert_eq!(offset, 0);
//! assert_eq!(handle.data(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::{FileBackend, DEFAULT_BUFFER_SIZE};
pub use memory::{InMemoryBackend, MemoryHandle};
