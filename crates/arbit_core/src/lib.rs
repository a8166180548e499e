//! # Arbit Core
//!
//! A bit vector whose mutations are replicated, asynchronously, to a
//! durable append-only log.
//!
//! This crate provides:
//! - [`Arbit`], the handle callers read and mutate through
//! - A bounded command queue with blocking backpressure
//! - A background log writer with periodic forced flushes
//! - Replication statistics and failure reporting
//! - Offline log verification ([`audit_log`])
//!
//! ## Example
//!
//! ```rust,no_run
//! use arbit_core::{Arbit, Config};
//! use std::time::Duration;
//!
//! let config = Config::new().flush_interval(Duration::from_millis(100));
//! let bits = Arbit::open_with_config(1 << 20, "bits.log", config)?;
//!
//! bits.set(7);
//! bits.flip(8);
//! bits.close()?;
//!
//! let summary = arbit_core::audit_log("bits.log")?;
//! assert_eq!(summary.mutations(), 2);
//! # Ok::<(), arbit_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod arbit;
mod audit;
mod config;
mod error;
pub mod queue;
mod replication;
mod stats;

pub use arbit::Arbit;
pub use audit::{audit_log, audit_reader, LogSummary};
pub use config::{
    Config, DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_INTERVAL, DEFAULT_MAX_BATCH, DEFAULT_QUEUE_CAPACITY,
};
pub use error::{CoreError, CoreResult, ReplicationFailure};
pub use stats::{ReplicationStats, StatsSnapshot};

pub use arbit_bits::{BitVector, PagedBitVector};
pub use arbit_codec::{CommandRecord, Opcode, MAX_VALUE, RECORD_SIZE};
pub use arbit_storage::{FileBackend, InMemoryBackend, StorageBackend};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
