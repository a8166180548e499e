//! # Arbit Testkit
//!
//! Test utilities for Arbit.
//!
//! This crate provides:
//! - Scratch log fixtures that clean up after themselves
//! - Property-based generators for operation sequences
//! - A model harness that checks a handle against a plain `Vec<bool>`
//! - A fault-injecting storage backend for crash scenarios
//! - Stress testing utilities
//! - Shared record encoding vectors
//! - Fuzz targets
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arbit_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_log() {
//!     with_temp_log(1000, |bits, log| {
//!         bits.set(5);
//!         bits.close().unwrap();
//!         assert_eq!(log.records().len(), 2);
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod integration;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use crash::*;
pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use integration::*;
pub use stress::*;
pub use vectors::*;
