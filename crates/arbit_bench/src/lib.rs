//! Shared helpers for the Arbit benchmarks.

pub mod utils;
