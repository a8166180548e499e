//! # Arbit Bits
//!
//! The bit vector behind an Arbit handle.
//!
//! The replication layer only relies on the [`BitVector`] contract; this
//! crate also provides [`PagedBitVector`], a lock-free implementation that
//! allocates storage lazily so very long vectors cost nothing until written.
//!
//! ## Example
//!
//! ```rust
//! use arbit_bits::{BitVector, PagedBitVector};
//!
//! let bits = PagedBitVector::with_length(1 << 35);
//! assert!(!bits.set(1 << 32));
//! assert!(bits.get(1 << 32));
//! assert_eq!(bits.allocated_pages(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod paged;

pub use paged::{PagedBitVector, BITS_PER_PAGE};

/// A fixed-length vector of bits that can be mutated through `&self`.
///
/// # Invariants
///
/// - A new vector of length `n` has every bit in `[0, n)` clear
/// - `set`, `clear` and `flip` return the bit's value before the call
/// - Each operation is atomic with respect to the others on the same bit
///
/// # Panics
///
/// Every positional method panics if `pos >= length()`. Callers that log
/// mutations rely on this: the panic fires before anything is recorded.
pub trait BitVector: Send + Sync {
    /// Creates a vector of `length` clear bits.
    fn with_length(length: u64) -> Self
    where
        Self: Sized;

    /// Number of bits.
    fn length(&self) -> u64;

    /// Reads bit `pos`.
    fn get(&self, pos: u64) -> bool;

    /// Sets bit `pos`, returning its previous value.
    fn set(&self, pos: u64) -> bool;

    /// Clears bit `pos`, returning its previous value.
    fn clear(&self, pos: u64) -> bool;

    /// Inverts bit `pos`, returning its previous value.
    fn flip(&self, pos: u64) -> bool;
}
