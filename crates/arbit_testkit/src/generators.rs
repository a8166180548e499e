//! Property-based test generators using proptest.
//!
//! Provides strategies for generating records and operation sequences that
//! respect the log's invariants.

use arbit_codec::{CommandRecord, Opcode, MAX_VALUE};
use proptest::prelude::*;

/// One call against a bit vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Read a bit.
    Get(u64),
    /// Set a bit.
    Set(u64),
    /// Clear a bit.
    Clear(u64),
    /// Invert a bit.
    Flip(u64),
}

impl Op {
    /// The position the operation touches.
    pub fn pos(self) -> u64 {
        match self {
            Self::Get(pos) | Self::Set(pos) | Self::Clear(pos) | Self::Flip(pos) => pos,
        }
    }

    /// The record this operation appends to the log, if any.
    pub fn record(self) -> Option<CommandRecord> {
        match self {
            Self::Get(_) => None,
            Self::Set(pos) => Some(CommandRecord::set(pos)),
            Self::Clear(pos) => Some(CommandRecord::clear(pos)),
            Self::Flip(pos) => Some(CommandRecord::flip(pos)),
        }
    }
}

/// Strategy for generating any encodable value.
pub fn value_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        0u64..128,
        128u64..(1 << 14),
        0u64..=MAX_VALUE,
        Just(MAX_VALUE),
    ]
}

/// Strategy for generating opcodes.
pub fn opcode_strategy() -> impl Strategy<Value = Opcode> {
    prop::sample::select(Opcode::ALL.to_vec())
}

/// Strategy for generating encodable records.
pub fn record_strategy() -> impl Strategy<Value = CommandRecord> {
    (opcode_strategy(), value_strategy())
        .prop_map(|(opcode, value)| CommandRecord::new(opcode, value))
}

/// Strategy for generating small bit vector lengths (at least one bit).
pub fn length_strategy() -> impl Strategy<Value = u64> {
    1u64..4096
}

/// Strategy for generating operations within `length` bits.
///
/// # Panics
///
/// Panics if `length` is zero.
pub fn op_strategy(length: u64) -> impl Strategy<Value = Op> {
    assert!(length > 0, "operations need at least one bit");
    (0u8..4, 0..length).prop_map(|(kind, pos)| match kind {
        0 => Op::Get(pos),
        1 => Op::Set(pos),
        2 => Op::Clear(pos),
        _ => Op::Flip(pos),
    })
}

/// Strategy for generating a length together with operations valid for it.
pub fn scenario_strategy(max_ops: usize) -> impl Strategy<Value = (u64, Vec<Op>)> {
    length_strategy().prop_flat_map(move |length| {
        (
            Just(length),
            prop::collection::vec(op_strategy(length), 0..max_ops),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn ops_stay_in_range((length, ops) in scenario_strategy(64)) {
            for op in ops {
                prop_assert!(op.pos() < length);
            }
        }

        #[test]
        fn records_are_encodable(record in record_strategy()) {
            prop_assert!(record.value() <= MAX_VALUE);
            prop_assert!(arbit_codec::encode_record(&record).is_ok());
        }
    }

    #[test]
    fn get_is_not_logged() {
        assert_eq!(Op::Get(3).record(), None);
        assert_eq!(Op::Flip(3).record(), Some(CommandRecord::flip(3)));
    }
}
