//! Cross-crate integration test helpers.
//!
//! [`IntegrationHarness`] drives a handle and a plain `Vec<bool>` model in
//! lockstep, then checks that the log describes exactly what was done.

use crate::fixtures::decode_records;
use crate::generators::Op;
use arbit_codec::{CommandRecord, Opcode};
use arbit_core::{audit_reader, Arbit, Config};
use arbit_storage::{InMemoryBackend, MemoryHandle};

/// A test harness for integration testing.
pub struct IntegrationHarness {
    /// The handle under test.
    pub bits: Arbit,
    handle: MemoryHandle,
    model: Vec<bool>,
    expected: Vec<CommandRecord>,
}

impl IntegrationHarness {
    /// Creates a harness over an in-memory log of `length` bits.
    pub fn new(length: u64) -> Self {
        Self::with_config(length, Config::default())
    }

    /// Creates a harness with explicit tuning.
    pub fn with_config(length: u64, config: Config) -> Self {
        let backend = InMemoryBackend::new();
        let handle = backend.handle();
        let bits = Arbit::with_backend(length, Box::new(backend), config)
            .expect("Failed to open bit vector");
        let model_len = usize::try_from(length).expect("Model length must fit in memory");
        Self {
            bits,
            handle,
            model: vec![false; model_len],
            expected: vec![CommandRecord::init(length)],
        }
    }

    /// Applies `op` to both the handle and the model and compares the
    /// returned previous values.
    pub fn apply(&mut self, op: Op) {
        let index = op.pos() as usize;
        let previous = self.model[index];
        let actual = match op {
            Op::Get(pos) => self.bits.get(pos),
            Op::Set(pos) => {
                self.model[index] = true;
                self.bits.set(pos)
            }
            Op::Clear(pos) => {
                self.model[index] = false;
                self.bits.clear(pos)
            }
            Op::Flip(pos) => {
                self.model[index] = !previous;
                self.bits.flip(pos)
            }
        };
        assert_eq!(actual, previous, "{op:?} returned the wrong previous value");
        self.expected.extend(op.record());
    }

    /// Applies every operation in order.
    pub fn apply_all(&mut self, ops: impl IntoIterator<Item = Op>) {
        for op in ops {
            self.apply(op);
        }
    }

    /// Checks every bit against the model.
    pub fn verify_bits(&self) {
        for (index, &expected) in self.model.iter().enumerate() {
            assert_eq!(
                self.bits.get(index as u64),
                expected,
                "bit {index} differs from model"
            );
        }
    }

    /// Closes the handle and checks the log against the expected records.
    pub fn close_and_verify(&self) {
        self.bits.close().expect("Failed to close bit vector");
        let bytes = self.handle.data();
        assert_eq!(decode_records(&bytes), self.expected, "log differs from issued operations");

        let summary = audit_reader(&bytes[..]).expect("Log failed audit");
        assert_eq!(summary.records, self.expected.len() as u64);
        assert_eq!(summary.trailing_bytes, 0);
    }

    /// The records the log should contain.
    pub fn expected_records(&self) -> &[CommandRecord] {
        &self.expected
    }
}

/// Replays a log onto a fresh model.
///
/// # Panics
///
/// Panics if the log does not start with `INIT` or touches a bit out of range.
pub fn replay(records: &[CommandRecord]) -> Vec<bool> {
    let (first, rest) = records.split_first().expect("Log is empty");
    assert_eq!(first.opcode(), Opcode::Init, "Log must start with INIT");

    let mut bits = vec![false; first.value() as usize];
    for record in rest {
        let bit = &mut bits[record.value() as usize];
        match record.opcode() {
            Opcode::Set => *bit = true,
            Opcode::Clear => *bit = false,
            Opcode::Flip => *bit = !*bit,
            Opcode::Init => panic!("duplicate INIT"),
        }
    }
    bits
}
