//! Fuzz testing harnesses for Arbit.
//!
//! This module provides fuzz targets that can be used with cargo-fuzz
//! or other fuzzing frameworks.

use arbit_codec::{decode_record, encode_record, RecordReader};
use arbit_core::{audit_reader, Arbit, Config};
use arbit_storage::InMemoryBackend;

/// Fuzz target for record decoding.
///
/// Tests that arbitrary byte sequences either:
/// - Decode successfully to a record that re-encodes to the same opcode and value, or
/// - Return a proper error (no panics)
pub fn fuzz_decode_record(data: &[u8]) {
    if let Ok(record) = decode_record(data) {
        let encoded = encode_record(&record).expect("Decoded record must re-encode");
        assert_eq!(decode_record(&encoded).ok(), Some(record), "Roundtrip mismatch");
    }
}

/// Fuzz target for streaming log reads and audits.
///
/// Arbitrary bytes must never panic the reader or the auditor.
pub fn fuzz_log_reader(data: &[u8]) {
    for item in RecordReader::new(data) {
        if item.is_err() {
            break;
        }
    }
    let _ = audit_reader(data);
}

/// Fuzz target for handle operations.
///
/// Interprets `data` as `(op, pos)` byte pairs against a 256-bit vector and
/// checks that the resulting log passes audit.
pub fn fuzz_operations(data: &[u8]) {
    let backend = InMemoryBackend::new();
    let handle = backend.handle();
    let config = Config::new().queue_capacity(64);
    let Ok(bits) = Arbit::with_backend(256, Box::new(backend), config) else {
        return;
    };

    for pair in data.chunks_exact(2) {
        let pos = u64::from(pair[1]);
        match pair[0] % 4 {
            0 => {
                bits.get(pos);
            }
            1 => {
                bits.set(pos);
            }
            2 => {
                bits.clear(pos);
            }
            _ => {
                bits.flip(pos);
            }
        }
    }

    bits.close().expect("In-memory log must close cleanly");
    let summary = audit_reader(&handle.data()[..]).expect("Log must pass audit");
    assert_eq!(summary.length, 256);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..20)) {
            fuzz_decode_record(&data);
        }

        #[test]
        fn reader_never_panics(data in prop::collection::vec(any::<u8>(), 0..100)) {
            fuzz_log_reader(&data);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn operations_produce_valid_logs(data in prop::collection::vec(any::<u8>(), 0..400)) {
            fuzz_operations(&data);
        }
    }
}
