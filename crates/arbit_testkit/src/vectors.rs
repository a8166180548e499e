//! Shared test vectors for the log record format.
//!
//! These vectors pin the exact bytes of each record so that any other
//! reader or writer of the format can be checked against them. They
//! serialize to JSON for use outside Rust.

use arbit_codec::{decode_record, encode_record, CommandRecord, Opcode, MAX_VALUE};
use serde::{Deserialize, Serialize};

/// A test vector that can be shared across implementations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Opcode name (`INIT`, `SET`, `CLEAR` or `FLIP`).
    pub opcode: String,
    /// Record value.
    pub value: u64,
    /// Expected encoding (hex), absent if encoding must fail.
    pub expected_hex: Option<String>,
    /// Expected error message (if this should fail).
    pub expected_error: Option<String>,
}

impl TestVector {
    fn ok(id: &str, description: &str, record: CommandRecord, hex: &str) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            opcode: record.opcode().name().into(),
            value: record.value(),
            expected_hex: Some(hex.into()),
            expected_error: None,
        }
    }

    fn opcode(&self) -> Opcode {
        Opcode::ALL
            .into_iter()
            .find(|op| op.name() == self.opcode)
            .unwrap_or_else(|| panic!("unknown opcode name {:?}", self.opcode))
    }

    /// The record this vector describes.
    pub fn record(&self) -> CommandRecord {
        CommandRecord::new(self.opcode(), self.value)
    }

    /// Checks the vector against the codec.
    ///
    /// # Panics
    ///
    /// Panics with the vector id if encoding or decoding disagrees.
    pub fn verify(&self) {
        let record = self.record();
        match (&self.expected_hex, encode_record(&record)) {
            (Some(hex), Ok(bytes)) => {
                assert_eq!(&hex_encode(&bytes), hex, "vector {}", self.id);
                let decoded = decode_record(&hex_decode(hex)).ok();
                assert_eq!(decoded, Some(record), "vector {}", self.id);
            }
            (None, Err(err)) => {
                if let Some(expected) = &self.expected_error {
                    assert!(err.to_string().contains(expected), "vector {}: {err}", self.id);
                }
            }
            (expected, actual) => {
                panic!("vector {}: expected {expected:?}, got {actual:?}", self.id);
            }
        }
    }
}

/// Record encoding test vectors.
pub fn record_vectors() -> Vec<TestVector> {
    vec![
        TestVector::ok(
            "init_0",
            "INIT of an empty vector",
            CommandRecord::init(0),
            "010000000000000000",
        ),
        TestVector::ok(
            "init_1000",
            "INIT of 1000 bits, two-byte varint",
            CommandRecord::init(1000),
            "01e807000000000000",
        ),
        TestVector::ok(
            "set_5",
            "SET of a one-byte position",
            CommandRecord::set(5),
            "020500000000000000",
        ),
        TestVector::ok(
            "clear_127",
            "CLEAR of the largest one-byte position",
            CommandRecord::clear(127),
            "037f00000000000000",
        ),
        TestVector::ok(
            "flip_128",
            "FLIP of the smallest two-byte position",
            CommandRecord::flip(128),
            "048001000000000000",
        ),
        TestVector::ok(
            "set_2_32",
            "SET of position 2^32",
            CommandRecord::set(1 << 32),
            "028080808010000000",
        ),
        TestVector::ok(
            "flip_max",
            "FLIP of the largest encodable position",
            CommandRecord::flip(MAX_VALUE),
            "04ffffffffffffff7f",
        ),
        TestVector {
            id: "set_overflow".into(),
            description: "SET one past the largest encodable position".into(),
            opcode: "SET".into(),
            value: MAX_VALUE + 1,
            expected_hex: None,
            expected_error: Some("exceeds the encodable maximum".into()),
        },
    ]
}

/// Returns all test vectors as JSON.
pub fn all_vectors_json() -> String {
    serde_json::to_string_pretty(&record_vectors()).unwrap_or_default()
}

/// Encodes bytes as lowercase hex.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Decodes lowercase or uppercase hex.
///
/// # Panics
///
/// Panics on odd length or a non-hex digit.
pub fn hex_decode(hex: &str) -> Vec<u8> {
    assert!(hex.len() % 2 == 0, "hex string has odd length");
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).expect("Invalid hex digit"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_vectors_hold() {
        for vector in record_vectors() {
            vector.verify();
        }
    }

    #[test]
    fn vectors_round_trip_through_json() {
        let json = all_vectors_json();
        let parsed: Vec<TestVector> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record_vectors());
    }

    #[test]
    fn hex_helpers() {
        assert_eq!(hex_encode(&[0x01, 0xab, 0xff]), "01abff");
        assert_eq!(hex_decode("01ABff"), vec![0x01, 0xab, 0xff]);
    }
}
