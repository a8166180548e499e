//! Benchmark utilities.

use arbit_codec::{encode_record, CommandRecord, Opcode, RECORD_SIZE};
use rand::Rng;

/// Generate `count` random positions below `length`.
pub fn random_positions(count: usize, length: u64) -> Vec<u64> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| rng.gen_range(0..length)).collect()
}

/// Generate random mutation records with positions below `length`.
pub fn random_records(count: usize, length: u64) -> Vec<CommandRecord> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let opcode = Opcode::ALL[rng.gen_range(1..Opcode::ALL.len())];
            CommandRecord::new(opcode, rng.gen_range(0..length))
        })
        .collect()
}

/// Encode records back to back, as they appear in a log.
pub fn encode_log(records: &[CommandRecord]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(records.len() * RECORD_SIZE);
    for record in records {
        if let Ok(encoded) = encode_record(record) {
            bytes.extend_from_slice(&encoded);
        }
    }
    bytes
}
