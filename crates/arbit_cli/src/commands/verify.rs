//! Verify command implementation.

use super::Format;
use arbit_core::{audit_log, LogSummary};
use serde::Serialize;
use std::path::Path;

/// Verification result.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct VerifyResult {
    /// Whether the log is well formed.
    pub ok: bool,
    /// Length declared by `INIT`.
    pub length: u64,
    /// Complete records, `INIT` included.
    pub records: u64,
    /// `SET` records.
    pub sets: u64,
    /// `CLEAR` records.
    pub clears: u64,
    /// `FLIP` records.
    pub flips: u64,
    /// Size of an incomplete record at the end.
    pub trailing_bytes: usize,
    /// Why the log was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<LogSummary> for VerifyResult {
    fn from(summary: LogSummary) -> Self {
        Self {
            ok: true,
            length: summary.length,
            records: summary.records,
            sets: summary.sets,
            clears: summary.clears,
            flips: summary.flips,
            trailing_bytes: summary.trailing_bytes,
            error: None,
        }
    }
}

/// Audits the log at `path`.
pub fn verify(path: &Path) -> VerifyResult {
    match audit_log(path) {
        Ok(summary) => summary.into(),
        Err(err) => VerifyResult {
            error: Some(err.to_string()),
            ..VerifyResult::default()
        },
    }
}

/// Runs the verify command.
pub fn run(path: &Path, format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let result = verify(path);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        Format::Text => print_result(path, &result),
    }

    if result.ok {
        Ok(())
    } else {
        Err("Verification failed".into())
    }
}

fn print_result(path: &Path, result: &VerifyResult) {
    println!("Verifying log at {:?}", path);
    println!();

    if let Some(ref error) = result.error {
        println!("  Error: {}", error);
        println!();
        println!("✗ Log verification failed");
        return;
    }

    println!("  Length: {} bits", result.length);
    println!("  Records: {}", result.records);
    println!("    SET:   {}", result.sets);
    println!("    CLEAR: {}", result.clears);
    println!("    FLIP:  {}", result.flips);
    if result.trailing_bytes > 0 {
        println!(
            "  Incomplete tail: {} bytes (last flush was interrupted)",
            result.trailing_bytes
        );
    }
    println!();
    println!("✓ Log verification passed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbit_codec::{encode_record, CommandRecord};
    use tempfile::tempdir;

    fn write_log(path: &Path, records: &[CommandRecord], tail: &[u8]) {
        let mut bytes: Vec<u8> = records
            .iter()
            .flat_map(|r| encode_record(r).unwrap())
            .collect();
        bytes.extend_from_slice(tail);
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn valid_log_passes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bits.log");
        write_log(
            &path,
            &[
                CommandRecord::init(10),
                CommandRecord::set(1),
                CommandRecord::flip(9),
            ],
            &[3, 4],
        );

        let result = verify(&path);
        assert!(result.ok);
        assert_eq!(result.length, 10);
        assert_eq!(result.records, 3);
        assert_eq!(result.sets, 1);
        assert_eq!(result.flips, 1);
        assert_eq!(result.trailing_bytes, 2);
        assert!(run(&path, Format::Json).is_ok());
    }

    #[test]
    fn out_of_range_position_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bits.log");
        write_log(&path, &[CommandRecord::init(10), CommandRecord::set(10)], &[]);

        let result = verify(&path);
        assert!(!result.ok);
        assert!(result.error.is_some());
        assert!(run(&path, Format::Text).is_err());
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempdir().unwrap();
        let result = verify(&dir.path().join("absent.log"));
        assert!(!result.ok);
    }
}
