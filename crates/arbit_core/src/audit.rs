//! Offline verification of replication logs.
//!
//! A well-formed log is one `INIT` record followed by any number of
//! `SET`/`CLEAR`/`FLIP` records whose positions are below the `INIT`
//! length. A partial record at the end is reported, not treated as an
//! error: it is what a crash between flushes leaves behind.

use crate::error::{CoreError, CoreResult};
use arbit_codec::{CommandRecord, Opcode, RecordReader};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// What a structurally valid log contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogSummary {
    /// Length declared by the `INIT` record.
    pub length: u64,
    /// Complete records, `INIT` included.
    pub records: u64,
    /// `SET` records.
    pub sets: u64,
    /// `CLEAR` records.
    pub clears: u64,
    /// `FLIP` records.
    pub flips: u64,
    /// Size of the incomplete record at the end, zero if none.
    pub trailing_bytes: usize,
}

impl LogSummary {
    /// Mutation records (everything except `INIT`).
    pub fn mutations(&self) -> u64 {
        self.sets + self.clears + self.flips
    }

    fn observe(&mut self, offset: u64, record: &CommandRecord) -> CoreResult<()> {
        if self.records == 0 {
            if record.opcode() != Opcode::Init {
                return Err(CoreError::log_violation(
                    offset,
                    format!("log must start with INIT, found {record}"),
                ));
            }
            self.length = record.value();
            self.records = 1;
            return Ok(());
        }

        let length = self.length;
        let counter = match record.opcode() {
            Opcode::Init => {
                return Err(CoreError::log_violation(offset, "duplicate INIT record"));
            }
            Opcode::Set => &mut self.sets,
            Opcode::Clear => &mut self.clears,
            Opcode::Flip => &mut self.flips,
        };
        if record.value() >= length {
            return Err(CoreError::log_violation(
                offset,
                format!("{record} out of range for length {length}"),
            ));
        }
        *counter += 1;
        self.records += 1;
        Ok(())
    }
}

/// Verifies the log file at `path`.
///
/// # Errors
///
/// Returns an I/O or codec error if the file cannot be read or decoded, and
/// [`CoreError::LogViolation`] if it breaks the structural rules.
pub fn audit_log(path: impl AsRef<Path>) -> CoreResult<LogSummary> {
    let file = File::open(path.as_ref())?;
    audit_reader(BufReader::new(file))
}

/// Verifies a log read from `reader`.
///
/// # Errors
///
/// As [`audit_log`].
pub fn audit_reader<R: Read>(reader: R) -> CoreResult<LogSummary> {
    let mut records = RecordReader::new(reader);
    let mut summary = LogSummary::default();

    for item in records.by_ref() {
        let (offset, record) = item?;
        summary.observe(offset, &record)?;
    }

    summary.trailing_bytes = records.trailing_bytes();
    if summary.records == 0 {
        return Err(CoreError::log_violation(0, "log has no INIT record"));
    }
    Ok(summary)
}
