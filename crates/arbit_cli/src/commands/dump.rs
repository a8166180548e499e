//! Dump command implementation.

use super::Format;
use arbit_codec::{CommandRecord, RecordReader};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Log record representation for output.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RecordInfo {
    /// Offset in the log file.
    pub offset: u64,
    /// Record opcode.
    pub opcode: &'static str,
    /// Length for `INIT`, bit position otherwise.
    pub value: u64,
}

impl RecordInfo {
    fn new(offset: u64, record: CommandRecord) -> Self {
        Self {
            offset,
            opcode: record.opcode().name(),
            value: record.value(),
        }
    }
}

/// Everything the dump command found.
#[derive(Debug, Serialize)]
pub struct DumpOutput {
    /// Records read, in log order.
    pub records: Vec<RecordInfo>,
    /// Size of a partial record at the end of the log.
    pub trailing_bytes: usize,
    /// Decode error that stopped the dump, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the dump command.
pub fn run(
    path: &Path,
    limit: Option<usize>,
    start_offset: u64,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("log file not found: {}", path.display()).into());
    }

    let file = File::open(path)?;
    let output = read_records(BufReader::new(file), start_offset, limit);
    debug!(records = output.records.len(), "read replication log");

    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Format::Text => {
            print_text_output(&output);
        }
    }

    match output.error {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Reads records at or after `start_offset`, at most `limit` of them.
pub fn read_records<R: Read>(reader: R, start_offset: u64, limit: Option<usize>) -> DumpOutput {
    let mut reader = RecordReader::new(reader);
    let max_records = limit.unwrap_or(usize::MAX);
    let mut output = DumpOutput {
        records: Vec::new(),
        trailing_bytes: 0,
        error: None,
    };

    while output.records.len() < max_records {
        match reader.next() {
            Some(Ok((offset, record))) => {
                if offset >= start_offset {
                    output.records.push(RecordInfo::new(offset, record));
                }
            }
            Some(Err(err)) => {
                output.error = Some(format!("at offset {}: {err}", reader.offset()));
                break;
            }
            None => {
                output.trailing_bytes = reader.trailing_bytes();
                break;
            }
        }
    }

    output
}

fn print_text_output(output: &DumpOutput) {
    println!("Log Records ({} shown)", output.records.len());
    println!("================");
    println!();

    for record in &output.records {
        let label = if record.opcode == "INIT" { "length" } else { "pos" };
        println!("[{:010}] {:6} {}={}", record.offset, record.opcode, label, record.value);
    }

    if output.trailing_bytes > 0 {
        println!();
        println!("{} trailing bytes (incomplete record)", output.trailing_bytes);
    }
    if let Some(ref error) = output.error {
        println!();
        println!("Stopped on error {}", error);
    }
}
