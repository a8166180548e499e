//! Record decoder and streaming log reader.

use crate::error::{CodecError, CodecResult};
use crate::record::{CommandRecord, Opcode};
use crate::{varint, RECORD_SIZE};
use std::io::{ErrorKind, Read};

/// Decode one record from the first [`RECORD_SIZE`] bytes of `bytes`.
///
/// Bytes in the value field after the varint terminator are ignored.
///
/// # Errors
///
/// Returns an error if fewer than 9 bytes are given, the opcode is unknown,
/// or the value field does not contain a terminated varint.
pub fn decode_record(bytes: &[u8]) -> CodecResult<CommandRecord> {
    if bytes.len() < RECORD_SIZE {
        return Err(CodecError::UnexpectedEof {
            needed: RECORD_SIZE,
            available: bytes.len(),
        });
    }

    let opcode = Opcode::from_byte(bytes[0]).ok_or(CodecError::UnknownOpcode(bytes[0]))?;

    let mut field = &bytes[1..RECORD_SIZE];
    let value = varint::read(&mut field).map_err(|e| match e {
        CodecError::UnexpectedEof { .. } => {
            CodecError::invalid_varint("unterminated within the value field")
        }
        other => other,
    })?;

    Ok(CommandRecord::new(opcode, value))
}

/// A streaming reader over a log of fixed-width records.
///
/// Yields `(offset, record)` pairs. A trailing partial record (a write torn
/// by a crash) ends iteration cleanly; its size is available from
/// [`RecordReader::trailing_bytes`]. Decode errors end iteration after being
/// yielded once.
///
/// Wrap files in a [`std::io::BufReader`]; the reader issues one small read
/// per record.
///
/// # Example
///
/// ```
/// use arbit_codec::{encode_record, CommandRecord, RecordReader};
///
/// let mut log = Vec::new();
/// log.extend_from_slice(&encode_record(&CommandRecord::init(8)).unwrap());
/// log.extend_from_slice(&encode_record(&CommandRecord::set(3)).unwrap());
///
/// let records: Vec<_> = RecordReader::new(&log[..])
///     .map(|r| r.unwrap().1)
///     .collect();
/// assert_eq!(records, vec![CommandRecord::init(8), CommandRecord::set(3)]);
/// ```
pub struct RecordReader<R> {
    inner: R,
    offset: u64,
    trailing: usize,
    finished: bool,
}

impl<R: Read> RecordReader<R> {
    /// Creates a reader positioned at the start of `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            trailing: 0,
            finished: false,
        }
    }

    /// Offset of the next record to be read.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Size of the incomplete record found at the end, if any.
    #[must_use]
    pub fn trailing_bytes(&self) -> usize {
        self.trailing
    }

    fn read_next_record(&mut self) -> CodecResult<Option<(u64, CommandRecord)>> {
        let mut buf = [0u8; RECORD_SIZE];
        let mut filled = 0;

        while filled < RECORD_SIZE {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled < RECORD_SIZE {
            self.trailing = filled;
            return Ok(None);
        }

        let record = decode_record(&buf)?;
        let offset = self.offset;
        self.offset += RECORD_SIZE as u64;
        Ok(Some((offset, record)))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = CodecResult<(u64, CommandRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_next_record() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_record;

    fn log_of(records: &[CommandRecord]) -> Vec<u8> {
        records
            .iter()
            .flat_map(|r| encode_record(r).unwrap())
            .collect()
    }

    #[test]
    fn decode_init() {
        let record = decode_record(&[0x01, 0xE8, 0x07, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(record, CommandRecord::init(1000));
    }

    #[test]
    fn decode_ignores_padding() {
        // Garbage after the terminator is not part of the value.
        let record = decode_record(&[0x02, 0x05, 0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0]).unwrap();
        assert_eq!(record, CommandRecord::set(5));
    }

    #[test]
    fn decode_short_input() {
        assert!(matches!(
            decode_record(&[0x01, 0x00]),
            Err(CodecError::UnexpectedEof {
                needed: 9,
                available: 2
            })
        ));
    }

    #[test]
    fn decode_unknown_opcode() {
        assert!(matches!(
            decode_record(&[0x09, 0, 0, 0, 0, 0, 0, 0, 0]),
            Err(CodecError::UnknownOpcode(0x09))
        ));
        assert!(matches!(
            decode_record(&[0x00; 9]),
            Err(CodecError::UnknownOpcode(0))
        ));
    }

    #[test]
    fn decode_unterminated_varint() {
        assert!(matches!(
            decode_record(&[0x03, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80]),
            Err(CodecError::InvalidVarint { .. })
        ));
    }

    #[test]
    fn reader_empty() {
        let mut reader = RecordReader::new(&[][..]);
        assert!(reader.next().is_none());
        assert_eq!(reader.trailing_bytes(), 0);
    }

    #[test]
    fn reader_offsets() {
        let log = log_of(&[
            CommandRecord::init(10),
            CommandRecord::set(1),
            CommandRecord::flip(9),
        ]);
        let items: Vec<_> = RecordReader::new(&log[..]).map(|r| r.unwrap()).collect();
        assert_eq!(
            items,
            vec![
                (0, CommandRecord::init(10)),
                (9, CommandRecord::set(1)),
                (18, CommandRecord::flip(9)),
            ]
        );
    }

    #[test]
    fn reader_truncated_tail() {
        let mut log = log_of(&[CommandRecord::init(10), CommandRecord::clear(4)]);
        log.extend_from_slice(&[0x02, 0x01, 0x00]);

        let mut reader = RecordReader::new(&log[..]);
        assert_eq!(reader.next().unwrap().unwrap().1, CommandRecord::init(10));
        assert_eq!(reader.next().unwrap().unwrap().1, CommandRecord::clear(4));
        assert!(reader.next().is_none());
        assert_eq!(reader.trailing_bytes(), 3);
        assert_eq!(reader.offset(), 18);
    }

    #[test]
    fn reader_stops_after_error() {
        let mut log = log_of(&[CommandRecord::init(10)]);
        log.extend_from_slice(&[0x07; 9]);
        log.extend_from_slice(&log_of(&[CommandRecord::set(1)]));

        let mut reader = RecordReader::new(&log[..]);
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(
            reader.next(),
            Some(Err(CodecError::UnknownOpcode(7)))
        ));
        assert!(reader.next().is_none());
    }
}
