//! Record encoder.

use crate::error::{CodecError, CodecResult};
use crate::record::CommandRecord;
use crate::{varint, MAX_VALUE, RECORD_SIZE};
use bytes::BufMut;

/// Encode a record into its fixed 9-byte form.
///
/// Byte 0 is the opcode tag. Bytes 1..9 hold the value as a varint,
/// left-justified and zero padded.
///
/// The accepted range is `0..=MAX_VALUE` (`2^56 - 1`), deliberately
/// narrower than `u64`: eight varint bytes hold 56 bits.
///
/// # Errors
///
/// Returns [`CodecError::ValueOutOfRange`] for any value above
/// [`MAX_VALUE`]. Such values are never truncated.
pub fn encode_record(record: &CommandRecord) -> CodecResult<[u8; RECORD_SIZE]> {
    let value = record.value();
    if value > MAX_VALUE {
        return Err(CodecError::ValueOutOfRange {
            value,
            max: MAX_VALUE,
        });
    }

    let mut out = [0u8; RECORD_SIZE];
    out[0] = record.opcode().as_byte();
    let mut field: &mut [u8] = &mut out[1..];
    varint::write(value, &mut field);
    Ok(out)
}

/// Encode a record and append it to `buf`.
///
/// # Errors
///
/// See [`encode_record`].
pub fn encode_into(record: &CommandRecord, buf: &mut impl BufMut) -> CodecResult<()> {
    let bytes = encode_record(record)?;
    buf.put_slice(&bytes);
    Ok(())
}
