//! Unsigned LEB128 varints.
//!
//! Each byte carries 7 bits of the value, least significant group first; the
//! high bit is set on every byte except the last.

use crate::error::{CodecError, CodecResult};
use bytes::{Buf, BufMut};

const DATA_BITS_PER_BYTE: usize = 7;
const DATA_BITS_MASK: u8 = 0x7F;
const CONTINUATION_BIT_MASK: u8 = 0x80;

/// Encodes `value` as a varint.
///
/// Panics if `buf` runs out of space; use [`size`] to check first.
pub fn write(value: u64, buf: &mut impl BufMut) {
    let mut val = value;
    while val >= u64::from(CONTINUATION_BIT_MASK) {
        buf.put_u8((val as u8) | CONTINUATION_BIT_MASK);
        val >>= DATA_BITS_PER_BYTE;
    }
    buf.put_u8(val as u8);
}

/// Decodes a varint, consuming exactly the bytes that belong to it.
///
/// # Errors
///
/// Returns [`CodecError::UnexpectedEof`] if `buf` ends before the terminating
/// byte, or [`CodecError::InvalidVarint`] if the value overflows 64 bits.
pub fn read(buf: &mut impl Buf) -> CodecResult<u64> {
    let mut result = 0u64;
    let mut shift = 0usize;

    loop {
        if !buf.has_remaining() {
            return Err(CodecError::UnexpectedEof {
                needed: 1,
                available: 0,
            });
        }
        let byte = buf.get_u8();

        // On the last possible byte, reject bits past 64 (this also rejects a
        // continuation bit there).
        let remaining_bits = u64::BITS as usize - shift;
        if remaining_bits <= DATA_BITS_PER_BYTE {
            let relevant_bits = 8 - byte.leading_zeros() as usize;
            if relevant_bits > remaining_bits {
                return Err(CodecError::invalid_varint("value overflows 64 bits"));
            }
        }

        result |= u64::from(byte & DATA_BITS_MASK) << shift;

        if byte & CONTINUATION_BIT_MASK == 0 {
            return Ok(result);
        }
        shift += DATA_BITS_PER_BYTE;
    }
}

/// Number of bytes [`write`] produces for `value`.
#[must_use]
pub fn size(value: u64) -> usize {
    let data_bits = (u64::BITS - value.leading_zeros()) as usize;
    usize::max(1, data_bits.div_ceil(DATA_BITS_PER_BYTE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        write(value, &mut buf);
        buf
    }

    #[test]
    fn known_encodings() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(1), vec![0x01]);
        assert_eq!(encode(127), vec![0x7F]);
        assert_eq!(encode(128), vec![0x80, 0x01]);
        assert_eq!(encode(300), vec![0xAC, 0x02]);
        assert_eq!(encode(1000), vec![0xE8, 0x07]);
    }

    #[test]
    fn size_matches_encoding() {
        for value in [0, 1, 127, 128, 16_383, 16_384, 1 << 32, (1 << 56) - 1, 1 << 56, u64::MAX] {
            assert_eq!(size(value), encode(value).len(), "value {value}");
        }
        assert_eq!(size((1 << 56) - 1), 8);
        assert_eq!(size(1 << 56), 9);
        assert_eq!(size(u64::MAX), 10);
    }

    #[test]
    fn read_stops_at_terminator() {
        let bytes = [0xAC, 0x02, 0xFF, 0xFF];
        let mut buf = &bytes[..];
        assert_eq!(read(&mut buf).unwrap(), 300);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn read_max() {
        let bytes = encode(u64::MAX);
        assert_eq!(read(&mut &bytes[..]).unwrap(), u64::MAX);
    }

    #[test]
    fn read_truncated() {
        let bytes = [0x80, 0x80];
        assert!(matches!(
            read(&mut &bytes[..]),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn read_overflow() {
        let mut bytes = vec![0xFF; 9];
        bytes.push(0x02);
        assert!(matches!(
            read(&mut &bytes[..]),
            Err(CodecError::InvalidVarint { .. })
        ));
    }
}
