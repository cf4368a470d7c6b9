//! Segment decoding: the mode-indicator loop over the corrected data
//! codewords.
//!
//! Supported modes are Numeric, Alphanumeric, Byte and ECI; the terminator
//! ends the stream. Structured Append and the remaining indicators are
//! rejected, which abandons the containing corner.

use log::{debug, trace};

use crate::decoder::bitstream::BitReader;
use crate::decoder::modes;
use crate::error::{DecodeError, Result};

const MODE_TERMINATOR: u32 = 0b0000;
const MODE_NUMERIC: u32 = 0b0001;
const MODE_ALPHANUMERIC: u32 = 0b0010;
const MODE_BYTE: u32 = 0b0100;
const MODE_ECI: u32 = 0b0111;

/// Decoded payload of one symbol's data stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub data: Vec<u8>,
    /// Last ECI assignment value seen, -1 if none
    pub eci_assignment_value: i32,
}

/// Width of the character count field for a mode at a version
fn count_bits(mode: u32, version: u8) -> usize {
    match mode {
        MODE_NUMERIC => match version {
            1..=9 => 10,
            10..=26 => 12,
            _ => 14,
        },
        MODE_ALPHANUMERIC => match version {
            1..=9 => 9,
            10..=26 => 11,
            _ => 13,
        },
        MODE_BYTE => match version {
            1..=9 => 8,
            _ => 16,
        },
        _ => 0,
    }
}

/// Decode all segments of the data stream into one byte payload
pub fn decode_segments(data: &[u8], version: u8) -> Result<Payload> {
    let mut reader = BitReader::new(data);
    let mut out = Vec::new();
    let mut eci = -1i32;

    loop {
        // A symbol filled to capacity may omit the terminator; running out
        // of bits between segments is a clean end of stream.
        if reader.remaining() < 4 {
            break;
        }
        let mode = reader.read(4)?;
        if mode == MODE_TERMINATOR {
            break;
        }

        if mode == MODE_ECI {
            eci = read_eci(&mut reader)?;
            trace!("ECI assignment {eci}");
            continue;
        }

        if !matches!(mode, MODE_NUMERIC | MODE_ALPHANUMERIC | MODE_BYTE) {
            return Err(DecodeError::InvalidMode(mode as u8));
        }

        let count = reader.read(count_bits(mode, version))? as usize;
        let segment = match mode {
            MODE_NUMERIC => modes::numeric::decode(&mut reader, count)?,
            MODE_ALPHANUMERIC => modes::alphanumeric::decode(&mut reader, count)?,
            _ => modes::byte::decode(&mut reader, count)?,
        };

        if segment.len() != count {
            return Err(DecodeError::BitStreamUnderflow);
        }
        out.extend_from_slice(&segment);
    }

    debug!("decoded {} payload bytes, eci={eci}", out.len());
    Ok(Payload {
        data: out,
        eci_assignment_value: eci,
    })
}

/// ECI assignment value: 1, 2 or 3 bytes selected by the leading bits of
/// the first byte.
fn read_eci(reader: &mut BitReader<'_>) -> Result<i32> {
    let first = reader.read(8)?;
    if first & 0x80 == 0 {
        return Ok((first & 0x7F) as i32);
    }
    if first & 0xC0 == 0x80 {
        let second = reader.read(8)?;
        return Ok((((first & 0x3F) << 8) | second) as i32);
    }
    if first & 0xE0 == 0xC0 {
        let rest = reader.read(16)?;
        return Ok((((first & 0x1F) << 16) | rest) as i32);
    }
    Err(DecodeError::EciEncodingMalformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BitWriter {
        bits: Vec<u8>,
    }

    impl BitWriter {
        fn new() -> Self {
            Self { bits: Vec::new() }
        }

        fn push(&mut self, value: u32, width: usize) -> &mut Self {
            for i in (0..width).rev() {
                self.bits.push(((value >> i) & 1) as u8);
            }
            self
        }

        fn bytes(&self) -> Vec<u8> {
            self.bits
                .chunks(8)
                .map(|chunk| {
                    let mut byte = 0u8;
                    for (i, &b) in chunk.iter().enumerate() {
                        byte |= b << (7 - i);
                    }
                    byte
                })
                .collect()
        }
    }

    #[test]
    fn test_byte_segment() {
        let mut w = BitWriter::new();
        w.push(MODE_BYTE, 4).push(2, 8).push(b'H' as u32, 8);
        w.push(b'I' as u32, 8).push(MODE_TERMINATOR, 4);

        let payload = decode_segments(&w.bytes(), 1).unwrap();
        assert_eq!(payload.data, b"HI");
        assert_eq!(payload.eci_assignment_value, -1);
    }

    #[test]
    fn test_numeric_segment() {
        let mut w = BitWriter::new();
        w.push(MODE_NUMERIC, 4).push(4, 10);
        w.push(123, 10).push(4, 4).push(MODE_TERMINATOR, 4);

        let payload = decode_segments(&w.bytes(), 1).unwrap();
        assert_eq!(payload.data, b"1234");
    }

    #[test]
    fn test_mixed_segments_concatenate() {
        let mut w = BitWriter::new();
        w.push(MODE_ALPHANUMERIC, 4).push(2, 9).push(462, 11); // "AC"
        w.push(MODE_BYTE, 4).push(1, 8).push(b'!' as u32, 8);
        w.push(MODE_TERMINATOR, 4);

        let payload = decode_segments(&w.bytes(), 1).unwrap();
        assert_eq!(payload.data, b"AC!");
    }

    #[test]
    fn test_eci_one_byte() {
        let mut w = BitWriter::new();
        w.push(MODE_ECI, 4).push(26, 8); // UTF-8
        w.push(MODE_BYTE, 4).push(1, 8).push(b'x' as u32, 8);
        w.push(MODE_TERMINATOR, 4);

        let payload = decode_segments(&w.bytes(), 1).unwrap();
        assert_eq!(payload.data, b"x");
        assert_eq!(payload.eci_assignment_value, 26);
    }

    #[test]
    fn test_eci_two_and_three_bytes() {
        // Two-byte form: 10xxxxxx xxxxxxxx carrying 1000
        let mut w = BitWriter::new();
        w.push(MODE_ECI, 4).push(0x8000 | 1000, 16);
        w.push(MODE_TERMINATOR, 4);
        let payload = decode_segments(&w.bytes(), 1).unwrap();
        assert_eq!(payload.eci_assignment_value, 1000);

        // Three-byte form: 110xxxxx then 16 bits, carrying 100000
        let mut w = BitWriter::new();
        w.push(MODE_ECI, 4).push(0xC0_0000 | 100_000, 24);
        w.push(MODE_TERMINATOR, 4);
        let payload = decode_segments(&w.bytes(), 1).unwrap();
        assert_eq!(payload.eci_assignment_value, 100_000);
    }

    #[test]
    fn test_eci_malformed() {
        let mut w = BitWriter::new();
        w.push(MODE_ECI, 4).push(0xE5, 8);
        assert_eq!(
            decode_segments(&w.bytes(), 1).unwrap_err(),
            DecodeError::EciEncodingMalformed
        );
    }

    #[test]
    fn test_structured_append_rejected() {
        let mut w = BitWriter::new();
        w.push(0b0011, 4).push(0, 8);
        assert_eq!(
            decode_segments(&w.bytes(), 1).unwrap_err(),
            DecodeError::InvalidMode(0b0011)
        );
    }

    #[test]
    fn test_count_bits_by_version() {
        assert_eq!(count_bits(MODE_NUMERIC, 1), 10);
        assert_eq!(count_bits(MODE_NUMERIC, 10), 12);
        assert_eq!(count_bits(MODE_NUMERIC, 27), 14);
        assert_eq!(count_bits(MODE_ALPHANUMERIC, 9), 9);
        assert_eq!(count_bits(MODE_ALPHANUMERIC, 26), 11);
        assert_eq!(count_bits(MODE_ALPHANUMERIC, 40), 13);
        assert_eq!(count_bits(MODE_BYTE, 9), 8);
        assert_eq!(count_bits(MODE_BYTE, 10), 16);
    }

    #[test]
    fn test_missing_terminator_at_capacity() {
        // Stream ends exactly after the segment body
        let mut w = BitWriter::new();
        w.push(MODE_BYTE, 4).push(1, 8).push(b'z' as u32, 8);
        // 20 bits: pad to 24 with zeros, which reads as a terminator
        let payload = decode_segments(&w.bytes(), 1).unwrap();
        assert_eq!(payload.data, b"z");
    }

    #[test]
    fn test_truncated_segment_is_fatal() {
        let mut w = BitWriter::new();
        w.push(MODE_BYTE, 4).push(5, 8).push(b'a' as u32, 8);
        assert_eq!(
            decode_segments(&w.bytes(), 1).unwrap_err(),
            DecodeError::BitStreamUnderflow
        );
    }
}
