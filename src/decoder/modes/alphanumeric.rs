//! Alphanumeric mode (indicator 0010): pairs of characters in 11 bits
//! (`hi = v / 45`, `lo = v % 45`), single trailing character in 6 bits.

use crate::decoder::bitstream::BitReader;
use crate::decoder::tables::DECODING_TABLE;
use crate::error::{DecodeError, Result};

pub fn decode(reader: &mut BitReader<'_>, count: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(count);
    let mut remaining = count;

    while remaining > 0 {
        if remaining >= 2 {
            let value = reader.read(11)? as usize;
            let hi = value / 45;
            let lo = value % 45;
            if hi >= 45 {
                return Err(DecodeError::InvalidMode(0b0010));
            }
            out.push(DECODING_TABLE[hi]);
            out.push(DECODING_TABLE[lo]);
            remaining -= 2;
        } else {
            let value = reader.read(6)? as usize;
            if value >= 45 {
                return Err(DecodeError::InvalidMode(0b0010));
            }
            out.push(DECODING_TABLE[value]);
            remaining -= 1;
        }
    }

    Ok(out)
}
