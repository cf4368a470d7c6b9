//! Numeric mode (indicator 0001): groups of 3 digits in 10 bits, with a
//! 7-bit tail for 2 digits and a 4-bit tail for a single digit.

use crate::decoder::bitstream::BitReader;
use crate::decoder::tables::DECODING_TABLE;
use crate::error::Result;

pub fn decode(reader: &mut BitReader<'_>, count: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(count);
    let mut remaining = count;

    while remaining > 0 {
        match remaining {
            1 => {
                let value = reader.read(4)? as usize;
                out.push(DECODING_TABLE[value % 10]);
                remaining -= 1;
            }
            2 => {
                let value = reader.read(7)? as usize;
                out.push(DECODING_TABLE[value / 10 % 10]);
                out.push(DECODING_TABLE[value % 10]);
                remaining -= 2;
            }
            _ => {
                let value = reader.read(10)? as usize;
                out.push(DECODING_TABLE[value / 100 % 10]);
                out.push(DECODING_TABLE[value / 10 % 10]);
                out.push(DECODING_TABLE[value % 10]);
                remaining -= 3;
            }
        }
    }

    Ok(out)
}
