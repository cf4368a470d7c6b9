//! Format information recovery.
//!
//! The 15-bit format word is stored twice. Each copy is sampled through the
//! transform, unmasked with 0x5412 and matched against the 32 valid BCH
//! words, tolerating up to 3 bit errors. The 5-bit payload carries the EC
//! level and the mask index.

use log::debug;

use crate::decoder::matrix::sample;
use crate::decoder::tables::{FORMAT_CODES, FORMAT_INFO_ONE, FORMAT_INFO_TWO, FORMAT_MASK};
use crate::detector::transform::GridTransform;
use crate::error::{DecodeError, Result};
use crate::models::{BitGrid, EcLevel};

/// Recovered format information
#[derive(Debug, Clone, Copy)]
pub struct FormatInfo {
    pub ec_level: EcLevel,
    pub mask: u8,
}

/// Read both format info copies and recover the payload from whichever
/// copy matches a valid word within the Hamming budget.
pub fn read_format_info(
    grid: &BitGrid,
    transform: &GridTransform,
    dimension: usize,
) -> Result<FormatInfo> {
    let one = read_copy_one(grid, transform);
    let two = read_copy_two(grid, transform, dimension);

    let payload = match_format(one)
        .or_else(|| match_format(two))
        .ok_or(DecodeError::FormatUnreadable)?;

    let info = FormatInfo {
        ec_level: EcLevel::from_format_bits(payload >> 3),
        mask: payload & 0x07,
    };
    debug!(
        "format info: ec={:?} mask={} (copies {one:#017b} / {two:#017b})",
        info.ec_level, info.mask
    );
    Ok(info)
}

fn read_copy_one(grid: &BitGrid, transform: &GridTransform) -> u16 {
    let mut word = 0u16;
    for (bit, &(row, col)) in FORMAT_INFO_ONE.iter().enumerate() {
        if sample(grid, transform, row, col) {
            word |= 1 << bit;
        }
    }
    word
}

fn read_copy_two(grid: &BitGrid, transform: &GridTransform, dimension: usize) -> u16 {
    let mut word = 0u16;
    for (bit, &(row, col)) in FORMAT_INFO_TWO.iter().enumerate() {
        let r = resolve(row, dimension);
        let c = resolve(col, dimension);
        if sample(grid, transform, r, c) {
            word |= 1 << bit;
        }
    }
    word
}

fn resolve(coord: isize, dimension: usize) -> usize {
    if coord < 0 {
        (dimension as isize + coord) as usize
    } else {
        coord as usize
    }
}

/// Unmask a raw format word and match it against the valid code words,
/// exactly first, then by Hamming distance up to 3. Returns the 5-bit
/// payload.
fn match_format(word: u16) -> Option<u8> {
    let unmasked = word ^ FORMAT_MASK;

    let mut best: Option<(u8, u32)> = None;
    for (data, &code) in FORMAT_CODES.iter().enumerate() {
        let dist = (code ^ unmasked).count_ones();
        if dist == 0 {
            return Some(data as u8);
        }
        if dist <= 3 && best.map_or(true, |(_, d)| dist < d) {
            best = Some((data as u8, dist));
        }
    }
    best.map(|(data, _)| data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_exact() {
        for data in 0..32u8 {
            let word = FORMAT_CODES[data as usize] ^ FORMAT_MASK;
            assert_eq!(match_format(word), Some(data));
        }
    }

    #[test]
    fn test_match_with_bit_errors() {
        let data = 0b01011u8;
        let word = FORMAT_CODES[data as usize] ^ FORMAT_MASK;
        for flips in [0x0001u16, 0x0011, 0x4011] {
            assert_eq!(match_format(word ^ flips), Some(data));
        }
    }

    #[test]
    fn test_match_rejects_four_errors() {
        // Four flips can land on or near another word; it must never
        // silently come back as the original.
        let data = 0b00000u8;
        let word = FORMAT_CODES[data as usize] ^ FORMAT_MASK;
        let corrupted = word ^ 0b1111;
        assert_ne!(match_format(corrupted), Some(data));
    }

    #[test]
    fn test_payload_split() {
        // Payload 0b01_101: EC bits 01 -> L, mask 5
        let info = FormatInfo {
            ec_level: EcLevel::from_format_bits(0b01),
            mask: 0b101,
        };
        assert_eq!(info.ec_level, EcLevel::L);
        assert_eq!(info.mask, 5);
    }
}
