//! Version information recovery for symbols of version 7 and above.
//!
//! The 18-bit BCH word is stored twice: a 3-wide column block left of the
//! top-right finder and its transpose above the bottom-left finder. Each
//! copy is matched against the valid words with a Hamming budget of 3.

use log::debug;

use crate::decoder::matrix::sample;
use crate::decoder::tables::VERSION_CODES;
use crate::detector::transform::GridTransform;
use crate::error::{DecodeError, Result};
use crate::models::BitGrid;

/// Read both version info copies through the transform built from the
/// estimated dimension and recover the version from whichever matches.
pub fn read_version_info(
    grid: &BitGrid,
    transform: &GridTransform,
    dimension: usize,
) -> Result<u8> {
    let mut top_right = 0u32;
    let mut bottom_left = 0u32;
    for bit in 0..18 {
        let major = bit / 3;
        let minor = dimension - 11 + bit % 3;
        if sample(grid, transform, major, minor) {
            top_right |= 1 << bit;
        }
        if sample(grid, transform, minor, major) {
            bottom_left |= 1 << bit;
        }
    }

    let version = match_version(top_right)
        .or_else(|| match_version(bottom_left))
        .ok_or(DecodeError::VersionUnreadable)?;
    debug!("version info: {version} (copies {top_right:#x} / {bottom_left:#x})");
    Ok(version)
}

/// Match an 18-bit word against the version code table, tolerating up to
/// 3 bit errors.
fn match_version(word: u32) -> Option<u8> {
    let mut best: Option<(u8, u32)> = None;
    for (i, &code) in VERSION_CODES.iter().enumerate() {
        let dist = (code ^ word).count_ones();
        if dist == 0 {
            return Some(i as u8 + 7);
        }
        if dist <= 3 && best.map_or(true, |(_, d)| dist < d) {
            best = Some((i as u8 + 7, dist));
        }
    }
    best.map(|(version, _)| version)
}
