//! Logical matrix construction: base template, sampling, mask removal and
//! the zig-zag codeword unload.
//!
//! The base matrix pre-fills every module whose value the standard fixes
//! (finders and separators, timing, alignment interiors, the dark module)
//! and reserves the format/version areas. Sampling fills the data cells and
//! simultaneously audits the fixed cells against what the image shows.

use log::debug;

use crate::decoder::tables::{
    ALIGNMENT_POSITIONS, FORMAT_INFO_ONE, FORMAT_INFO_TWO, TOTAL_CODEWORDS,
};
use crate::detector::transform::GridTransform;
use crate::error::{DecodeError, Result};
use crate::models::{BitGrid, EcLevel, ModuleMatrix, BLACK, FIXED, MASK_PREDICATES, NON_DATA};

/// Sample one module center through the transform. Rounds half away from
/// zero; pixels outside the image read as light.
#[inline]
pub(crate) fn sample(grid: &BitGrid, transform: &GridTransform, row: usize, col: usize) -> bool {
    let p = transform.map(col as f32, row as f32);
    let x = p.x.round();
    let y = p.y.round();
    if x < 0.0 || y < 0.0 {
        return false;
    }
    grid.is_dark(x as usize, y as usize)
}

/// Build the base matrix template for a version
pub fn build_base_matrix(version: u8) -> ModuleMatrix {
    let dimension = 17 + 4 * version as usize;
    let mut m = ModuleMatrix::new(dimension);

    stamp_finder(&mut m, 0, 0);
    stamp_finder(&mut m, 0, dimension - 7);
    stamp_finder(&mut m, dimension - 7, 0);

    // Timing patterns, dark at even coordinates
    for i in 8..dimension - 8 {
        let flags = FIXED | NON_DATA | if i % 2 == 0 { BLACK } else { 0 };
        m.or_flags(6, i, flags);
        m.or_flags(i, 6, flags);
    }

    let positions = ALIGNMENT_POSITIONS[version as usize];
    for &cy in positions {
        for &cx in positions {
            // The three finder corners own their areas
            let clashes = (cy == 6 && cx == 6)
                || (cy == 6 && cx == dimension - 7)
                || (cy == dimension - 7 && cx == 6);
            if clashes {
                continue;
            }
            stamp_alignment(&mut m, cy, cx);
        }
    }

    // Dark module above the bottom-left finder separator
    m.or_flags(dimension - 8, 8, BLACK | FIXED | NON_DATA);

    // Format info reservations (values vary per symbol, so not fixed)
    for &(row, col) in FORMAT_INFO_ONE.iter() {
        m.or_flags(row, col, NON_DATA);
    }
    for &(row, col) in FORMAT_INFO_TWO.iter() {
        let r = if row < 0 {
            (dimension as isize + row) as usize
        } else {
            row as usize
        };
        let c = if col < 0 {
            (dimension as isize + col) as usize
        } else {
            col as usize
        };
        m.or_flags(r, c, NON_DATA);
    }

    // Version info reservations
    if version >= 7 {
        for bit in 0..18 {
            let major = bit / 3;
            let minor = dimension - 11 + bit % 3;
            m.or_flags(major, minor, NON_DATA);
            m.or_flags(minor, major, NON_DATA);
        }
    }

    m
}

/// Stamp a 7x7 finder pattern with its separator border. `row0`/`col0` is
/// the pattern's top-left module.
fn stamp_finder(m: &mut ModuleMatrix, row0: usize, col0: usize) {
    let dimension = m.dimension();
    for dy in 0..7usize {
        for dx in 0..7usize {
            let border = dy == 0 || dy == 6 || dx == 0 || dx == 6;
            let center = (2..=4).contains(&dy) && (2..=4).contains(&dx);
            let flags = FIXED | NON_DATA | if border || center { BLACK } else { 0 };
            m.or_flags(row0 + dy, col0 + dx, flags);
        }
    }
    // One-module light separator on the two inner sides
    let r1 = row0.saturating_sub(1);
    let r2 = (row0 + 7).min(dimension - 1);
    let c1 = col0.saturating_sub(1);
    let c2 = (col0 + 7).min(dimension - 1);
    for r in r1..=r2 {
        for c in c1..=c2 {
            if !m.is_non_data(r, c) {
                m.or_flags(r, c, FIXED | NON_DATA);
            }
        }
    }
}

/// Stamp a 5x5 alignment pattern centered at (`cy`, `cx`)
fn stamp_alignment(m: &mut ModuleMatrix, cy: usize, cx: usize) {
    for dy in -2i32..=2 {
        for dx in -2i32..=2 {
            let dark = dy.abs() == 2 || dx.abs() == 2 || (dy == 0 && dx == 0);
            let flags = FIXED | NON_DATA | if dark { BLACK } else { 0 };
            let r = (cy as i32 + dy) as usize;
            let c = (cx as i32 + dx) as usize;
            m.or_flags(r, c, flags);
        }
    }
}

/// Sample every module into the matrix and audit the fixed cells.
///
/// A fixed cell whose sampled color disagrees with the template counts as
/// a mismatch; the budget scales with the EC level's recovery share.
pub fn sample_matrix(
    grid: &BitGrid,
    transform: &GridTransform,
    matrix: &mut ModuleMatrix,
    ec_level: EcLevel,
) -> Result<()> {
    let dimension = matrix.dimension();
    let mut fixed_count = 0usize;
    let mut mismatches = 0usize;

    for row in 0..dimension {
        for col in 0..dimension {
            let dark = sample(grid, transform, row, col);
            if matrix.is_fixed(row, col) {
                fixed_count += 1;
                if dark != matrix.is_black(row, col) {
                    mismatches += 1;
                }
            } else {
                matrix.set_black(row, col, dark);
            }
        }
    }

    if mismatches * 100 > fixed_count * ec_level.percent() {
        debug!("fixed module audit failed: {mismatches}/{fixed_count} mismatches");
        return Err(DecodeError::FixedModuleMismatch);
    }
    Ok(())
}

/// XOR the mask into every data cell
pub fn apply_mask(matrix: &mut ModuleMatrix, mask: u8) {
    let predicate = MASK_PREDICATES[(mask & 0x07) as usize];
    let dimension = matrix.dimension();
    for row in 0..dimension {
        for col in 0..dimension {
            if !matrix.is_non_data(row, col) && predicate(row, col) {
                matrix.toggle_black(row, col);
            }
        }
    }
}

/// Walk the zig-zag traversal and pack data modules into codewords,
/// MSB first. Column pairs run right to left, skipping the vertical
/// timing column; the walk direction alternates per strip.
pub fn unload_codewords(matrix: &ModuleMatrix, version: u8) -> Result<Vec<u8>> {
    let dimension = matrix.dimension();
    let total = TOTAL_CODEWORDS[version as usize];
    let mut codewords = Vec::with_capacity(total);
    let mut byte = 0u8;
    let mut bits = 0usize;

    let mut col = dimension as isize - 1;
    let mut upward = true;
    while col > 0 && codewords.len() < total {
        if col == 6 {
            col -= 1;
            continue;
        }
        let rows: Box<dyn Iterator<Item = usize>> = if upward {
            Box::new((0..dimension).rev())
        } else {
            Box::new(0..dimension)
        };
        for row in rows {
            for c in [col as usize, col as usize - 1] {
                if matrix.is_non_data(row, c) {
                    continue;
                }
                byte = (byte << 1) | matrix.is_black(row, c) as u8;
                bits += 1;
                if bits == 8 {
                    codewords.push(byte);
                    byte = 0;
                    bits = 0;
                    if codewords.len() == total {
                        break;
                    }
                }
            }
            if codewords.len() == total {
                break;
            }
        }
        upward = !upward;
        col -= 2;
    }

    if codewords.len() < total {
        return Err(DecodeError::BitStreamUnderflow);
    }
    Ok(codewords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_implies_non_data() {
        for version in [1u8, 2, 7, 25, 40] {
            let m = build_base_matrix(version);
            for row in 0..m.dimension() {
                for col in 0..m.dimension() {
                    if m.is_fixed(row, col) {
                        assert!(m.is_non_data(row, col), "v{version} ({row},{col})");
                    }
                }
            }
        }
    }

    #[test]
    fn test_base_matrix_landmarks() {
        let m = build_base_matrix(1);
        assert_eq!(m.dimension(), 21);
        // Finder center and ring
        assert!(m.is_black(3, 3));
        assert!(!m.is_black(1, 1));
        assert!(m.is_black(0, 0));
        // Separator is reserved and light
        assert!(m.is_non_data(7, 7));
        assert!(!m.is_black(7, 7));
        // Timing alternates
        assert!(m.is_black(6, 8));
        assert!(!m.is_black(6, 9));
        // Dark module
        assert!(m.is_black(13, 8));
        assert!(m.is_fixed(13, 8));
    }

    #[test]
    fn test_data_module_count_matches_capacity() {
        for version in [1u8, 2, 6, 7, 14, 21, 40] {
            let m = build_base_matrix(version);
            let mut data_modules = 0usize;
            for row in 0..m.dimension() {
                for col in 0..m.dimension() {
                    if !m.is_non_data(row, col) {
                        data_modules += 1;
                    }
                }
            }
            assert_eq!(
                data_modules / 8,
                TOTAL_CODEWORDS[version as usize],
                "version {version}"
            );
            assert!(data_modules % 8 < 8);
        }
    }

    #[test]
    fn test_version_7_reserves_version_areas() {
        let m = build_base_matrix(7);
        let dim = m.dimension();
        assert!(m.is_non_data(0, dim - 11));
        assert!(m.is_non_data(5, dim - 9));
        assert!(m.is_non_data(dim - 9, 5));
        assert!(!m.is_non_data(9, 9));
    }

    #[test]
    fn test_mask_is_involution() {
        let mut m = build_base_matrix(2);
        // Scatter some data bits
        for row in 0..m.dimension() {
            for col in 0..m.dimension() {
                if !m.is_non_data(row, col) && (row * 31 + col * 7) % 3 == 0 {
                    m.set_black(row, col, true);
                }
            }
        }
        let before = m.clone();
        for mask in 0..8u8 {
            apply_mask(&mut m, mask);
            apply_mask(&mut m, mask);
            for row in 0..m.dimension() {
                for col in 0..m.dimension() {
                    assert_eq!(
                        m.is_black(row, col),
                        before.is_black(row, col),
                        "mask {mask} ({row},{col})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_mask_leaves_reserved_cells() {
        let mut m = build_base_matrix(1);
        let before = m.clone();
        apply_mask(&mut m, 0);
        for row in 0..21 {
            for col in 0..21 {
                if m.is_non_data(row, col) {
                    assert_eq!(m.is_black(row, col), before.is_black(row, col));
                }
            }
        }
    }

    #[test]
    fn test_unload_produces_total_codewords() {
        for version in [1u8, 2, 7, 10] {
            let m = build_base_matrix(version);
            let codewords = unload_codewords(&m, version).unwrap();
            assert_eq!(codewords.len(), TOTAL_CODEWORDS[version as usize]);
        }
    }

    #[test]
    fn test_unload_reads_msb_first() {
        let mut m = build_base_matrix(1);
        // First strip reads upward from the bottom-right corner; set the
        // first two modules visited.
        m.set_black(20, 20, true);
        m.set_black(20, 19, false);
        m.set_black(19, 20, true);
        let codewords = unload_codewords(&m, 1).unwrap();
        assert_eq!(codewords[0] >> 5, 0b101);
    }
}
