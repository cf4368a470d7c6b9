//! The top-level decode loop: corner enumeration and stage wiring.
//!
//! Every unordered triple of surviving finders is tried as a corner. A
//! corner first decodes through the 3-point affine transform; when that
//! fails and the symbol is version 2 or above, the predicted bottom-right
//! alignment pattern is searched and each candidate retried with the
//! 4-point projective transform. Failures are local to the corner.

use log::{debug, trace};

use crate::decoder::deinterleave::deinterleave_and_correct;
use crate::decoder::format::read_format_info;
use crate::decoder::matrix::{apply_mask, build_base_matrix, sample_matrix, unload_codewords};
use crate::decoder::segments::decode_segments;
use crate::decoder::tables::ec_blocks;
use crate::decoder::version::read_version_info;
use crate::detector::alignment::{find_alignment, ALIGNMENT_SEARCH_AREA};
use crate::detector::corner::Corner;
use crate::detector::finder::find_finders;
use crate::detector::transform::GridTransform;
use crate::error::{DecodeError, Result};
use crate::models::{BitGrid, Point, Symbol};

/// Decode every recognizable symbol in a binarized grid
pub fn decode_grid(grid: &BitGrid) -> Vec<Symbol> {
    let finders = find_finders(grid);
    if finders.len() < 3 {
        debug!("{} finders after dedup, need 3", finders.len());
        return Vec::new();
    }

    let mut used = vec![false; finders.len()];
    let mut symbols = Vec::new();

    for i in 0..finders.len() {
        for j in (i + 1)..finders.len() {
            for k in (j + 1)..finders.len() {
                if used[i] || used[j] || used[k] {
                    continue;
                }
                let corner = match Corner::try_new(&finders[i], &finders[j], &finders[k]) {
                    Ok(corner) => corner,
                    Err(_) => continue,
                };
                match decode_corner(grid, &corner) {
                    Ok(symbol) => {
                        debug!(
                            "decoded v{} {:?} symbol, {} bytes",
                            symbol.version,
                            symbol.ec_level,
                            symbol.data.len()
                        );
                        used[i] = true;
                        used[j] = true;
                        used[k] = true;
                        symbols.push(symbol);
                    }
                    Err(err) => trace!("corner ({i},{j},{k}) failed: {err}"),
                }
            }
        }
    }

    symbols
}

/// Decode one corner: 3-point first, then alignment-assisted 4-point
fn decode_corner(grid: &BitGrid, corner: &Corner) -> Result<Symbol> {
    let first = attempt(grid, corner, None);
    let err = match first {
        Ok(symbol) => return Ok(symbol),
        Err(err) => err,
    };
    if corner.version_estimate < 2 {
        return Err(err);
    }

    // Predict the bottom-right alignment pattern through the affine frame
    // and search a window around it.
    let dimension = 17 + 4 * corner.version_estimate as usize;
    let (tl, tr, bl) = corner.centers();
    let affine = GridTransform::affine(dimension, tl, tr, bl)?;
    let module = (dimension - 7) as f32;
    let predicted = affine.map(module, module);

    let half = ALIGNMENT_SEARCH_AREA * (corner.top_line_length + corner.left_line_length) / 2.0;
    let x1 = (predicted.x - half).max(0.0) as usize;
    let y1 = (predicted.y - half).max(0.0) as usize;
    let x2 = (predicted.x + half).max(0.0) as usize;
    let y2 = (predicted.y + half).max(0.0) as usize;

    for candidate in find_alignment(grid, x1, y1, x2, y2) {
        trace!("retrying with alignment at {:?}", candidate.center());
        if let Ok(symbol) = attempt(grid, corner, Some(candidate.center())) {
            return Ok(symbol);
        }
    }
    Err(err)
}

/// One full decode attempt through a fixed transform family
fn attempt(grid: &BitGrid, corner: &Corner, alignment: Option<Point>) -> Result<Symbol> {
    let (tl, tr, bl) = corner.centers();
    let mut version = corner.version_estimate;
    let mut dimension = 17 + 4 * version as usize;

    let build = |dimension: usize| -> Result<GridTransform> {
        match alignment {
            Some(point) => GridTransform::projective(dimension, tl, tr, bl, point),
            None => GridTransform::affine(dimension, tl, tr, bl),
        }
    };
    let mut transform = build(dimension)?;

    // Version info outranks the geometric estimate; a correction moves the
    // grid, so the transform is rebuilt.
    if version >= 7 {
        let read = read_version_info(grid, &transform, dimension)?;
        if read != version {
            debug!("version corrected {version} -> {read}");
            version = read;
            dimension = 17 + 4 * version as usize;
            transform = build(dimension)?;
        }
    }

    let format = read_format_info(grid, &transform, dimension)?;

    let mut matrix = build_base_matrix(version);
    sample_matrix(grid, &transform, &mut matrix, format.ec_level)?;
    apply_mask(&mut matrix, format.mask);

    let codewords = unload_codewords(&matrix, version)?;
    let blocks = ec_blocks(version, format.ec_level).ok_or(DecodeError::CornerInvalid)?;
    let data = deinterleave_and_correct(&codewords, &blocks)?;
    let payload = decode_segments(&data, version)?;

    Ok(Symbol {
        data: payload.data,
        version,
        dimension,
        ec_level: format.ec_level,
        mask: format.mask,
        eci_assignment_value: payload.eci_assignment_value,
    })
}
