//! Alignment pattern detection for versions 2 and above.
//!
//! The signature is n:1:1:1:n — a single dark center module ringed by one
//! light and one dark module. The outer dark runs border arbitrary data, so
//! only their minimum width is checked.

use log::debug;

use crate::detector::finder::{
    column_transitions, row_transitions, HOR_VERT_SCAN_MAX_DISTANCE, MODULE_SIZE_DEVIATION,
    SIGNATURE_MAX_DEVIATION,
};
use crate::models::{BitGrid, Point};

/// Search window half-side as a fraction of the corner side lengths
pub(crate) const ALIGNMENT_SEARCH_AREA: f32 = 0.3;

/// A matched alignment pattern candidate
#[derive(Debug, Clone)]
pub struct AlignmentCandidate {
    pub row: usize,
    pub col1: usize,
    pub col2: usize,
    pub h_module: f32,
    pub col: usize,
    pub row1: usize,
    pub row2: usize,
    pub distance: f32,
}

impl AlignmentCandidate {
    /// Center in image coordinates
    pub fn center(&self) -> Point {
        Point::new(
            (self.col1 + self.col2) as f32 / 2.0,
            (self.row1 + self.row2) as f32 / 2.0,
        )
    }

    fn try_match(&mut self, col: usize, row1: usize, row2: usize, v_module: f32) {
        if col < self.col1 || col >= self.col2 || self.row < row1 || self.row >= row2 {
            return;
        }
        let min = self.h_module.min(v_module);
        let max = self.h_module.max(v_module);
        if min < MODULE_SIZE_DEVIATION * max {
            return;
        }
        let h_center = Point::new((self.col1 + self.col2) as f32 / 2.0, self.row as f32);
        let v_center = Point::new(col as f32, (row1 + row2) as f32 / 2.0);
        let distance = h_center.distance(&v_center);
        if distance > HOR_VERT_SCAN_MAX_DISTANCE || distance >= self.distance {
            return;
        }
        self.col = col;
        self.row1 = row1;
        self.row2 = row2;
        self.distance = distance;
    }
}

/// Test five runs against the n:1:1:1:n alignment signature. The center
/// span is the middle dark run.
fn alignment_signature(flips: &[usize], i: usize) -> Option<f32> {
    let module = (flips[i + 4] - flips[i + 1]) as f32 / 3.0;
    let tol = SIGNATURE_MAX_DEVIATION * module;

    let run = |k: usize| (flips[i + k + 1] - flips[i + k]) as f32;
    let fits = run(0) >= module - tol
        && (run(1) - module).abs() <= tol
        && (run(2) - module).abs() <= tol
        && (run(3) - module).abs() <= tol
        && run(4) >= module - tol;

    fits.then_some(module)
}

/// Scan a sub-rectangle of the grid for alignment patterns, returning the
/// matched candidates ordered by center agreement (best first).
pub fn find_alignment(
    grid: &BitGrid,
    x1: usize,
    y1: usize,
    x2: usize,
    y2: usize,
) -> Vec<AlignmentCandidate> {
    let x1 = x1.min(grid.width());
    let x2 = x2.min(grid.width());
    let y1 = y1.min(grid.height());
    let y2 = y2.min(grid.height());
    if x1 >= x2 || y1 >= y2 {
        return Vec::new();
    }

    let mut candidates: Vec<AlignmentCandidate> = Vec::new();
    for y in y1..y2 {
        let flips = row_transitions(grid, y, x1, x2);
        if flips.len() < 6 {
            continue;
        }
        let mut i = 0;
        while i + 5 < flips.len() {
            if let Some(module) = alignment_signature(&flips, i) {
                candidates.push(AlignmentCandidate {
                    row: y,
                    col1: flips[i + 2],
                    col2: flips[i + 3],
                    h_module: module,
                    col: 0,
                    row1: 0,
                    row2: 0,
                    distance: f32::INFINITY,
                });
            }
            i += 2;
        }
    }

    for x in x1..x2 {
        if !candidates.iter().any(|c| (c.col1..c.col2).contains(&x)) {
            continue;
        }
        let flips = column_transitions(grid, x, y1, y2);
        if flips.len() < 6 {
            continue;
        }
        let mut i = 0;
        while i + 5 < flips.len() {
            if let Some(module) = alignment_signature(&flips, i) {
                let (row1, row2) = (flips[i + 2], flips[i + 3]);
                for cand in candidates.iter_mut() {
                    cand.try_match(x, row1, row2, module);
                }
            }
            i += 2;
        }
    }

    let mut matched: Vec<AlignmentCandidate> = candidates
        .into_iter()
        .filter(|c| c.distance.is_finite())
        .collect();
    matched.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    debug!("alignment scan: {} candidates in window", matched.len());
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Paint a 5x5 alignment pattern with its top-left corner at (x0, y0)
    fn paint_alignment(grid: &mut BitGrid, x0: usize, y0: usize, u: usize) {
        for my in 0..5 {
            for mx in 0..5 {
                let ring = mx == 0 || mx == 4 || my == 0 || my == 4;
                let center = mx == 2 && my == 2;
                if ring || center {
                    for y in y0 + my * u..y0 + (my + 1) * u {
                        for x in x0 + mx * u..x0 + (mx + 1) * u {
                            grid.set(x, y, true);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_alignment_in_window() {
        let mut grid = BitGrid::new(60, 60);
        paint_alignment(&mut grid, 20, 20, 3);

        let found = find_alignment(&grid, 10, 10, 50, 50);
        assert!(!found.is_empty());

        let center = found[0].center();
        let expected = 20.0 + 2.5 * 3.0;
        assert!((center.x - expected).abs() < 1.0);
        assert!((center.y - expected).abs() < 1.0);
    }

    #[test]
    fn test_empty_window() {
        let grid = BitGrid::new(60, 60);
        assert!(find_alignment(&grid, 0, 0, 60, 60).is_empty());
        assert!(find_alignment(&grid, 50, 50, 10, 10).is_empty());
    }
}
