//! Finder pattern detection using the 1:1:3:1:1 run signature.
//!
//! A horizontal pass over every row yields candidates with a column span
//! and module estimate; a vertical pass over the columns those spans cover
//! confirms each candidate and fills in its row span. Candidates that never
//! receive a vertical match are discarded.

use log::debug;

use crate::models::{BitGrid, Point};

/// Maximum deviation of a run length from its ideal width, in modules
pub(crate) const SIGNATURE_MAX_DEVIATION: f32 = 0.25;
/// Maximum pixel distance between the horizontal and vertical centers
pub(crate) const HOR_VERT_SCAN_MAX_DISTANCE: f32 = 2.0;
/// Minimum ratio between the two directional module estimates
pub(crate) const MODULE_SIZE_DEVIATION: f32 = 0.5;

/// One finder pattern candidate.
///
/// The horizontal scan fills `row`, `col1..col2` and `h_module`; a vertical
/// match fills the rest. `distance` keeps the sentinel value until a match
/// lands, and unmatched candidates are dropped during dedup.
#[derive(Debug, Clone)]
pub struct FinderCandidate {
    pub row: usize,
    pub col1: usize,
    pub col2: usize,
    pub h_module: f32,
    pub col: usize,
    pub row1: usize,
    pub row2: usize,
    pub v_module: f32,
    pub distance: f32,
}

impl FinderCandidate {
    fn from_horizontal(row: usize, col1: usize, col2: usize, h_module: f32) -> Self {
        Self {
            row,
            col1,
            col2,
            h_module,
            col: 0,
            row1: 0,
            row2: 0,
            v_module: 0.0,
            distance: f32::INFINITY,
        }
    }

    /// Whether a vertical scan hit has been accepted
    pub fn is_matched(&self) -> bool {
        self.distance.is_finite()
    }

    /// Center in image coordinates: column from the horizontal span, row
    /// from the vertical span.
    pub fn center(&self) -> Point {
        Point::new(
            (self.col1 + self.col2) as f32 / 2.0,
            (self.row1 + self.row2) as f32 / 2.0,
        )
    }

    /// Combined module size estimate
    pub fn module_size(&self) -> f32 {
        (self.h_module + self.v_module) / 2.0
    }

    /// Offer a vertical scan hit to this candidate. Accepted when the spans
    /// cross, the module estimates agree within [`MODULE_SIZE_DEVIATION`]
    /// and the two center points lie within
    /// [`HOR_VERT_SCAN_MAX_DISTANCE`]; among accepted hits the smallest
    /// distance wins.
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
        self.v_module = v_module;
        self.distance = distance;
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.col1 < other.col2
            && other.col1 < self.col2
            && self.row1 < other.row2
            && other.row1 < self.row2
    }
}

/// Color-flip positions along a row, starting at the first dark run.
/// A trailing dark run is closed with the grid width so every run has both
/// boundaries.
pub(crate) fn row_transitions(grid: &BitGrid, y: usize, x1: usize, x2: usize) -> Vec<usize> {
    let mut flips = Vec::new();
    let mut prev = false;
    for x in x1..x2 {
        let dark = grid.is_dark(x, y);
        if dark != prev {
            flips.push(x);
            prev = dark;
        }
    }
    if prev {
        flips.push(x2);
    }
    flips
}

/// Color-flip positions along a column, starting at the first dark run
pub(crate) fn column_transitions(grid: &BitGrid, x: usize, y1: usize, y2: usize) -> Vec<usize> {
    let mut flips = Vec::new();
    let mut prev = false;
    for y in y1..y2 {
        let dark = grid.is_dark(x, y);
        if dark != prev {
            flips.push(y);
            prev = dark;
        }
    }
    if prev {
        flips.push(y2);
    }
    flips
}

/// Test five consecutive runs against the 1:1:3:1:1 finder signature.
/// Returns the module estimate when the window matches.
fn finder_signature(flips: &[usize], i: usize) -> Option<f32> {
    let module = (flips[i + 5] - flips[i]) as f32 / 7.0;
    let tol = SIGNATURE_MAX_DEVIATION * module;

    let run = |k: usize| (flips[i + k + 1] - flips[i + k]) as f32;
    let fits = (run(0) - module).abs() <= tol
        && (run(1) - module).abs() <= tol
        && (run(2) - 3.0 * module).abs() <= tol
        && (run(3) - module).abs() <= tol
        && (run(4) - module).abs() <= tol;

    fits.then_some(module)
}

/// Locate finder patterns in the binarized grid.
///
/// Returns matched, deduplicated candidates; the caller decides whether
/// three of them form a symbol corner.
pub fn find_finders(grid: &BitGrid) -> Vec<FinderCandidate> {
    let width = grid.width();
    let height = grid.height();
    let mut candidates: Vec<FinderCandidate> = Vec::new();

    // Horizontal signature pass
    for y in 0..height {
        let flips = row_transitions(grid, y, 0, width);
        if flips.len() < 6 {
            continue;
        }
        let mut i = 0;
        while i + 5 < flips.len() {
            if let Some(module) = finder_signature(&flips, i) {
                candidates.push(FinderCandidate::from_horizontal(
                    y,
                    flips[i + 2],
                    flips[i + 3],
                    module,
                ));
            }
            i += 2;
        }
    }

    if candidates.is_empty() {
        return candidates;
    }

    // Vertical pass, restricted to columns covered by some horizontal span
    let mut wanted = vec![false; width];
    for cand in &candidates {
        for flag in wanted.iter_mut().take(cand.col2.min(width)).skip(cand.col1) {
            *flag = true;
        }
    }

    for (x, _) in wanted.iter().enumerate().filter(|(_, &w)| w) {
        let flips = column_transitions(grid, x, 0, height);
        if flips.len() < 6 {
            continue;
        }
        let mut i = 0;
        while i + 5 < flips.len() {
            if let Some(module) = finder_signature(&flips, i) {
                let (row1, row2) = (flips[i + 2], flips[i + 3]);
                for cand in candidates.iter_mut() {
                    cand.try_match(x, row1, row2, module);
                }
            }
            i += 2;
        }
    }

    let found = dedup(candidates);
    debug!("finder scan: {} matched candidates", found.len());
    found
}

/// Drop unmatched candidates; among overlapping pairs keep the one whose
/// horizontal and vertical centers agree best.
fn dedup(candidates: Vec<FinderCandidate>) -> Vec<FinderCandidate> {
    let matched: Vec<FinderCandidate> =
        candidates.into_iter().filter(|c| c.is_matched()).collect();

    let mut keep = vec![true; matched.len()];
    for i in 0..matched.len() {
        if !keep[i] {
            continue;
        }
        for j in (i + 1)..matched.len() {
            if !keep[j] || !matched[i].overlaps(&matched[j]) {
                continue;
            }
            if matched[j].distance < matched[i].distance {
                keep[i] = false;
                break;
            } else {
                keep[j] = false;
            }
        }
    }

    matched
        .into_iter()
        .zip(keep)
        .filter_map(|(c, k)| k.then_some(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Paint a 7x7 finder pattern with its top-left module corner at
    /// (x0, y0), using `u` pixels per module.
    pub(crate) fn paint_finder(grid: &mut BitGrid, x0: usize, y0: usize, u: usize) {
        for my in 0..7 {
            for mx in 0..7 {
                let border = mx == 0 || mx == 6 || my == 0 || my == 6;
                let center = (2..=4).contains(&mx) && (2..=4).contains(&my);
                if border || center {
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
    fn test_single_finder() {
        let mut grid = BitGrid::new(60, 60);
        paint_finder(&mut grid, 10, 10, 4);

        let found = find_finders(&grid);
        assert_eq!(found.len(), 1);

        let center = found[0].center();
        let expected = 10.0 + 3.5 * 4.0;
        assert!((center.x - expected).abs() < 1.0);
        assert!((center.y - expected).abs() < 1.0);
        assert!((found[0].module_size() - 4.0).abs() < 0.5);
    }

    #[test]
    fn test_three_finders() {
        let mut grid = BitGrid::new(200, 200);
        paint_finder(&mut grid, 10, 10, 4);
        paint_finder(&mut grid, 150, 10, 4);
        paint_finder(&mut grid, 10, 150, 4);

        let found = find_finders(&grid);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_empty_grid() {
        let grid = BitGrid::new(50, 50);
        assert!(find_finders(&grid).is_empty());
    }

    #[test]
    fn test_solid_grid_has_no_signature() {
        let mut grid = BitGrid::new(50, 50);
        for y in 0..50 {
            for x in 0..50 {
                grid.set(x, y, true);
            }
        }
        assert!(find_finders(&grid).is_empty());
    }

    #[test]
    fn test_signature_tolerance_monotone() {
        // A window accepted at the working tolerance stays accepted when
        // the tolerance grows.
        let flips = [0usize, 4, 8, 20, 24, 28];
        let module = (flips[5] - flips[0]) as f32 / 7.0;
        for factor in [1.0f32, 1.5, 2.0] {
            let tol = factor * SIGNATURE_MAX_DEVIATION * module;
            let run = |k: usize| (flips[k + 1] - flips[k]) as f32;
            assert!((run(0) - module).abs() <= tol);
            assert!((run(2) - 3.0 * module).abs() <= tol);
        }
    }

    #[test]
    fn test_row_transitions_closes_trailing_run() {
        let mut grid = BitGrid::new(8, 1);
        for x in 5..8 {
            grid.set(x, 0, true);
        }
        assert_eq!(row_transitions(&grid, 0, 0, 8), vec![5, 8]);
    }
}
