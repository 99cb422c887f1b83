//! Spatial hardening passes applied around the frequency domain embedding.
//!
//! Two kinds of pass exist:
//! - Intensity bias: samples below the threshold are pulled towards it before lossy
//!   recompression, and pushed back out afterwards. This is lossy, recovery is within a couple
//!   of levels at best.
//! - Interleave: pixels of the top left cell of a 3x3 (or 2x2) partition are exchanged with
//!   pixels of the other cells, spreading a localized signal over the whole image. The nine
//!   and four way passes skip exchanges whose target lies on the first row or column. Every
//!   interleave is a set of disjoint swaps and therefore its own inverse.
//!
//! Passes can be chained in a [`Hardening`] pipeline, which undoes them in reverse order.

use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::PixelGrid;

/// Pull every color sample below `threshold` four fifths of the way towards it.
pub fn bias_up(grid: &mut PixelGrid, threshold: u8) {
    let t = threshold as f32;
    map_color_samples(grid, |v| {
        if v < threshold {
            let v = v as f32;
            (v + (t - v) * 4.0 / 5.0).round().clamp(0.0, 255.0) as u8
        } else {
            v
        }
    });
}

/// Approximate inverse of [`bias_up`], expanding samples below `threshold` away from it.
pub fn bias_down(grid: &mut PixelGrid, threshold: u8) {
    let t = threshold as f32;
    map_color_samples(grid, |v| {
        if v < threshold {
            (v as f32 * 5.0 - t * 4.0).clamp(0.0, 255.0) as u8
        } else {
            v
        }
    });
}

fn map_color_samples<F: Fn(u8) -> u8>(grid: &mut PixelGrid, f: F) {
    let channels = grid.channels();
    let color = grid.color_channels();
    for (i, sample) in grid.data_mut().iter_mut().enumerate() {
        if i % channels < color {
            *sample = f(*sample);
        }
    }
}

/// Cell offsets, as (cell row, cell col), keyed by `row mod 8`.
const EIGHT: [Option<(usize, usize)>; 8] = [
    Some((1, 1)),
    Some((0, 1)),
    Some((1, 0)),
    Some((2, 2)),
    Some((0, 2)),
    Some((2, 0)),
    Some((1, 2)),
    Some((2, 1)),
];

/// Cell offsets keyed by `(row + col) mod 9`, the last entry leaves the pixel in place.
const NINE: [Option<(usize, usize)>; 9] = [
    Some((0, 1)),
    Some((1, 1)),
    Some((1, 0)),
    Some((0, 2)),
    Some((1, 2)),
    Some((2, 2)),
    Some((2, 1)),
    Some((2, 0)),
    None,
];

/// Cell offsets keyed by `(row + col) mod 4` on a 2x2 partition.
const FOUR: [Option<(usize, usize)>; 4] = [Some((0, 1)), Some((1, 1)), Some((1, 0)), None];

/// Exchange schedule of an interleave pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Interleave {
    /// 3x3 cells, anchors on even columns, keyed by row.
    Eight,
    /// 3x3 cells, every anchor, keyed by the anti-diagonal.
    Nine,
    /// 2x2 cells, every anchor, keyed by the anti-diagonal.
    Four,
}

impl Interleave {
    /// Number of cells along each axis.
    pub fn cells(&self) -> usize {
        match self {
            Interleave::Eight | Interleave::Nine => 3,
            Interleave::Four => 2,
        }
    }

    /// Target cell for the anchor at `(row, col)` of the top left cell.
    pub fn target(&self, row: usize, col: usize) -> Option<(usize, usize)> {
        match self {
            Interleave::Eight => {
                if col % 2 == 0 {
                    EIGHT[row % EIGHT.len()]
                } else {
                    None
                }
            }
            Interleave::Nine => NINE[(row + col) % NINE.len()],
            Interleave::Four => FOUR[(row + col) % FOUR.len()],
        }
    }

    /// Whether exchanges landing on the first row or column of the grid are skipped.
    fn skips_grid_edge(&self) -> bool {
        matches!(self, Interleave::Nine | Interleave::Four)
    }
}

/// An interleave bound to the grid dimensions its cell boundaries derive from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScrambleMap {
    rows: usize,
    cols: usize,
    interleave: Interleave,
}

impl ScrambleMap {
    pub fn new(rows: usize, cols: usize, interleave: Interleave) -> Result<Self> {
        let n = interleave.cells();
        if rows < n || cols < n {
            return Err(Error::DimensionMismatch {
                expected: format!("at least {n}x{n}"),
                actual: format!("{rows}x{cols}"),
            });
        }
        Ok(ScrambleMap {
            rows,
            cols,
            interleave,
        })
    }

    pub fn for_grid(grid: &PixelGrid, interleave: Interleave) -> Result<Self> {
        Self::new(grid.rows(), grid.cols(), interleave)
    }

    /// Size of one cell, as (rows, cols). The remainder border is never touched.
    pub fn cell(&self) -> (usize, usize) {
        let n = self.interleave.cells();
        (self.rows / n, self.cols / n)
    }

    /// Perform the exchange. Applying the same map twice restores the grid.
    pub fn apply(&self, grid: &mut PixelGrid) -> Result<()> {
        if grid.dimensions() != (self.rows, self.cols) {
            return Err(Error::dimensions((self.rows, self.cols), grid.dimensions()));
        }
        let (cell_rows, cell_cols) = self.cell();
        for row in 0..cell_rows {
            for col in 0..cell_cols {
                if let Some((dr, dc)) = self.interleave.target(row, col) {
                    let target = (row + dr * cell_rows, col + dc * cell_cols);
                    if self.interleave.skips_grid_edge() && (target.0 == 0 || target.1 == 0) {
                        continue;
                    }
                    grid.swap_pixels((row, col), target);
                }
            }
        }
        Ok(())
    }
}

/// Convenience for a one-off interleave on a grid.
pub fn scramble(grid: &mut PixelGrid, interleave: Interleave) -> Result<()> {
    ScrambleMap::for_grid(grid, interleave)?.apply(grid)
}

/// One pass of a hardening pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    Bias,
    Interleave(Interleave),
}

/// Ordered chain of hardening passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hardening {
    steps: Vec<Step>,
    threshold: u8,
}

/// Record of a hardening pipeline applied to a grid of known dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hardened {
    steps: Vec<Step>,
    threshold: u8,
    rows: usize,
    cols: usize,
}

impl Hardening {
    pub fn new(steps: Vec<Step>, threshold: u8) -> Self {
        Hardening { steps, threshold }
    }

    /// Bias followed by eight, nine and eight way interleaves.
    pub fn spread(threshold: u8) -> Self {
        Hardening::new(
            vec![
                Step::Bias,
                Step::Interleave(Interleave::Eight),
                Step::Interleave(Interleave::Nine),
                Step::Interleave(Interleave::Eight),
            ],
            threshold,
        )
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run every step in order. All cell geometry is validated before the grid is modified.
    pub fn apply(&self, grid: &mut PixelGrid) -> Result<Hardened> {
        let (rows, cols) = grid.dimensions();
        let maps = self.maps(rows, cols)?;
        for (step, map) in self.steps.iter().zip(maps.iter()) {
            debug!(?step, "hardening");
            match map {
                Some(map) => map.apply(grid)?,
                None => bias_up(grid, self.threshold),
            }
        }
        Ok(Hardened {
            steps: self.steps.clone(),
            threshold: self.threshold,
            rows,
            cols,
        })
    }

    /// Run the inverse of every step in reverse order on a grid of `rows x cols`.
    pub fn undo(&self, grid: &mut PixelGrid) -> Result<()> {
        let (rows, cols) = grid.dimensions();
        let maps = self.maps(rows, cols)?;
        for (step, map) in self.steps.iter().zip(maps.iter()).rev() {
            debug!(?step, "undoing hardening");
            match map {
                Some(map) => map.apply(grid)?,
                None => bias_down(grid, self.threshold),
            }
        }
        Ok(())
    }

    fn maps(&self, rows: usize, cols: usize) -> Result<Vec<Option<ScrambleMap>>> {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Bias => Ok(None),
                Step::Interleave(interleave) => {
                    ScrambleMap::new(rows, cols, *interleave).map(Some)
                }
            })
            .collect()
    }
}

impl Hardened {
    /// Undo the recorded pipeline. The grid must have the dimensions it was hardened at.
    pub fn undo(&self, grid: &mut PixelGrid) -> Result<()> {
        if grid.dimensions() != (self.rows, self.cols) {
            return Err(Error::dimensions((self.rows, self.cols), grid.dimensions()));
        }
        Hardening::new(self.steps.clone(), self.threshold).undo(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(rows: usize, cols: usize) -> PixelGrid {
        let data = (0..rows * cols).map(|i| (i % 251) as u8).collect();
        PixelGrid::from_raw(rows, cols, 1, data).unwrap()
    }

    #[test]
    fn test_bias_up_values() {
        let mut grid = PixelGrid::from_raw(1, 4, 1, vec![0, 100, 239, 250]).unwrap();
        bias_up(&mut grid, 240);
        assert_eq!(grid.data(), &[192, 212, 240, 250]);
    }

    #[test]
    fn test_bias_monotone_and_bounded() {
        for v in 0..=255u8 {
            let mut grid = PixelGrid::filled(1, 1, 1, v);
            bias_up(&mut grid, 240);
            let up = grid.get(0, 0, 0);
            assert!(up >= v);
            bias_down(&mut grid, 240);
            let back = grid.get(0, 0, 0);
            assert!((back as i32 - v as i32).abs() <= 2, "{v} -> {up} -> {back}");
        }
    }

    #[test]
    fn test_bias_down_clamps() {
        let mut grid = PixelGrid::from_raw(1, 2, 1, vec![10, 239]).unwrap();
        bias_down(&mut grid, 240);
        assert_eq!(grid.data(), &[0, 235]);
    }

    #[test]
    fn test_bias_skips_alpha() {
        let mut grid = PixelGrid::filled(1, 1, 4, 0);
        bias_up(&mut grid, 240);
        assert_eq!(grid.pixel(0, 0), &[192, 192, 192, 0]);
    }

    #[test]
    fn test_tables_cover_all_neighbours() {
        for table in [&EIGHT[..], &NINE[..]] {
            let mut targets = table.iter().flatten().copied().collect::<Vec<_>>();
            targets.sort();
            targets.dedup();
            assert_eq!(targets.len(), 8);
            assert!(!targets.contains(&(0, 0)));
        }
        assert_eq!(Interleave::Nine.target(4, 4), None);
        assert_eq!(Interleave::Eight.target(3, 1), None);
        assert_eq!(Interleave::Eight.target(3, 2), Some((2, 2)));
    }

    #[test]
    fn test_eight_moves_expected_pixels() {
        let mut grid = numbered(9, 9);
        let original = grid.clone();
        scramble(&mut grid, Interleave::Eight).unwrap();
        // row 0 col 0 swaps with the center cell.
        assert_eq!(grid.get(0, 0, 0), original.get(3, 3, 0));
        assert_eq!(grid.get(3, 3, 0), original.get(0, 0, 0));
        // row 1 col 2 swaps with the cell to the right.
        assert_eq!(grid.get(1, 2, 0), original.get(1, 5, 0));
        // odd columns stay.
        assert_eq!(grid.get(1, 1, 0), original.get(1, 1, 0));
    }

    #[test]
    fn test_edge_anchors_stay_in_place() {
        let mut grid = numbered(9, 9);
        let original = grid.clone();
        scramble(&mut grid, Interleave::Nine).unwrap();
        // (0, 0) would go to (0, 3), on the first row.
        assert_eq!(grid.get(0, 0, 0), original.get(0, 0, 0));
        assert_eq!(grid.get(0, 3, 0), original.get(0, 3, 0));
        // (1, 0) goes to (4, 3).
        assert_eq!(grid.get(1, 0, 0), original.get(4, 3, 0));
        assert_eq!(grid.get(4, 3, 0), original.get(1, 0, 0));
        // (2, 0) would go to (5, 0), on the first column.
        assert_eq!(grid.get(2, 0, 0), original.get(2, 0, 0));

        let mut grid = numbered(4, 4);
        scramble(&mut grid, Interleave::Four).unwrap();
        // (0, 0) would go to (0, 2), (0, 1) goes to (2, 3).
        assert_eq!(grid.get(0, 0, 0), 0);
        assert_eq!(grid.get(0, 1, 0), 11);
        assert_eq!(grid.get(2, 3, 0), 1);
    }

    #[test]
    fn test_self_inverse() {
        for interleave in [Interleave::Eight, Interleave::Nine, Interleave::Four] {
            let original = numbered(31, 47);
            let mut grid = original.clone();
            scramble(&mut grid, interleave).unwrap();
            assert_ne!(grid, original);
            scramble(&mut grid, interleave).unwrap();
            assert_eq!(grid, original);
        }
    }

    #[test]
    fn test_remainder_untouched() {
        let original = numbered(10, 11);
        let mut grid = original.clone();
        scramble(&mut grid, Interleave::Nine).unwrap();
        for col in 0..11 {
            assert_eq!(grid.get(9, col, 0), original.get(9, col, 0));
        }
        for row in 0..10 {
            assert_eq!(grid.get(row, 9, 0), original.get(row, 9, 0));
            assert_eq!(grid.get(row, 10, 0), original.get(row, 10, 0));
        }
    }

    #[test]
    fn test_map_rejects_other_dimensions() {
        let map = ScrambleMap::new(30, 30, Interleave::Eight).unwrap();
        let mut grid = numbered(30, 31);
        assert!(matches!(
            map.apply(&mut grid),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(ScrambleMap::new(2, 30, Interleave::Nine).is_err());
        assert!(ScrambleMap::new(2, 2, Interleave::Four).is_ok());
    }

    #[test]
    fn test_composition_order_matters() {
        let original = numbered(36, 36);
        let mut grid = original.clone();
        scramble(&mut grid, Interleave::Eight).unwrap();
        scramble(&mut grid, Interleave::Nine).unwrap();

        let mut wrong = grid.clone();
        scramble(&mut wrong, Interleave::Eight).unwrap();
        scramble(&mut wrong, Interleave::Nine).unwrap();
        assert_ne!(wrong, original);

        scramble(&mut grid, Interleave::Nine).unwrap();
        scramble(&mut grid, Interleave::Eight).unwrap();
        assert_eq!(grid, original);
    }

    #[test]
    fn test_hardening_round_trip() {
        let original = numbered(33, 42);
        let mut grid = original.clone();
        let hardened = Hardening::spread(240).apply(&mut grid).unwrap();
        assert_ne!(grid, original);
        hardened.undo(&mut grid).unwrap();
        for (a, b) in grid.data().iter().zip(original.data().iter()) {
            assert!((*a as i32 - *b as i32).abs() <= 2);
        }

        let mut other = numbered(33, 43);
        assert!(hardened.undo(&mut other).is_err());
    }

    #[test]
    fn test_hardening_interleave_only_is_exact() {
        let original = numbered(27, 27);
        let mut grid = original.clone();
        let pipeline = Hardening::new(
            vec![
                Step::Interleave(Interleave::Four),
                Step::Interleave(Interleave::Nine),
            ],
            240,
        );
        pipeline.apply(&mut grid).unwrap();
        pipeline.undo(&mut grid).unwrap();
        assert_eq!(grid, original);
    }
}
