//! Match detection - pure queries over the grid, no mutation
//!
//! Two shapes matter:
//!
//! - a **run**: 3 or more orthogonally contiguous same-type tiles in one
//!   axis (the probed cell plus its extensions);
//! - a **bomb-stack**: a solid same-type 2x2 square with the probed cell as
//!   one of its corners, checked in all four orientations.
//!
//! Bomb tiles and empty cells never participate in either shape: equality is
//! defined only between ordinary tiles of the same variant.

use tilematch_types::{Coord, TileKind};

use crate::grid::Grid;

/// Whether two cells hold ordinary tiles of the same variant.
/// Out-of-bounds, empty and bomb cells never match anything.
pub fn same_ordinary(grid: &Grid, a: Coord, b: Coord) -> bool {
    match (grid.get(a), grid.get(b)) {
        (Some(Some(TileKind::Ordinary(x))), Some(Some(TileKind::Ordinary(y)))) => x == y,
        _ => false,
    }
}

/// Count contiguous same-type cells walking away from `at` in one direction.
fn streak(grid: &Grid, at: Coord, dr: i8, dc: i8) -> u32 {
    let mut count = 0;
    let mut cur = at;
    while let Some(next) = cur.offset(dr, dc) {
        if !same_ordinary(grid, at, next) {
            break;
        }
        count += 1;
        cur = next;
    }
    count
}

/// Vertical run of 3+ through `at`.
pub fn is_vertical_run(grid: &Grid, at: Coord) -> bool {
    streak(grid, at, -1, 0) + streak(grid, at, 1, 0) >= 2
}

/// Horizontal run of 3+ through `at`.
pub fn is_horizontal_run(grid: &Grid, at: Coord) -> bool {
    streak(grid, at, 0, -1) + streak(grid, at, 0, 1) >= 2
}

/// Whether `at` participates in a run in either axis.
pub fn is_run(grid: &Grid, at: Coord) -> bool {
    is_vertical_run(grid, at) || is_horizontal_run(grid, at)
}

/// The four 2x2 orientations with the probed cell as a corner, in the
/// evaluation order the rules use everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOrientation {
    RightBottom,
    RightTop,
    LeftBottom,
    LeftTop,
}

impl StackOrientation {
    pub const ALL: [StackOrientation; 4] = [
        StackOrientation::RightBottom,
        StackOrientation::RightTop,
        StackOrientation::LeftBottom,
        StackOrientation::LeftTop,
    ];

    /// Offsets of the three partner cells completing the square.
    fn offsets(self) -> [(i8, i8); 3] {
        match self {
            StackOrientation::RightBottom => [(0, 1), (1, 0), (1, 1)],
            StackOrientation::RightTop => [(0, 1), (-1, 0), (-1, 1)],
            StackOrientation::LeftBottom => [(0, -1), (1, 0), (1, -1)],
            StackOrientation::LeftTop => [(0, -1), (-1, 0), (-1, -1)],
        }
    }

    /// Partner coordinates, `None` when the square would cross the top or
    /// left edge. Right/bottom overflow is caught by grid bounds checks.
    pub fn partners(self, at: Coord) -> Option<[Coord; 3]> {
        let [a, b, c] = self.offsets();
        Some([
            at.offset(a.0, a.1)?,
            at.offset(b.0, b.1)?,
            at.offset(c.0, c.1)?,
        ])
    }
}

/// First orientation (in [`StackOrientation::ALL`] order) forming a solid
/// same-type 2x2 with `at` as a corner.
pub fn stack_orientation(grid: &Grid, at: Coord) -> Option<StackOrientation> {
    // A bomb or empty probed cell can never anchor a square.
    if !matches!(grid.get(at), Some(Some(TileKind::Ordinary(_)))) {
        return None;
    }

    StackOrientation::ALL.into_iter().find(|orientation| {
        orientation
            .partners(at)
            .is_some_and(|partners| partners.iter().all(|&p| same_ordinary(grid, at, p)))
    })
}

/// Whether `at` anchors a bomb-stack. Bomb-stack strictly pre-empts run
/// evaluation wherever both are geometrically possible; callers check this
/// first.
pub fn is_bomb_stack(grid: &Grid, at: Coord) -> bool {
    stack_orientation(grid, at).is_some()
}
