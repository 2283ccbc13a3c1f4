//! Grid module - board storage and structural mutation
//!
//! The grid is a fixed `rows x cols` rectangle created once per session and
//! mutated in place. Cells hold a [`Cell`] value (`None` only during the
//! transient window between clearing and compaction) plus a stable [`TileId`]
//! that travels with the value through swaps and gravity, so presentation can
//! follow a tile's visual instance across logical moves.
//!
//! Uses flat row-major storage with bounds-checked access: `get` returns
//! `None` for out-of-bounds and `Some(cell)` otherwise.

use std::collections::VecDeque;

use arrayvec::ArrayVec;

use tilematch_types::{Cell, Coord, TileId, TileKind, TileMove};

use crate::matcher;

/// The playing grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: u8,
    cols: u8,
    /// Cell values, row-major order (row * cols + col).
    cells: Vec<Cell>,
    /// Tile identities, permuted alongside `cells` by swaps and falls.
    ids: Vec<TileId>,
}

/// Result of converting a cell into a bomb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BombCreation {
    pub at: Coord,
    /// Pre-conversion variant, used by presentation to pick the bomb skin.
    pub prior: u8,
    /// The three partner tiles consumed by the conversion, each tagged with
    /// the bomb cell as its convergence target.
    pub consumed: ArrayVec<TileMove, 3>,
}

impl Grid {
    /// Create an empty grid. Cells are filled by the fill policy afterwards.
    pub fn new(rows: u8, cols: u8) -> Self {
        let len = rows as usize * cols as usize;
        Self {
            rows,
            cols,
            cells: vec![None; len],
            ids: (0..len as u32).map(TileId).collect(),
        }
    }

    /// Calculate flat index, `None` when out of bounds.
    #[inline]
    fn index(&self, at: Coord) -> Option<usize> {
        if at.row >= self.rows || at.col >= self.cols {
            return None;
        }
        Some(at.row as usize * self.cols as usize + at.col as usize)
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn is_inside(&self, at: Coord) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    /// Cell at `at`. Outer `None` means out of bounds.
    pub fn get(&self, at: Coord) -> Option<Cell> {
        self.index(at).map(|idx| self.cells[idx])
    }

    /// Set the cell value at `at`. Returns false if out of bounds.
    pub fn set(&mut self, at: Coord, cell: Cell) -> bool {
        match self.index(at) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Tile identity at `at`, `None` if out of bounds. Identity is present
    /// even while the cell value is empty.
    pub fn id_at(&self, at: Coord) -> Option<TileId> {
        self.index(at).map(|idx| self.ids[idx])
    }

    /// Exchange two cells, values and identities together.
    /// Returns false (and changes nothing) if either is out of bounds.
    pub fn swap(&mut self, a: Coord, b: Coord) -> bool {
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            return false;
        };
        self.cells.swap(ia, ib);
        self.ids.swap(ia, ib);
        true
    }

    /// Row-major iteration over all coordinates.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let rows = self.rows;
        let cols = self.cols;
        (0..rows).flat_map(move |row| (0..cols).map(move |col| Coord::new(row, col)))
    }

    pub fn count_empty(&self) -> u32 {
        self.cells.iter().filter(|c| c.is_none()).count() as u32
    }

    pub fn has_empty(&self) -> bool {
        self.cells.iter().any(|c| c.is_none())
    }

    /// Clear the run(s) through `at`: re-derives the extents in whichever
    /// axis qualifies (vertical before horizontal) and empties every cell in
    /// them, the probed cell last. Returns the cleared coordinates.
    pub fn clear_run(&mut self, at: Coord) -> Vec<Coord> {
        let mut cleared = Vec::new();

        if matcher::is_vertical_run(self, at) {
            self.clear_walk(at, -1, 0, &mut cleared);
            self.clear_walk(at, 1, 0, &mut cleared);
        }

        if matcher::is_horizontal_run(self, at) {
            self.clear_walk(at, 0, -1, &mut cleared);
            self.clear_walk(at, 0, 1, &mut cleared);
        }

        self.set(at, None);
        cleared.push(at);
        cleared
    }

    /// Walk from `at` clearing contiguous same-type cells in one direction.
    fn clear_walk(&mut self, at: Coord, dr: i8, dc: i8, cleared: &mut Vec<Coord>) {
        let mut cur = at;
        while let Some(next) = cur.offset(dr, dc) {
            if !matcher::same_ordinary(self, at, next) {
                break;
            }
            self.set(next, None);
            cleared.push(next);
            cur = next;
        }
    }

    /// Convert `at` into a bomb: empties the three partner cells of the first
    /// matching 2x2 orientation and sets `at` to [`TileKind::Bomb`].
    ///
    /// # Panics
    ///
    /// Panics if `at` does not satisfy a bomb-stack check. Calling this
    /// without a prior [`matcher::is_bomb_stack`] confirmation is a
    /// programming error, not a recoverable condition.
    pub fn create_bomb(&mut self, at: Coord) -> BombCreation {
        let prior = match self.get(at) {
            Some(Some(TileKind::Ordinary(v))) => v,
            other => panic!("create_bomb at {}: not an ordinary tile ({:?})", at, other),
        };
        let Some(orientation) = matcher::stack_orientation(self, at) else {
            panic!("create_bomb at {}: no same-type 2x2 present", at);
        };

        let mut consumed = ArrayVec::new();
        for partner in orientation
            .partners(at)
            .expect("matched orientation has in-range partners")
        {
            let tile = self.id_at(partner).expect("partner is inside the grid");
            self.set(partner, None);
            consumed.push(TileMove {
                tile,
                from: partner,
                to: at,
            });
        }
        self.set(at, Some(TileKind::Bomb));

        BombCreation {
            at,
            prior,
            consumed,
        }
    }

    /// Detonate at `at`: empties the cell and its edge-clamped Moore
    /// neighborhood, chaining through any bomb encountered in a footprint.
    ///
    /// The chain is an explicit worklist, not recursion, so adversarial bomb
    /// layouts cannot overflow the stack. Clearing an already-empty cell is a
    /// no-op, which makes the whole operation idempotent per cell.
    ///
    /// Returns the full blast footprint in clearing order.
    pub fn detonate(&mut self, at: Coord) -> Vec<Coord> {
        let mut footprint = Vec::new();
        let mut worklist = VecDeque::new();
        worklist.push_back(at);

        while let Some(center) = worklist.pop_front() {
            for dr in -1i8..=1 {
                for dc in -1i8..=1 {
                    let Some(cell) = center.offset(dr, dc) else {
                        continue;
                    };
                    match self.get(cell) {
                        Some(Some(kind)) => {
                            if kind.is_bomb() && cell != center {
                                worklist.push_back(cell);
                            }
                            self.set(cell, None);
                            footprint.push(cell);
                        }
                        // Out of bounds or already cleared.
                        _ => {}
                    }
                }
            }
        }

        footprint
    }

    /// One bottom-up gravity pass: every empty cell with an occupied cell
    /// directly above pulls that tile down one row. A single pass moves each
    /// tile at most one row; the board loops this until a pass moves nothing.
    ///
    /// Returns the recorded moves, empty when the grid is already compact.
    pub fn compact_step(&mut self) -> Vec<TileMove> {
        let mut moves = Vec::new();

        for col in 0..self.cols {
            for row in (1..self.rows).rev() {
                let below = Coord::new(row, col);
                let above = Coord::new(row - 1, col);
                if matches!(self.get(below), Some(None))
                    && matches!(self.get(above), Some(Some(_)))
                {
                    self.swap(below, above);
                    let tile = self.id_at(below).expect("below is inside the grid");
                    moves.push(TileMove {
                        tile,
                        from: above,
                        to: below,
                    });
                }
            }
        }

        moves
    }

    /// Empty coordinates of the top row, left to right.
    pub fn top_row_gaps(&self) -> Vec<Coord> {
        (0..self.cols)
            .map(|col| Coord::new(0, col))
            .filter(|&at| matches!(self.get(at), Some(None)))
            .collect()
    }

    /// Build a grid from explicit rows (identities assigned row-major).
    #[cfg(test)]
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let height = rows.len() as u8;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u8;
        assert!(rows.iter().all(|r| r.len() == width as usize));

        let mut grid = Self::new(height, width);
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                grid.set(Coord::new(r as u8, c as u8), *cell);
            }
        }
        grid
    }

    /// Convert to explicit rows for assertions.
    #[cfg(test)]
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        (0..self.rows)
            .map(|r| {
                (0..self.cols)
                    .map(|c| self.get(Coord::new(r, c)).unwrap())
                    .collect()
            })
            .collect()
    }
}
