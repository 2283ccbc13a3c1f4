//! Compact board snapshot for observers (adapter, tests, tooling).

use tilematch_types::{Cell, Coord, Stage, TileKind};

/// Encode a cell as a wire-friendly byte:
/// `0` = empty, `1..` = ordinary variant + 1, `255` = bomb.
pub fn cell_code(cell: Cell) -> u8 {
    match cell {
        None => 0,
        Some(TileKind::Ordinary(v)) => v + 1,
        Some(TileKind::Bomb) => u8::MAX,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub rows: u8,
    pub cols: u8,
    /// Row-major cell codes, see [`cell_code`].
    pub cells: Vec<u8>,
    pub stage: Stage,
    pub selection: Option<Coord>,
    pub seed: u32,
    pub win_reached: bool,
    pub phase_timer_ms: u32,
}

impl BoardSnapshot {
    pub fn cell(&self, at: Coord) -> Option<u8> {
        if at.row >= self.rows || at.col >= self.cols {
            return None;
        }
        Some(self.cells[at.row as usize * self.cols as usize + at.col as usize])
    }
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            rows: 0,
            cols: 0,
            cells: Vec::new(),
            stage: Stage::Pick,
            selection: None,
            seed: 0,
            win_reached: false,
            phase_timer_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_codes() {
        assert_eq!(cell_code(None), 0);
        assert_eq!(cell_code(Some(TileKind::Ordinary(0))), 1);
        assert_eq!(cell_code(Some(TileKind::Ordinary(9))), 10);
        assert_eq!(cell_code(Some(TileKind::Bomb)), 255);
    }

    #[test]
    fn test_snapshot_cell_lookup() {
        let snapshot = BoardSnapshot {
            rows: 2,
            cols: 3,
            cells: vec![1, 2, 3, 4, 5, 6],
            ..BoardSnapshot::default()
        };
        assert_eq!(snapshot.cell(Coord::new(0, 0)), Some(1));
        assert_eq!(snapshot.cell(Coord::new(1, 2)), Some(6));
        assert_eq!(snapshot.cell(Coord::new(2, 0)), None);
    }
}
