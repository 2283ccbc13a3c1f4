//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making
//! them usable in any context (core logic, headless service, AI protocol).
//!
//! # Board Dimensions
//!
//! Defaults mirror the classic 8x8 layout:
//!
//! - **Rows**: 8 (indexed 0-7, row 0 is the top)
//! - **Cols**: 8 (indexed 0-7, col 0 is the left edge)
//! - **Variants**: 5 ordinary tile types, drawn from `[0, variant_count)`
//!
//! Dimensions are session configuration, not compile-time constants: a board
//! is created once from a validated [`BoardConfig`] and keeps its shape for
//! the whole session.
//!
//! # Phase Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `SWITCH_DURATION_MS` | 300 | Swap (and revert) animation length |
//! | `FALL_DURATION_MS` | 200 | One single-row gravity pass animation |
//! | `ASSEMBLE_DURATION_MS` | 0 | Bomb convergence animation (0 = skipped) |
//! | `COMBO_RESET_MS` | 2000 | Combo multiplier decay window |
//!
//! # Examples
//!
//! ```
//! use tilematch_types::{BoardConfig, Coord, Stage, TileKind};
//!
//! let config = BoardConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let a = Coord::new(3, 3);
//! let b = Coord::new(3, 4);
//! assert!(a.is_adjacent(b));
//! assert!(!a.is_adjacent(Coord::new(4, 4))); // diagonals are not swappable
//!
//! assert_eq!(Stage::Pick.as_str(), "pick");
//! assert_ne!(TileKind::Ordinary(0), TileKind::Bomb);
//! ```

use std::fmt;

/// Default number of rows.
pub const DEFAULT_ROWS: u8 = 8;

/// Default number of columns.
pub const DEFAULT_COLS: u8 = 8;

/// Default number of ordinary tile variants.
pub const DEFAULT_VARIANT_COUNT: u8 = 5;

/// Default cell size in presentation units (pixels).
pub const DEFAULT_CELL_SIZE: u16 = 64;

/// Default win score threshold.
pub const DEFAULT_WIN_SCORE: u32 = 50;

/// Fixed timestep interval in milliseconds (16ms ~ 60 FPS).
pub const TICK_MS: u32 = 16;

/// Swap (and revert) animation duration.
pub const SWITCH_DURATION_MS: u32 = 300;

/// Single-row gravity pass animation duration.
pub const FALL_DURATION_MS: u32 = 200;

/// Bomb convergence animation duration. Zero disables the ASSEMBLE phase and
/// bomb creation applies its visual immediately.
pub const ASSEMBLE_DURATION_MS: u32 = 0;

/// Combo multiplier decay window used by external score collaborators.
pub const COMBO_RESET_MS: u32 = 2000;

/// Largest supported variant count (matches the original 1..=10 range).
pub const MAX_VARIANT_COUNT: u8 = 10;

/// Smallest variant count for which the constrained initial fill always has a
/// legal draw (at most two values can be forbidden at any cell).
pub const MIN_VARIANT_COUNT: u8 = 3;

/// Kind of a single occupied tile.
///
/// Empty cells are represented as `None` at the [`Cell`] level, matching the
/// transient EMPTY window between clearing and compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Ordinary tile with a variant value in `[0, variant_count)`.
    Ordinary(u8),
    /// Bomb tile. Never forms or participates in runs or bomb-stacks.
    Bomb,
}

impl TileKind {
    /// Variant value for ordinary tiles, `None` for bombs.
    pub fn variant(self) -> Option<u8> {
        match self {
            TileKind::Ordinary(v) => Some(v),
            TileKind::Bomb => None,
        }
    }

    pub fn is_bomb(self) -> bool {
        matches!(self, TileKind::Bomb)
    }
}

/// Cell contents (None = empty, Some = occupied).
pub type Cell = Option<TileKind>;

/// Stable identity of a tile's visual instance.
///
/// Ids are assigned once at board creation and travel with the tile through
/// swaps and falls, so presentation can follow instances across logical moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

/// Grid coordinate (row 0 is the top row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Offset by signed deltas. Returns `None` when the result would leave
    /// the u8 range; upper bounds are the grid's concern.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        let row = (self.row as i16) + (dr as i16);
        let col = (self.col as i16) + (dc as i16);
        if !(0..=u8::MAX as i16).contains(&row) || !(0..=u8::MAX as i16).contains(&col) {
            return None;
        }
        Some(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    /// Orthogonal adjacency: distance of exactly 1 along exactly one axis.
    /// This is the only legality rule for a swap.
    pub fn is_adjacent(self, other: Self) -> bool {
        let dr = (self.row as i16 - other.row as i16).abs();
        let dc = (self.col as i16 - other.col as i16).abs();
        (dr == 1 && dc == 0) || (dr == 0 && dc == 1)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A tile displaced by gravity, a swap, or a bomb convergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMove {
    pub tile: TileId,
    pub from: Coord,
    pub to: Coord,
}

/// Board phases.
///
/// `Move`, `Assemble` and `Fall` are timed: they accumulate elapsed time
/// against a fixed duration and complete on the tick that crosses it.
/// Resolution (resolve/remove/refill) runs synchronously at phase boundaries
/// and is never observable as a stage of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Waiting for a selection or a swap commit.
    Pick,
    /// Swap (or revert) animation in flight.
    Move,
    /// Bomb convergence animation in flight.
    Assemble,
    /// Gravity animation for one single-row pass in flight.
    Fall,
    /// Win reached; input is frozen for the rest of the session.
    Frozen,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Pick => "pick",
            Stage::Move => "move",
            Stage::Assemble => "assemble",
            Stage::Fall => "fall",
            Stage::Frozen => "frozen",
        }
    }

    /// Whether the stage is driven by a timer rather than input.
    pub fn is_timed(self) -> bool {
        matches!(self, Stage::Move | Stage::Assemble | Stage::Fall)
    }
}

/// Result of feeding a cell selection to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Out of bounds, same cell, or not in the PICK stage. No state change.
    Ignored,
    /// The cell became the (new) first selection.
    Selected,
    /// The selection plus this adjacent cell committed a swap attempt.
    SwapStarted,
}

/// Sound cues the presentation layer may play. Fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Switch,
    StackClear,
    BombCreate,
    BombExplode,
    Win,
}

impl SoundCue {
    pub fn as_str(self) -> &'static str {
        match self {
            SoundCue::Switch => "switch",
            SoundCue::StackClear => "stack-clear",
            SoundCue::BombCreate => "bomb-create",
            SoundCue::BombExplode => "bomb-explode",
            SoundCue::Win => "win",
        }
    }
}

/// Visible face of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileFace {
    /// Ordinary variant face.
    Variant(u8),
    /// Bomb face skinned after the variant the bomb was created from.
    BombSkin(u8),
}

/// Presentation directives emitted by the board and drained by the embedder.
///
/// The core never awaits completion of any of these beyond the fixed phase
/// timers it tracks itself; they carry no return channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// A tile's visible face changed (refill draw, bomb skin application).
    TileFaceChanged {
        at: Coord,
        tile: TileId,
        face: TileFace,
    },
    /// A tile was removed from play; the presentation plays its clear effect.
    TileRemoved { at: Coord, tile: TileId },
    /// A batch of tiles moved; `duration_ms` is the animation length the core
    /// will wait before continuing.
    TilesMoved {
        moves: Vec<TileMove>,
        duration_ms: u32,
    },
    /// Selection cursor moved or cleared.
    SelectionChanged { selected: Option<Coord> },
    /// `cleared` cells were scored this REMOVE pass (1 point each, combo
    /// multiplication is the external scorer's concern).
    Score { cleared: u32 },
    /// One incidental-match pass was found during refill; bump the combo.
    Combo,
    Sound(SoundCue),
    /// Resolution chain ended with a stable board; tiles return to their
    /// default visual state.
    Settled,
}

/// Session configuration, fixed for the board's lifetime.
///
/// Construct with struct update syntax over [`Default`] and validate before
/// use; `Board::new` rejects invalid configurations instead of silently
/// defaulting out-of-range fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    pub rows: u8,
    pub cols: u8,
    /// Ordinary tile variants, `MIN_VARIANT_COUNT..=MAX_VARIANT_COUNT`.
    pub variant_count: u8,
    /// Cell size hint forwarded to presentation; the core never reads it.
    pub cell_size: u16,
    pub switch_duration_ms: u32,
    pub fall_duration_ms: u32,
    /// Zero disables the ASSEMBLE phase.
    pub assemble_duration_ms: u32,
    pub win_score: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            variant_count: DEFAULT_VARIANT_COUNT,
            cell_size: DEFAULT_CELL_SIZE,
            switch_duration_ms: SWITCH_DURATION_MS,
            fall_duration_ms: FALL_DURATION_MS,
            assemble_duration_ms: ASSEMBLE_DURATION_MS,
            win_score: DEFAULT_WIN_SCORE,
        }
    }
}

impl BoardConfig {
    /// Whether the board shape can form a run or a bomb-stack at all.
    pub fn can_match(&self) -> bool {
        self.rows >= 3 || self.cols >= 3 || (self.rows >= 2 && self.cols >= 2)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::ZeroRows);
        }
        if self.cols == 0 {
            return Err(ConfigError::ZeroCols);
        }
        if self.variant_count == 0 || self.variant_count > MAX_VARIANT_COUNT {
            return Err(ConfigError::VariantCountOutOfRange(self.variant_count));
        }
        // Below 3 variants the no-match initial fill can exhaust its
        // candidates on boards big enough to match.
        if self.can_match() && self.variant_count < MIN_VARIANT_COUNT {
            return Err(ConfigError::VariantCountOutOfRange(self.variant_count));
        }
        if self.switch_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration("switch_duration_ms"));
        }
        if self.fall_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration("fall_duration_ms"));
        }
        if self.win_score == 0 {
            return Err(ConfigError::ZeroWinScore);
        }
        Ok(())
    }
}

/// Configuration rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroRows,
    ZeroCols,
    VariantCountOutOfRange(u8),
    ZeroDuration(&'static str),
    ZeroWinScore,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroRows => write!(f, "rows must be at least 1"),
            ConfigError::ZeroCols => write!(f, "cols must be at least 1"),
            ConfigError::VariantCountOutOfRange(v) => write!(
                f,
                "variant_count {} out of range ({}..={} on matchable boards)",
                v, MIN_VARIANT_COUNT, MAX_VARIANT_COUNT
            ),
            ConfigError::ZeroDuration(field) => write!(f, "{} must be non-zero", field),
            ConfigError::ZeroWinScore => write!(f, "win_score must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}
