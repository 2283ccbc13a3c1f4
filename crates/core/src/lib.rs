//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the whole match-3 rule engine: grid storage, match
//! detection, fill policy, and the board state machine. It has **zero
//! dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed and inputs produce identical resolutions
//! - **Testable**: Comprehensive unit tests for all rules
//! - **Portable**: Can run in any environment (service, GUI, headless)
//!
//! # Module Structure
//!
//! - [`grid`]: rows x cols grid with structural mutators (clear, bomb
//!   creation, worklist detonation, gravity, identity-preserving swaps)
//! - [`matcher`]: pure run and bomb-stack detection
//! - [`fill`]: seeded LCG fill policy with a no-match initial population
//! - [`board`]: the phase state machine resolving a swap into chained
//!   outcomes, driving presentation through drained directives
//! - [`scoring`]: reference implementation of the external score contract
//! - [`snapshot`]: compact board snapshots for observers
//!
//! # Rules
//!
//! - A **run** is 3+ contiguous same-type tiles in one axis; clearing one
//!   re-derives its extents from the probed cell.
//! - A **bomb-stack** is a solid same-type 2x2 touching the probed cell;
//!   it converts that cell into a bomb and consumes the other three. It
//!   strictly pre-empts run evaluation.
//! - **Detonation** clears the edge-clamped Moore neighborhood and chains
//!   through any bomb it reaches, all in one remove pass.
//! - After removal, gravity compacts columns one row per animated pass, the
//!   top row refills, and the board re-evaluates until it settles.
//!
//! # Example
//!
//! ```
//! use tilematch_core::Board;
//! use tilematch_types::{BoardConfig, Coord, Stage};
//!
//! let mut board = Board::new(BoardConfig::default(), 12345).unwrap();
//! board.select(Coord::new(3, 3));
//! board.select(Coord::new(3, 4)); // adjacent: commits a swap attempt
//!
//! // Drive the timed phases with elapsed milliseconds.
//! while board.stage().is_timed() {
//!     board.tick(16);
//! }
//! assert_eq!(board.stage(), Stage::Pick);
//! let _directives = board.take_directives();
//! ```

pub mod board;
pub mod fill;
pub mod grid;
pub mod matcher;
pub mod scoring;
pub mod snapshot;

pub use tilematch_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardError};
pub use fill::{FillExhausted, FillPolicy, SimpleRng};
pub use grid::{BombCreation, Grid};
pub use matcher::{is_bomb_stack, is_run, StackOrientation};
pub use scoring::ScoreBoard;
pub use snapshot::{cell_code, BoardSnapshot};
