//! Engine module - swap probing for external agents
//!
//! Answers "what would this swap do?" without touching a live board, the way
//! an external client plans a move: clone the grid, apply the swap
//! speculatively, and classify the outcome with the same priority order the
//! board uses (detonation over bomb creation over run clearing).
//!
//! Used by the adapter's `suggest` command and as a deadlock probe in tests.

use tilematch_core::{matcher, Grid};
use tilematch_types::{Coord, TileKind};

/// What a swap would resolve to, in board priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapEffect {
    /// At least one side is a bomb: the swap detonates.
    Detonation,
    /// A swapped cell completes a solid same-type 2x2.
    BombCreation,
    /// A swapped cell completes a run of 3+.
    RunClear,
}

impl SwapEffect {
    pub fn as_str(self) -> &'static str {
        match self {
            SwapEffect::Detonation => "detonation",
            SwapEffect::BombCreation => "bomb-creation",
            SwapEffect::RunClear => "run-clear",
        }
    }
}

/// A productive swap found by [`find_swaps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapHint {
    pub from: Coord,
    pub to: Coord,
    pub effect: SwapEffect,
}

/// Classify the effect of swapping `from` and `to`, or `None` when the swap
/// is illegal (not adjacent, out of bounds) or would simply revert.
///
/// The probe never mutates the input grid.
pub fn probe_swap(grid: &Grid, from: Coord, to: Coord) -> Option<SwapEffect> {
    if !from.is_adjacent(to) {
        return None;
    }
    if !grid.is_inside(from) || !grid.is_inside(to) {
        return None;
    }

    let from_is_bomb = matches!(grid.get(from), Some(Some(TileKind::Bomb)));
    let to_is_bomb = matches!(grid.get(to), Some(Some(TileKind::Bomb)));
    if from_is_bomb || to_is_bomb {
        return Some(SwapEffect::Detonation);
    }

    let mut probe = grid.clone();
    probe.swap(from, to);

    if matcher::is_bomb_stack(&probe, from) || matcher::is_bomb_stack(&probe, to) {
        return Some(SwapEffect::BombCreation);
    }
    if matcher::is_run(&probe, from) || matcher::is_run(&probe, to) {
        return Some(SwapEffect::RunClear);
    }

    None
}

/// Enumerate every productive swap, scanning right and down neighbor pairs
/// in row-major order so the result is deterministic.
pub fn find_swaps(grid: &Grid) -> Vec<SwapHint> {
    let mut hints = Vec::new();

    for from in grid.coords() {
        for (dr, dc) in [(0i8, 1i8), (1, 0)] {
            let Some(to) = from.offset(dr, dc) else {
                continue;
            };
            if !grid.is_inside(to) {
                continue;
            }
            if let Some(effect) = probe_swap(grid, from, to) {
                hints.push(SwapHint { from, to, effect });
            }
        }
    }

    hints
}

/// Whether any swap can still produce an effect (deadlock probe).
pub fn has_available_swap(grid: &Grid) -> bool {
    for from in grid.coords() {
        for (dr, dc) in [(0i8, 1i8), (1, 0)] {
            let Some(to) = from.offset(dr, dc) else {
                continue;
            };
            if grid.is_inside(to) && probe_swap(grid, from, to).is_some() {
                return true;
            }
        }
    }
    false
}
