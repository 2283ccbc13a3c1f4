//! Fill policy - seeded tile generation for initial population and refill
//!
//! Uses a simple LCG (Numerical Recipes constants) so the same seed produces
//! the same board and the same refill sequence every run.
//!
//! Initial population rejects any placement that would already form a run or
//! a bomb-stack. Instead of rerolling forever, the constrained draw cycles
//! through every candidate variant from a random starting point and fails
//! fast if none is legal - which validated configurations make unreachable
//! (at most two variants can be forbidden at any cell of a row-major fill).
//!
//! Refill draws are deliberately unconstrained: incidental matches produced
//! by new tiles are what feed the cascade and combo rules.

use std::fmt;

use tilematch_types::{Coord, TileKind};

use crate::grid::Grid;
use crate::matcher;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Current internal state (usable as a continuation seed).
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Constrained fill ran out of legal variants at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillExhausted {
    pub at: Coord,
    pub variant_count: u8,
}

impl fmt::Display for FillExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no non-matching variant for cell {} with {} variants",
            self.at, self.variant_count
        )
    }
}

impl std::error::Error for FillExhausted {}

/// Draws tile variants for initial population and refill.
#[derive(Debug, Clone)]
pub struct FillPolicy {
    rng: SimpleRng,
    variant_count: u8,
}

impl FillPolicy {
    pub fn new(seed: u32, variant_count: u8) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            variant_count,
        }
    }

    /// Uniform draw in `[0, variant_count)`. Used for refill.
    pub fn draw(&mut self) -> TileKind {
        TileKind::Ordinary(self.rng.next_range(self.variant_count as u32) as u8)
    }

    /// Draw a variant for `at` that creates neither a run nor a bomb-stack,
    /// writing it into the grid. Candidates are tried in cyclic order from a
    /// random starting variant, so the draw stays uniform over legal values
    /// and terminates after at most `variant_count` probes.
    pub fn draw_constrained(&mut self, grid: &mut Grid, at: Coord) -> Result<TileKind, FillExhausted> {
        let start = self.rng.next_range(self.variant_count as u32) as u8;

        for step in 0..self.variant_count {
            let variant = (start + step) % self.variant_count;
            let kind = TileKind::Ordinary(variant);
            grid.set(at, Some(kind));
            if !matcher::is_run(grid, at) && !matcher::is_bomb_stack(grid, at) {
                return Ok(kind);
            }
        }

        grid.set(at, None);
        Err(FillExhausted {
            at,
            variant_count: self.variant_count,
        })
    }

    /// Populate the whole grid row-major with constrained draws.
    pub fn populate(&mut self, grid: &mut Grid) -> Result<(), FillExhausted> {
        let coords: Vec<Coord> = grid.coords().collect();
        for at in coords {
            self.draw_constrained(grid, at)?;
        }
        Ok(())
    }

    /// Current RNG state (for restarting with a continued sequence).
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}
