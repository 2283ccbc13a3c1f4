//! Scoring module - reference implementation of the external score contract
//!
//! The board itself never accumulates points; it emits `Score` and `Combo`
//! directives and polls a single win flag at settle time. [`ScoreBoard`] is
//! the collaborator the headless service (and tests) plug into that contract:
//!
//! - each scored cell is worth 1 point multiplied by the current combo;
//! - a combo bump raises the multiplier and arms a decay window, after which
//!   the multiplier returns to 1;
//! - the score clamps at the win threshold, which latches `is_win`.

use tilematch_types::{Directive, COMBO_RESET_MS};

/// External score accumulator with a combo multiplier and a win threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBoard {
    score: u32,
    combo: u32,
    combo_timer_ms: u32,
    win_score: u32,
    win: bool,
}

impl ScoreBoard {
    pub fn new(win_score: u32) -> Self {
        Self {
            score: 0,
            combo: 1,
            combo_timer_ms: 0,
            win_score: win_score.max(1),
            win: false,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current multiplier (1 when no combo chain is active).
    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn win_score(&self) -> u32 {
        self.win_score
    }

    pub fn is_win(&self) -> bool {
        self.win
    }

    /// Progress toward the win threshold in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        self.score as f32 / self.win_score as f32
    }

    /// Add points for `cleared` cells, multiplied by the combo. The total
    /// clamps at the win threshold and latches the win flag there.
    pub fn add_score(&mut self, cleared: u32) {
        self.score = self.score.saturating_add(cleared.saturating_mul(self.combo));
        if self.score >= self.win_score {
            self.score = self.win_score;
            self.win = true;
        }
    }

    /// Raise the multiplier and (re)arm its decay window.
    pub fn add_combo(&mut self) {
        self.combo += 1;
        self.combo_timer_ms = COMBO_RESET_MS;
    }

    /// Advance the combo decay clock.
    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.combo <= 1 {
            return;
        }
        self.combo_timer_ms = self.combo_timer_ms.saturating_sub(elapsed_ms);
        if self.combo_timer_ms == 0 {
            self.combo = 1;
        }
    }

    /// Feed one board directive; ignores everything but score/combo events.
    pub fn apply(&mut self, directive: &Directive) {
        match directive {
            Directive::Score { cleared } => self.add_score(*cleared),
            Directive::Combo => self.add_combo(),
            _ => {}
        }
    }
}
