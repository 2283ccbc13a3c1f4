//! Board state machine - orchestrates a swap through its resolution chain
//!
//! Stages flow `PICK -> MOVE -> (revert | resolve) -> remove -> fall ->
//! refill -> ... -> PICK`. The timed stages (MOVE, ASSEMBLE, FALL) accumulate
//! elapsed time from [`Board::tick`] against the configured durations and
//! complete on the tick that crosses the threshold; overshoot is dropped.
//! Resolution itself (resolve / remove / refill and the stability scan) runs
//! synchronously at those boundaries.
//!
//! The board owns all of its state - grid, selection, pending animation sets,
//! timers - so multiple boards can coexist in one process. Presentation is
//! driven exclusively through the drained [`Directive`] queue; the only thing
//! the board ever reads back from the outside is the win flag, polled once
//! per settle.

use std::fmt;

use arrayvec::ArrayVec;

use tilematch_types::{
    BoardConfig, ConfigError, Coord, Directive, SelectOutcome, SoundCue, Stage, TileFace, TileKind,
    TileMove,
};

use crate::fill::{FillExhausted, FillPolicy};
use crate::grid::Grid;
use crate::matcher;
use crate::snapshot::{cell_code, BoardSnapshot};

/// In-flight swap bookkeeping.
///
/// The bomb flags are recorded at commit time, before the grid mutates, so
/// the resolve branch never has to re-derive what was swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SwapContext {
    first: Coord,
    second: Coord,
    first_is_bomb: bool,
    second_is_bomb: bool,
}

impl SwapContext {
    fn involves_bomb(&self) -> bool {
        self.first_is_bomb || self.second_is_bomb
    }
}

/// A bomb conversion waiting for its convergence animation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BombAssembly {
    target: Coord,
    /// Pre-conversion variant for the bomb skin.
    prior: u8,
    consumed: ArrayVec<TileMove, 3>,
}

/// Board construction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    Config(ConfigError),
    Fill(FillExhausted),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Config(e) => write!(f, "invalid configuration: {}", e),
            BoardError::Fill(e) => write!(f, "initial fill failed: {}", e),
        }
    }
}

impl std::error::Error for BoardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoardError::Config(e) => Some(e),
            BoardError::Fill(e) => Some(e),
        }
    }
}

impl From<ConfigError> for BoardError {
    fn from(value: ConfigError) -> Self {
        BoardError::Config(value)
    }
}

impl From<FillExhausted> for BoardError {
    fn from(value: FillExhausted) -> Self {
        BoardError::Fill(value)
    }
}

/// One match-3 board instance.
#[derive(Debug, Clone)]
pub struct Board {
    config: BoardConfig,
    grid: Grid,
    fill: FillPolicy,
    stage: Stage,
    selection: Option<Coord>,
    swap: Option<SwapContext>,
    /// The current MOVE phase is the undo of a failed swap.
    revert_pending: bool,
    /// Tiles displaced by the gravity pass currently animating.
    pending_falls: Vec<TileMove>,
    /// Bomb conversions waiting for the ASSEMBLE phase.
    pending_assemblies: Vec<BombAssembly>,
    phase_timer_ms: u32,
    /// Externally owned win signal, polled once per settle.
    win_reached: bool,
    directives: Vec<Directive>,
}

impl Board {
    /// Create a board with a stable initial population.
    pub fn new(config: BoardConfig, seed: u32) -> Result<Self, BoardError> {
        config.validate()?;

        let mut grid = Grid::new(config.rows, config.cols);
        let mut fill = FillPolicy::new(seed, config.variant_count);
        fill.populate(&mut grid)?;

        Ok(Self {
            config,
            grid,
            fill,
            stage: Stage::Pick,
            selection: None,
            swap: None,
            revert_pending: false,
            pending_falls: Vec::new(),
            pending_assemblies: Vec::new(),
            phase_timer_ms: 0,
            win_reached: false,
            directives: Vec::new(),
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn selection(&self) -> Option<Coord> {
        self.selection
    }

    /// Current RNG state; feeding it back into [`Board::new`] continues the
    /// draw sequence.
    pub fn seed(&self) -> u32 {
        self.fill.seed()
    }

    pub fn win_reached(&self) -> bool {
        self.win_reached
    }

    /// Externally computed win signal. The board polls it once per settle and
    /// freezes input when it is set.
    pub fn set_win_reached(&mut self, reached: bool) {
        self.win_reached = reached;
    }

    /// Drain the directives emitted since the last call.
    pub fn take_directives(&mut self) -> Vec<Directive> {
        std::mem::take(&mut self.directives)
    }

    /// Rebuild the board, continuing the RNG sequence, keeping configuration.
    pub fn restart(&mut self) -> Result<(), BoardError> {
        let seed = self.fill.seed();
        *self = Board::new(self.config, seed)?;
        Ok(())
    }

    /// Feed a cell selection.
    ///
    /// Out-of-bounds cells, repeats of the current selection, and input
    /// outside the PICK stage are tolerated and ignored without any state
    /// change. A selection adjacent to the current one commits a swap
    /// attempt; anything else re-selects.
    pub fn select(&mut self, at: Coord) -> SelectOutcome {
        if self.stage != Stage::Pick {
            return SelectOutcome::Ignored;
        }
        if !self.grid.is_inside(at) {
            return SelectOutcome::Ignored;
        }
        if self.selection == Some(at) {
            return SelectOutcome::Ignored;
        }

        match self.selection {
            Some(first) if first.is_adjacent(at) => {
                self.begin_swap(first, at);
                SelectOutcome::SwapStarted
            }
            _ => {
                self.selection = Some(at);
                self.emit(Directive::SelectionChanged { selected: Some(at) });
                SelectOutcome::Selected
            }
        }
    }

    /// Advance time. Only the timed stages react; calling this in PICK or
    /// FROZEN is a no-op.
    pub fn tick(&mut self, elapsed_ms: u32) {
        match self.stage {
            Stage::Pick | Stage::Frozen => {}
            Stage::Move => {
                if self.advance_timer(elapsed_ms, self.config.switch_duration_ms) {
                    self.complete_move();
                }
            }
            Stage::Assemble => {
                if self.advance_timer(elapsed_ms, self.config.assemble_duration_ms) {
                    self.complete_assemble();
                }
            }
            Stage::Fall => {
                if self.advance_timer(elapsed_ms, self.config.fall_duration_ms) {
                    self.complete_fall();
                }
            }
        }
    }

    pub fn snapshot_into(&self, out: &mut BoardSnapshot) {
        out.rows = self.grid.rows();
        out.cols = self.grid.cols();
        out.cells.clear();
        for at in self.grid.coords() {
            out.cells.push(cell_code(self.grid.get(at).unwrap_or(None)));
        }
        out.stage = self.stage;
        out.selection = self.selection;
        out.seed = self.fill.seed();
        out.win_reached = self.win_reached;
        out.phase_timer_ms = self.phase_timer_ms;
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let mut s = BoardSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    fn emit(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    /// Accumulate phase time; true when the duration is crossed. The timer
    /// resets to zero on completion - overshoot is not carried over.
    fn advance_timer(&mut self, elapsed_ms: u32, duration_ms: u32) -> bool {
        self.phase_timer_ms = self.phase_timer_ms.saturating_add(elapsed_ms);
        if self.phase_timer_ms >= duration_ms {
            self.phase_timer_ms = 0;
            return true;
        }
        false
    }

    fn begin_swap(&mut self, first: Coord, second: Coord) {
        let first_is_bomb = matches!(self.grid.get(first), Some(Some(TileKind::Bomb)));
        let second_is_bomb = matches!(self.grid.get(second), Some(Some(TileKind::Bomb)));

        self.swap = Some(SwapContext {
            first,
            second,
            first_is_bomb,
            second_is_bomb,
        });
        self.selection = None;
        self.emit(Directive::SelectionChanged { selected: None });
        self.emit(Directive::Sound(SoundCue::Switch));
        self.emit_swap_motion(first, second);

        self.stage = Stage::Move;
        self.phase_timer_ms = 0;
    }

    /// Both tiles of a swap, each moving to the other's cell.
    fn emit_swap_motion(&mut self, a: Coord, b: Coord) {
        let tile_a = self.grid.id_at(a).expect("swap endpoints are inside the grid");
        let tile_b = self.grid.id_at(b).expect("swap endpoints are inside the grid");
        let duration_ms = self.config.switch_duration_ms;
        self.emit(Directive::TilesMoved {
            moves: vec![
                TileMove {
                    tile: tile_a,
                    from: a,
                    to: b,
                },
                TileMove {
                    tile: tile_b,
                    from: b,
                    to: a,
                },
            ],
            duration_ms,
        });
    }

    /// The MOVE animation finished: apply the logical swap, then either end a
    /// revert or evaluate the swap's effect.
    fn complete_move(&mut self) {
        let ctx = self
            .swap
            .expect("MOVE phase without a swap context is a phase-transition bug");
        self.grid.swap(ctx.first, ctx.second);

        if self.revert_pending {
            self.revert_pending = false;
            self.swap = None;
            self.stage = Stage::Pick;
            return;
        }

        self.resolve(ctx);
    }

    /// Strict-priority evaluation of a completed swap:
    /// bomb detonation, then bomb creation, then run clearing, else revert.
    fn resolve(&mut self, ctx: SwapContext) {
        self.swap = None;

        if ctx.involves_bomb() {
            // The original rules always detonate at the second-selected cell;
            // a bomb that moved away from it is caught by the chain.
            self.grid.detonate(ctx.second);
            self.emit(Directive::Sound(SoundCue::BombExplode));
            self.remove_pass();
            return;
        }

        let first_stack = matcher::is_bomb_stack(&self.grid, ctx.first);
        let second_stack = matcher::is_bomb_stack(&self.grid, ctx.second);
        if first_stack || second_stack {
            if first_stack {
                self.stage_bomb_creation(ctx.first);
            }
            // The first conversion may have consumed the second square.
            if second_stack && matcher::is_bomb_stack(&self.grid, ctx.second) {
                self.stage_bomb_creation(ctx.second);
            }
            self.after_bomb_creation();
            return;
        }

        let first_run = matcher::is_run(&self.grid, ctx.first);
        let second_run = matcher::is_run(&self.grid, ctx.second);
        if first_run || second_run {
            if first_run {
                self.grid.clear_run(ctx.first);
            }
            if second_run {
                self.grid.clear_run(ctx.second);
            }
            self.remove_pass();
            return;
        }

        // No effect: undo with a second MOVE phase back to PICK.
        self.revert_pending = true;
        self.swap = Some(ctx);
        self.emit(Directive::Sound(SoundCue::Switch));
        self.emit_swap_motion(ctx.first, ctx.second);
        self.stage = Stage::Move;
        self.phase_timer_ms = 0;
    }

    fn stage_bomb_creation(&mut self, at: Coord) {
        let creation = self.grid.create_bomb(at);
        self.emit(Directive::Sound(SoundCue::BombCreate));
        self.pending_assemblies.push(BombAssembly {
            target: creation.at,
            prior: creation.prior,
            consumed: creation.consumed,
        });
    }

    /// Enter ASSEMBLE when a convergence animation is configured, otherwise
    /// apply the bomb visuals immediately and continue into REMOVE.
    fn after_bomb_creation(&mut self) {
        if self.config.assemble_duration_ms > 0 {
            let mut moves = Vec::new();
            for assembly in &self.pending_assemblies {
                moves.extend(assembly.consumed.iter().copied());
            }
            let duration_ms = self.config.assemble_duration_ms;
            self.emit(Directive::TilesMoved { moves, duration_ms });
            self.stage = Stage::Assemble;
            self.phase_timer_ms = 0;
        } else {
            self.complete_assemble();
        }
    }

    /// Convergence done: apply the bomb's final visual and continue.
    fn complete_assemble(&mut self) {
        let assemblies = std::mem::take(&mut self.pending_assemblies);
        for assembly in assemblies {
            let tile = self
                .grid
                .id_at(assembly.target)
                .expect("bomb target is inside the grid");
            self.emit(Directive::TileFaceChanged {
                at: assembly.target,
                tile,
                face: TileFace::BombSkin(assembly.prior),
            });
        }
        self.remove_pass();
    }

    /// REMOVE: report and score every empty cell on the board (1 point each;
    /// combo multiplication is the external scorer's concern), then start the
    /// gravity loop.
    fn remove_pass(&mut self) {
        let coords: Vec<Coord> = self.grid.coords().collect();
        let mut cleared = 0u32;
        for at in coords {
            if matches!(self.grid.get(at), Some(None)) {
                let tile = self.grid.id_at(at).expect("coords() yields in-range cells");
                self.emit(Directive::TileRemoved { at, tile });
                cleared += 1;
            }
        }

        if cleared > 0 {
            self.emit(Directive::Score { cleared });
        }
        self.emit(Directive::Sound(SoundCue::StackClear));

        self.fall_pass();
    }

    /// FALL: run one single-row gravity pass. No movement means the columns
    /// are compact and refill can run; otherwise animate the pass and loop.
    fn fall_pass(&mut self) {
        let moves = self.grid.compact_step();
        if moves.is_empty() {
            self.refill_pass();
            return;
        }

        let duration_ms = self.config.fall_duration_ms;
        self.emit(Directive::TilesMoved {
            moves: moves.clone(),
            duration_ms,
        });
        self.pending_falls = moves;
        self.stage = Stage::Fall;
        self.phase_timer_ms = 0;
    }

    fn complete_fall(&mut self) {
        self.pending_falls.clear();
        self.fall_pass();
    }

    /// REFILL: draw into the top-row gaps. Any fill (or any leftover gap,
    /// defensively) loops back into the gravity pass; a fully packed board
    /// goes through the stability scan.
    fn refill_pass(&mut self) {
        let gaps = self.grid.top_row_gaps();
        let filled = gaps.len();
        for at in gaps {
            let kind = self.fill.draw();
            self.grid.set(at, Some(kind));
            let tile = self.grid.id_at(at).expect("top row is inside the grid");
            let variant = kind.variant().expect("refill draws ordinary tiles");
            self.emit(Directive::TileFaceChanged {
                at,
                tile,
                face: TileFace::Variant(variant),
            });
        }

        if filled > 0 {
            self.fall_pass();
            return;
        }

        // The fall loop is exhaustive, but a gap below a sealed column top
        // would otherwise deadlock the chain.
        if self.grid.has_empty() {
            self.fall_pass();
            return;
        }

        self.stability_scan();
    }

    /// Full-board scan on a packed board: incidental bomb-stacks first (the
    /// first one in row-major order wins), then incidental runs (all cleared
    /// in one pass, one combo bump), else the board settles.
    fn stability_scan(&mut self) {
        let coords: Vec<Coord> = self.grid.coords().collect();

        if let Some(&at) = coords
            .iter()
            .find(|&&at| matcher::is_bomb_stack(&self.grid, at))
        {
            self.stage_bomb_creation(at);
            self.after_bomb_creation();
            return;
        }

        let mut found = 0u32;
        for &at in &coords {
            if self.right_triple(at) {
                self.grid.clear_run(at);
                found += 1;
            }
            if self.down_triple(at) {
                self.grid.clear_run(at);
                found += 1;
            }
        }

        if found > 0 {
            self.emit(Directive::Combo);
            self.remove_pass();
            return;
        }

        self.settle();
    }

    fn right_triple(&self, at: Coord) -> bool {
        match (at.offset(0, 1), at.offset(0, 2)) {
            (Some(b), Some(c)) => {
                matcher::same_ordinary(&self.grid, at, b) && matcher::same_ordinary(&self.grid, at, c)
            }
            _ => false,
        }
    }

    fn down_triple(&self, at: Coord) -> bool {
        match (at.offset(1, 0), at.offset(2, 0)) {
            (Some(b), Some(c)) => {
                matcher::same_ordinary(&self.grid, at, b) && matcher::same_ordinary(&self.grid, at, c)
            }
            _ => false,
        }
    }

    /// Terminal state of a resolution chain: back to PICK, selection reset,
    /// default visuals restored, and the win flag polled exactly once.
    fn settle(&mut self) {
        self.stage = Stage::Pick;
        self.selection = None;
        self.emit(Directive::Settled);

        if self.win_reached {
            self.stage = Stage::Frozen;
            self.emit(Directive::Sound(SoundCue::Win));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilematch_types::{Cell, SWITCH_DURATION_MS};

    fn ord(v: u8) -> Cell {
        Some(TileKind::Ordinary(v))
    }

    fn test_config() -> BoardConfig {
        BoardConfig::default()
    }

    /// Stable 8x8 pattern: period-2 blocks of distinct values 0..=3, which
    /// contains no run and no 2x2 square.
    fn stable_rows(rows: u8, cols: u8) -> Vec<Vec<Cell>> {
        (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| ord((c % 2) + 2 * (r % 2)))
                    .collect()
            })
            .collect()
    }

    /// Board over an explicit grid, bypassing the constrained fill.
    fn board_from_rows(config: BoardConfig, rows: Vec<Vec<Cell>>) -> Board {
        config.validate().unwrap();
        let grid = Grid::from_rows(rows);
        assert_eq!(grid.rows(), config.rows);
        assert_eq!(grid.cols(), config.cols);
        Board {
            config,
            grid,
            fill: FillPolicy::new(1, config.variant_count),
            stage: Stage::Pick,
            selection: None,
            swap: None,
            revert_pending: false,
            pending_falls: Vec::new(),
            pending_assemblies: Vec::new(),
            phase_timer_ms: 0,
            win_reached: false,
            directives: Vec::new(),
        }
    }

    /// Tick through the current timed phase in two uneven steps.
    fn finish_phase(board: &mut Board, duration_ms: u32) {
        assert!(board.stage().is_timed());
        board.tick(duration_ms / 2);
        board.tick(duration_ms);
    }

    /// Drive ticks until the board is back in PICK (or FROZEN).
    fn settle_out(board: &mut Board) {
        for _ in 0..10_000 {
            match board.stage() {
                Stage::Pick | Stage::Frozen => return,
                _ => board.tick(SWITCH_DURATION_MS),
            }
        }
        panic!("board did not settle");
    }

    fn sounds(directives: &[Directive]) -> Vec<SoundCue> {
        directives
            .iter()
            .filter_map(|d| match d {
                Directive::Sound(cue) => Some(*cue),
                _ => None,
            })
            .collect()
    }

    fn score_events(directives: &[Directive]) -> Vec<u32> {
        directives
            .iter()
            .filter_map(|d| match d {
                Directive::Score { cleared } => Some(*cleared),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_new_board_is_stable_and_full() {
        let board = Board::new(test_config(), 12345).unwrap();
        assert_eq!(board.stage(), Stage::Pick);
        assert_eq!(board.selection(), None);
        assert!(!board.grid().has_empty());
        for at in board.grid().coords() {
            assert!(!matcher::is_run(board.grid(), at));
            assert!(!matcher::is_bomb_stack(board.grid(), at));
        }
    }

    #[test]
    fn test_new_board_rejects_bad_config() {
        let config = BoardConfig {
            variant_count: 2,
            ..test_config()
        };
        assert!(matches!(
            Board::new(config, 1),
            Err(BoardError::Config(ConfigError::VariantCountOutOfRange(2)))
        ));
    }

    #[test]
    fn test_select_and_reselect() {
        let mut board = board_from_rows(test_config(), stable_rows(8, 8));

        assert_eq!(board.select(Coord::new(2, 2)), SelectOutcome::Selected);
        assert_eq!(board.selection(), Some(Coord::new(2, 2)));

        // Same cell again is ignored.
        assert_eq!(board.select(Coord::new(2, 2)), SelectOutcome::Ignored);

        // A non-adjacent cell re-selects.
        assert_eq!(board.select(Coord::new(5, 5)), SelectOutcome::Selected);
        assert_eq!(board.selection(), Some(Coord::new(5, 5)));

        // Out of bounds is ignored.
        assert_eq!(board.select(Coord::new(8, 0)), SelectOutcome::Ignored);
        assert_eq!(board.selection(), Some(Coord::new(5, 5)));
    }

    #[test]
    fn test_adjacent_selection_commits_swap() {
        let mut board = board_from_rows(test_config(), stable_rows(8, 8));

        assert_eq!(board.select(Coord::new(3, 3)), SelectOutcome::Selected);
        assert_eq!(board.select(Coord::new(3, 4)), SelectOutcome::SwapStarted);
        assert_eq!(board.stage(), Stage::Move);
        assert_eq!(board.selection(), None);

        let directives = board.take_directives();
        assert!(sounds(&directives).contains(&SoundCue::Switch));
        assert!(directives
            .iter()
            .any(|d| matches!(d, Directive::TilesMoved { .. })));
    }

    #[test]
    fn test_select_ignored_outside_pick() {
        let mut board = board_from_rows(test_config(), stable_rows(8, 8));
        board.select(Coord::new(3, 3));
        board.select(Coord::new(3, 4));
        assert_eq!(board.stage(), Stage::Move);

        assert_eq!(board.select(Coord::new(0, 0)), SelectOutcome::Ignored);
    }

    #[test]
    fn test_no_effect_swap_reverts() {
        let mut board = board_from_rows(test_config(), stable_rows(8, 8));
        let before = board.grid().clone();

        board.select(Coord::new(3, 3));
        board.select(Coord::new(3, 4));

        // Forward move completes, nothing matches, the undo move starts.
        finish_phase(&mut board, SWITCH_DURATION_MS);
        assert_eq!(board.stage(), Stage::Move);

        // Undo move completes back to PICK.
        finish_phase(&mut board, SWITCH_DURATION_MS);
        assert_eq!(board.stage(), Stage::Pick);

        assert_eq!(board.grid(), &before);

        let directives = board.take_directives();
        let switches = sounds(&directives)
            .iter()
            .filter(|&&c| c == SoundCue::Switch)
            .count();
        assert_eq!(switches, 2);
        assert!(score_events(&directives).is_empty());
        // A revert is not a settle.
        assert!(!directives.iter().any(|d| matches!(d, Directive::Settled)));
    }

    #[test]
    fn test_overshoot_is_dropped() {
        let mut board = board_from_rows(test_config(), stable_rows(8, 8));
        board.select(Coord::new(3, 3));
        board.select(Coord::new(3, 4));

        // A huge tick completes the forward move exactly once; the undo move
        // starts with a fresh timer rather than inheriting the overshoot.
        board.tick(SWITCH_DURATION_MS * 10);
        assert_eq!(board.stage(), Stage::Move);
        board.tick(SWITCH_DURATION_MS - 1);
        assert_eq!(board.stage(), Stage::Move);
        board.tick(1);
        assert_eq!(board.stage(), Stage::Pick);
    }

    #[test]
    fn test_swap_completing_run_clears_three() {
        // Row 3: [.., X, X, Y, X, ..] with X = 4; swapping (3,3) and (3,4)
        // lands X on (3,3), completing a run of exactly three.
        let mut rows = stable_rows(8, 8);
        rows[3][1] = ord(4);
        rows[3][2] = ord(4);
        rows[3][4] = ord(4);
        let mut board = board_from_rows(test_config(), rows);

        board.select(Coord::new(3, 3));
        board.select(Coord::new(3, 4));
        finish_phase(&mut board, SWITCH_DURATION_MS);

        let directives = board.take_directives();
        assert_eq!(score_events(&directives), vec![3]);
        let removed = directives
            .iter()
            .filter(|d| matches!(d, Directive::TileRemoved { .. }))
            .count();
        assert_eq!(removed, 3);
        // The swap resolution itself never bumps the combo.
        assert!(!directives.iter().any(|d| matches!(d, Directive::Combo)));
        assert!(sounds(&directives).contains(&SoundCue::StackClear));

        // Tiles above the cleared row start falling.
        assert_eq!(board.stage(), Stage::Fall);

        settle_out(&mut board);
        assert!(!board.grid().has_empty());
    }

    #[test]
    fn test_both_swapped_cells_clear_in_one_pass() {
        // Vertical run of 5s completed at (3,3) and horizontal run of 4s
        // completed at (3,4) by the same swap.
        let mut rows = stable_rows(8, 8);
        rows[1][3] = ord(5);
        rows[2][3] = ord(5);
        rows[3][4] = ord(5); // moves to (3,3) on swap
        rows[3][3] = ord(4); // moves to (3,4) on swap
        rows[3][5] = ord(4);
        rows[3][6] = ord(4);
        let mut board = board_from_rows(test_config(), rows);

        board.select(Coord::new(3, 3));
        board.select(Coord::new(3, 4));
        finish_phase(&mut board, SWITCH_DURATION_MS);

        // Six cells cleared, one REMOVE pass, one score event.
        let directives = board.take_directives();
        assert_eq!(score_events(&directives), vec![6]);

        settle_out(&mut board);
        assert!(!board.grid().has_empty());
    }

    #[test]
    fn test_bomb_creation_from_swap() {
        // 2x2 of X at rows 2..=3, cols 2..=3 completed by the swap landing a
        // fifth X on its (2,2) corner.
        let mut rows = stable_rows(8, 8);
        let x = 4;
        rows[2][3] = ord(x);
        rows[3][2] = ord(x);
        rows[3][3] = ord(x);
        rows[1][2] = ord(x); // the fifth tile, swapped down into (2,2)
        let mut board = board_from_rows(test_config(), rows);
        let prior_value = x;

        board.select(Coord::new(2, 2));
        board.select(Coord::new(1, 2));
        finish_phase(&mut board, SWITCH_DURATION_MS);

        // With no assemble animation the bomb applies immediately. The first
        // gravity pass has already run synchronously, so count bombs instead
        // of pinning the cell.
        let bombs = board
            .grid()
            .coords()
            .filter(|&at| board.grid().get(at) == Some(Some(TileKind::Bomb)))
            .count();
        assert_eq!(bombs, 1);

        let directives = board.take_directives();
        assert!(sounds(&directives).contains(&SoundCue::BombCreate));
        assert!(directives.iter().any(|d| matches!(
            d,
            Directive::TileFaceChanged {
                face: TileFace::BombSkin(v),
                ..
            } if *v == prior_value
        )));
        // The three partner cells are scored as cleared.
        assert_eq!(score_events(&directives), vec![3]);

        settle_out(&mut board);
        let bombs = board
            .grid()
            .coords()
            .filter(|&at| board.grid().get(at) == Some(Some(TileKind::Bomb)))
            .count();
        assert!(bombs >= 1, "the created bomb survives the cascade");
    }

    #[test]
    fn test_bomb_creation_enters_assemble_phase() {
        let config = BoardConfig {
            assemble_duration_ms: 120,
            ..test_config()
        };
        let mut rows = stable_rows(8, 8);
        let x = 4;
        rows[2][3] = ord(x);
        rows[3][2] = ord(x);
        rows[3][3] = ord(x);
        rows[1][2] = ord(x);
        let mut board = board_from_rows(config, rows);

        board.select(Coord::new(2, 2));
        board.select(Coord::new(1, 2));
        finish_phase(&mut board, SWITCH_DURATION_MS);

        assert_eq!(board.stage(), Stage::Assemble);
        // The convergence motion targets the bomb cell.
        let directives = board.take_directives();
        assert!(directives.iter().any(|d| matches!(
            d,
            Directive::TilesMoved { moves, duration_ms: 120 }
                if moves.len() == 3 && moves.iter().all(|m| m.to == Coord::new(2, 2))
        )));
        // The skin directive waits for the convergence to finish.
        assert!(!directives
            .iter()
            .any(|d| matches!(d, Directive::TileFaceChanged { face: TileFace::BombSkin(_), .. })));

        finish_phase(&mut board, 120);
        let directives = board.take_directives();
        assert!(directives
            .iter()
            .any(|d| matches!(d, Directive::TileFaceChanged { face: TileFace::BombSkin(_), .. })));

        settle_out(&mut board);
    }

    #[test]
    fn test_bomb_swap_detonates() {
        let mut rows = stable_rows(8, 8);
        rows[3][3] = Some(TileKind::Bomb);
        let mut board = board_from_rows(test_config(), rows);

        board.select(Coord::new(3, 3));
        board.select(Coord::new(3, 4));
        finish_phase(&mut board, SWITCH_DURATION_MS);

        let directives = board.take_directives();
        assert!(sounds(&directives).contains(&SoundCue::BombExplode));
        // 3x3 footprint around (3,4), fully interior: 9 cells. The swapped
        // bomb sits at (3,4) itself and is consumed by its own blast.
        assert_eq!(score_events(&directives), vec![9]);

        settle_out(&mut board);
        assert!(!board.grid().has_empty());
    }

    #[test]
    fn test_adjacent_bombs_chain_in_one_pass() {
        let mut rows = stable_rows(8, 8);
        rows[3][3] = Some(TileKind::Bomb);
        rows[3][5] = Some(TileKind::Bomb);
        let mut board = board_from_rows(test_config(), rows);

        // Swap the first bomb toward the second; detonation at (3,4) catches
        // the bomb now at (3,4)... and chains into (3,5).
        board.select(Coord::new(3, 3));
        board.select(Coord::new(3, 4));
        finish_phase(&mut board, SWITCH_DURATION_MS);

        let directives = board.take_directives();
        // One REMOVE pass: a single score event covering both footprints.
        // Rows 2..=4, cols 3..=6 = 12 cells.
        assert_eq!(score_events(&directives), vec![12]);
        assert_eq!(
            sounds(&directives)
                .iter()
                .filter(|&&c| c == SoundCue::BombExplode)
                .count(),
            1
        );

        settle_out(&mut board);
    }

    #[test]
    fn test_stability_scan_prefers_bomb_stack() {
        let mut rows = stable_rows(8, 8);
        // An incidental triple early in row-major order...
        rows[0][0] = ord(4);
        rows[0][1] = ord(4);
        rows[0][2] = ord(4);
        // ...and a 2x2 later.
        rows[5][5] = ord(5);
        rows[5][6] = ord(5);
        rows[6][5] = ord(5);
        rows[6][6] = ord(5);
        let mut board = board_from_rows(test_config(), rows);

        board.stability_scan();
        // The bomb-stack wins even though the run comes first in scan order.
        assert_eq!(
            board.grid().get(Coord::new(5, 5)),
            Some(Some(TileKind::Bomb))
        );
        let directives = board.take_directives();
        assert!(sounds(&directives).contains(&SoundCue::BombCreate));
        assert!(!directives.iter().any(|d| matches!(d, Directive::Combo)));
    }

    #[test]
    fn test_stability_scan_clears_all_triples_once() {
        let mut rows = stable_rows(8, 8);
        rows[0][0] = ord(4);
        rows[0][1] = ord(4);
        rows[0][2] = ord(4);
        rows[7][5] = ord(5);
        rows[6][5] = ord(5);
        rows[5][5] = ord(5);
        let mut board = board_from_rows(test_config(), rows);

        board.stability_scan();

        let directives = board.take_directives();
        // Both triples cleared in the same pass with a single combo bump.
        assert_eq!(
            directives
                .iter()
                .filter(|d| matches!(d, Directive::Combo))
                .count(),
            1
        );
        assert_eq!(score_events(&directives), vec![6]);
    }

    #[test]
    fn test_stability_scan_settles_clean_board() {
        let mut board = board_from_rows(test_config(), stable_rows(8, 8));

        board.stability_scan();
        assert_eq!(board.stage(), Stage::Pick);

        let directives = board.take_directives();
        assert!(directives.iter().any(|d| matches!(d, Directive::Settled)));
        assert!(score_events(&directives).is_empty());
    }

    #[test]
    fn test_settle_polls_win_and_freezes() {
        let mut board = board_from_rows(test_config(), stable_rows(8, 8));
        board.set_win_reached(true);

        board.stability_scan();
        assert_eq!(board.stage(), Stage::Frozen);
        assert!(sounds(&board.take_directives()).contains(&SoundCue::Win));

        // Input is frozen.
        assert_eq!(board.select(Coord::new(0, 0)), SelectOutcome::Ignored);
    }

    #[test]
    fn test_win_flag_not_polled_before_settle() {
        let mut board = board_from_rows(test_config(), stable_rows(8, 8));
        board.set_win_reached(true);

        // A plain selection does not freeze anything.
        board.select(Coord::new(0, 0));
        assert_eq!(board.stage(), Stage::Pick);
    }

    #[test]
    fn test_full_cascade_ends_stable() {
        for seed in [1u32, 7, 99, 4242] {
            let mut board = Board::new(test_config(), seed).unwrap();

            // Probe every adjacent pair until a swap resolves to something.
            'outer: for row in 0..8u8 {
                for col in 0..7u8 {
                    board.select(Coord::new(row, col));
                    board.select(Coord::new(row, col + 1));
                    if board.stage() == Stage::Move {
                        settle_out(&mut board);
                        if !board.take_directives().iter().any(|d| {
                            matches!(d, Directive::Score { .. })
                        }) {
                            continue; // reverted, try another pair
                        }
                        break 'outer;
                    }
                }
            }

            // Whatever happened, the board must be packed and in PICK.
            assert_eq!(board.stage(), Stage::Pick, "seed {seed}");
            assert!(!board.grid().has_empty(), "seed {seed}");
        }
    }

    #[test]
    fn test_restart_continues_rng_sequence() {
        let mut board = Board::new(test_config(), 12345).unwrap();
        let seed_after_fill = board.seed();
        board.restart().unwrap();
        assert_ne!(board.seed(), 12345);
        assert_ne!(board.seed(), seed_after_fill);
        assert_eq!(board.stage(), Stage::Pick);
        assert!(!board.grid().has_empty());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let board = Board::new(test_config(), 9).unwrap();
        let snapshot = board.snapshot();
        assert_eq!(snapshot.rows, 8);
        assert_eq!(snapshot.cols, 8);
        assert_eq!(snapshot.cells.len(), 64);
        assert_eq!(snapshot.stage, Stage::Pick);
        assert!(snapshot.cells.iter().all(|&c| c != 0));
    }
}
