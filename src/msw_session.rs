// Game session
// Wraps a board with win/loss status, pause/debug toggles, flag counter, timer and leaderboard hook

use std::time::Instant;

use tracing::{info, warn};

use crate::msw_board::{Board, BoardError, RandomSource, Reveal};
use crate::msw_clock::Clock;
use crate::msw_scores::ScoreBoard;

/// Largest value the timer display can show
pub const MAX_DISPLAY_SECONDS: u64 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    Won,
    Lost,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Playing)
    }
}

/// What the presentation layer may show for one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    pub revealed: bool,
    pub flagged: bool,
    pub mine: bool, // Only set when the mine is revealed, debug is on, or the game is over
    pub adjacent: u8,
}

/// One game in progress plus everything that survives across resets
pub struct GameSession<R, C> {
    board: Board,
    rng: R,
    clock: C,
    status: Status,
    paused: bool,
    debug: bool,
    flagged: usize,  // Mirrors the number of flagged cells
    elapsed: u64,    // Seconds, sampled on tick
    timer_running: bool,
    started_at: Instant,         // Shifted forward by every paused interval
    paused_at: Option<Instant>,
    leaderboard: Option<ScoreBoard>,
    player: String,
    last_rank: Option<usize>, // Leaderboard rank of the last won game
}

impl<R: RandomSource, C: Clock> GameSession<R, C> {
    /// Start a session on a freshly generated board
    pub fn new(rows: usize, cols: usize, mines: usize, mut rng: R, clock: C) -> Result<Self, BoardError> {
        let board = Board::new(rows, cols, mines, &mut rng)?;
        Ok(Self::from_board(board, rng, clock))
    }

    /// Start a session on a prepared board; `rng` is used for later resets
    /// Flags already on the board are counted, and a board that is already
    /// decided starts in the matching terminal state with the timer stopped
    pub fn from_board(board: Board, rng: R, clock: C) -> Self {
        let started_at = clock.now();
        let flagged = board.cells().iter().filter(|c| c.is_flagged()).count();
        let mut session = GameSession {
            board,
            rng,
            clock,
            status: Status::Playing,
            paused: false,
            debug: false,
            flagged,
            elapsed: 0,
            timer_running: true,
            started_at,
            paused_at: None,
            leaderboard: None,
            player: String::new(),
            last_rank: None,
        };
        if session.board.cells().iter().any(|c| c.is_mine() && c.is_revealed()) {
            session.status = Status::Lost;
            session.timer_running = false;
            session.flagged -= session.board.disclose_mines();
        } else if session.board.all_safe_revealed() {
            session.status = Status::Won;
            session.timer_running = false;
            session.flagged += session.board.flag_remaining_mines();
        }
        session
    }

    /// Attach the leaderboard that receives `player`'s winning times
    pub fn with_leaderboard(mut self, leaderboard: ScoreBoard, player: impl Into<String>) -> Self {
        self.leaderboard = Some(leaderboard);
        self.player = player.into();
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged
    }

    /// Mines minus flags; negative when the player over-flags
    pub fn flags_remaining(&self) -> i64 {
        self.board.mine_count() as i64 - self.flagged as i64
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed
    }

    pub fn display_seconds(&self) -> u64 {
        self.elapsed.min(MAX_DISPLAY_SECONDS)
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    pub fn leaderboard(&self) -> Option<&ScoreBoard> {
        self.leaderboard.as_ref()
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn cell_view(&self, row: usize, col: usize) -> CellView {
        let cell = self.board.cell(row, col);
        let show_mine = cell.is_revealed() || self.debug || self.status.is_terminal();
        CellView {
            revealed: cell.is_revealed(),
            flagged: cell.is_flagged(),
            mine: cell.is_mine() && show_mine,
            adjacent: cell.adjacent_mines(),
        }
    }

    /// Sample the clock into the elapsed counter while the timer runs
    pub fn tick(&mut self) {
        if self.timer_running {
            let now = self.clock.now();
            self.elapsed = now.saturating_duration_since(self.started_at).as_secs();
        }
    }

    /// Reveal a cell; ignored while paused or after the game has ended
    pub fn reveal(&mut self, row: usize, col: usize) -> Reveal {
        // bounds are checked even when the command is a no-op
        self.board.cell(row, col);
        if self.paused || self.status.is_terminal() {
            return Reveal::Ignored;
        }
        let outcome = self.board.reveal(row, col);
        match outcome {
            Reveal::Detonated => self.lose(row, col),
            Reveal::Opened(_) if self.board.all_safe_revealed() => self.win(),
            _ => {}
        }
        outcome
    }

    /// Toggle the flag on a hidden cell; returns the new flag state
    pub fn toggle_flag(&mut self, row: usize, col: usize) -> Option<bool> {
        self.board.cell(row, col);
        if self.paused || self.status.is_terminal() {
            return None;
        }
        let flagged = self.board.toggle_flag(row, col)?;
        if flagged {
            self.flagged += 1;
        } else {
            self.flagged -= 1;
        }
        Some(flagged)
    }

    pub fn set_paused(&mut self, paused: bool) {
        if paused == self.paused {
            return;
        }
        if paused {
            self.tick();
            self.paused_at = Some(self.clock.now());
            self.timer_running = false;
        } else {
            if let Some(at) = self.paused_at.take() {
                self.started_at += self.clock.now().saturating_duration_since(at);
            }
            self.timer_running = !self.status.is_terminal();
        }
        self.paused = paused;
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Throw the board away and start over with a new one of the same shape
    pub fn reset(&mut self) {
        self.board = self.board.regenerate(&mut self.rng);
        self.status = Status::Playing;
        self.paused = false;
        self.debug = false;
        self.flagged = 0;
        self.elapsed = 0;
        self.timer_running = true;
        self.started_at = self.clock.now();
        self.paused_at = None;
        self.last_rank = None;
        info!(rows = self.board.rows(), cols = self.board.cols(), "game reset");
    }

    fn stop_timer(&mut self) {
        self.tick();
        self.timer_running = false;
    }

    fn lose(&mut self, row: usize, col: usize) {
        self.stop_timer();
        self.status = Status::Lost;
        self.flagged -= self.board.disclose_mines();
        info!(row, col, elapsed = self.elapsed, "mine hit, game lost");
    }

    fn win(&mut self) {
        self.stop_timer();
        self.status = Status::Won;
        self.flagged += self.board.flag_remaining_mines();
        info!(elapsed = self.elapsed, "all safe cells revealed, game won");

        let secs = self.display_seconds();
        if let Some(scores) = self.leaderboard.as_mut() {
            match scores.submit(&self.player, secs) {
                Ok(rank) => self.last_rank = rank,
                Err(e) => warn!(error = %e, player = %self.player, "could not record winning time"),
            }
        }
    }
}
