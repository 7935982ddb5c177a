// Minesweeper board engine
// Board/cell state, game session, leaderboard file and configuration

pub mod msw_board;  // Grid, adjacency, mine placement, flood-fill reveal
pub mod msw_cell;   // Single cell state
pub mod msw_clock;  // Injected time source
pub mod msw_config; // TOML configuration and difficulty presets
pub mod msw_scores; // Top-5 leaderboard file
pub mod msw_session; // Win/loss state machine, timer, flag counter

pub use msw_board::{Board, BoardError, RandomSource, Reveal};
pub use msw_cell::Cell;
pub use msw_clock::{Clock, ManualClock, SystemClock};
pub use msw_config::{Config, Difficulty};
pub use msw_scores::{ScoreBoard, ScoreEntry, ScoreError};
pub use msw_session::{CellView, GameSession, Status};
