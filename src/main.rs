// Entry point for the Minesweeper host
// Initializes logging and configuration, then hands over to the text host

use std::error::Error;

mod msw_host; // Text command loop driving the board engine

use mswpr::msw_config::load_or_create_config;

fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr so they do not interleave with the board on stdout
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Load or create user configuration (difficulty, player name, leaderboard file)
    let mut cfg = load_or_create_config();

    msw_host::run(&mut cfg)
}
