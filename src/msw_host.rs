// Line-oriented host for the board engine
// Reads text commands, feeds them to the session and prints a plain grid after each one

use std::error::Error;
use std::io::{BufRead, Write};

use mswpr::msw_config::{Config, config_path, save_config};
use mswpr::msw_scores::normalize_name;
use mswpr::{Clock, GameSession, RandomSource, Reveal, ScoreBoard, Status, SystemClock};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Reveal(usize, usize),
    Flag(usize, usize),
    New,
    Pause,
    Debug,
    Leaderboard,
    Help,
    Quit,
}

const HELP: &str = "commands: r ROW COL (reveal), f ROW COL (flag), n (new game), p (pause), d (debug), l (leaderboard), h (help), q (quit)";

fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let verb = words.next()?;
    let mut coord = || -> Option<(usize, usize)> {
        let row = words.next()?.parse().ok()?;
        let col = words.next()?.parse().ok()?;
        Some((row, col))
    };
    match verb {
        "r" | "reveal" => coord().map(|(r, c)| Command::Reveal(r, c)),
        "f" | "flag" => coord().map(|(r, c)| Command::Flag(r, c)),
        "n" | "new" => Some(Command::New),
        "p" | "pause" => Some(Command::Pause),
        "d" | "debug" => Some(Command::Debug),
        "l" | "leaderboard" => Some(Command::Leaderboard),
        "h" | "help" | "?" => Some(Command::Help),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Glyph for one cell: `#` hidden, `F` flag, `*` mine, `.` empty, digit otherwise
fn glyph<R: RandomSource, C: Clock>(session: &GameSession<R, C>, row: usize, col: usize) -> char {
    let view = session.cell_view(row, col);
    if view.flagged {
        'F'
    } else if view.mine {
        '*'
    } else if !view.revealed {
        '#'
    } else if view.adjacent == 0 {
        '.'
    } else {
        char::from(b'0' + view.adjacent)
    }
}

fn render<R: RandomSource, C: Clock>(session: &GameSession<R, C>) -> String {
    let board = session.board();
    let mut out = format!(
        "Mines: {:03}   Time: {:03}s{}\n",
        session.flags_remaining(),
        session.display_seconds(),
        if session.is_paused() { "   [paused]" } else { "" }
    );
    for r in 0..board.rows() {
        // paused boards are drawn fully covered
        let line: String = (0..board.cols())
            .map(|c| if session.is_paused() { '#' } else { glyph(session, r, c) })
            .collect();
        out.push_str(&line);
        out.push('\n');
    }
    match session.status() {
        Status::Won => out.push_str("You won!\n"),
        Status::Lost => out.push_str("Boom. Press n for a new game.\n"),
        Status::Playing => {}
    }
    out
}

fn in_bounds<R: RandomSource, C: Clock>(session: &GameSession<R, C>, row: usize, col: usize) -> bool {
    row < session.board().rows() && col < session.board().cols()
}

/// Ask for the player name; the remembered one is used on empty input
fn read_name<I: BufRead, O: Write>(cfg: &Config, input: &mut I, output: &mut O) -> Result<Option<String>, Box<dyn Error>> {
    match &cfg.player_name {
        Some(name) => write!(output, "Enter your name [{}]: ", name)?,
        None => write!(output, "Enter your name: ")?,
    }
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(normalize_name(&line).or_else(|| cfg.player_name.clone()))
}

/// Drive one session from `input` until quit or end of input
pub fn play<R, C, I, O>(session: &mut GameSession<R, C>, input: &mut I, output: &mut O) -> Result<(), Box<dyn Error>>
where
    R: RandomSource,
    C: Clock,
    I: BufRead,
    O: Write,
{
    writeln!(output, "{}", HELP)?;
    loop {
        session.tick();
        write!(output, "{}> ", render(session))?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        session.tick();
        let Some(cmd) = parse_command(&line) else {
            writeln!(output, "{}", HELP)?;
            continue;
        };
        match cmd {
            Command::Reveal(r, c) | Command::Flag(r, c) if !in_bounds(session, r, c) => {
                writeln!(output, "({}, {}) is off the board", r, c)?;
            }
            Command::Reveal(r, c) => {
                if let Reveal::Opened(_) = session.reveal(r, c) {
                    if session.status() == Status::Won {
                        if let Some(rank) = session.last_rank() {
                            writeln!(output, "New leaderboard entry at #{}", rank)?;
                        }
                    }
                }
            }
            Command::Flag(r, c) => {
                session.toggle_flag(r, c);
            }
            Command::New => session.reset(),
            Command::Pause => session.set_paused(!session.is_paused()),
            Command::Debug => session.set_debug(!session.is_debug()),
            Command::Leaderboard => {
                if let Some(scores) = session.leaderboard() {
                    for line in scores.lines() {
                        writeln!(output, "{}", line)?;
                    }
                }
            }
            Command::Help => writeln!(output, "{}", HELP)?,
            Command::Quit => break,
        }
    }
    Ok(())
}

/// Prompt for a name, build the session from config and play on stdin/stdout
pub fn run(cfg: &mut Config) -> Result<(), Box<dyn Error>> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    let Some(name) = read_name(cfg, &mut input, &mut output)? else {
        writeln!(output, "Empty player name.")?;
        return Ok(());
    };
    if cfg.player_name.as_deref() != Some(name.as_str()) {
        cfg.player_name = Some(name.clone());
        save_config(cfg);
    }

    let (rows, cols, mines) = cfg.board_params();
    let scores = ScoreBoard::open(cfg.leaderboard_path(config_path().as_deref()));
    info!(rows, cols, mines, player = %name, "starting session");
    let mut session = GameSession::new(rows, cols, mines, rand::thread_rng(), SystemClock)?.with_leaderboard(scores, name);
    play(&mut session, &mut input, &mut output)
}
