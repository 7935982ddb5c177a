// Leaderboard persistence
// Top-5 (mm:ss, name) records kept in a line-oriented text file as `time,name`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

/// Number of records kept in the file
pub const MAX_ENTRIES: usize = 5;
/// Longest accepted player name
pub const MAX_NAME_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("invalid player name {0:?}: expected 1 to 10 letters")]
    InvalidName(String),
    #[error("invalid time {0:?}: expected zero-padded mm:ss")]
    InvalidTime(String),
    #[error("leaderboard file error: {0}")]
    Io(#[from] io::Error),
}

/// One leaderboard line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub time: String, // Zero-padded mm:ss
    pub name: String,
    pub fresh: bool, // Added by the latest submit; never written to disk
}

/// Render seconds as zero-padded mm:ss
pub fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Clean up raw player input: letters only, at most 10, capitalised
/// Returns None when nothing usable is left
pub fn normalize_name(raw: &str) -> Option<String> {
    let mut name = String::new();
    for ch in raw.chars().filter(|c| c.is_ascii_alphabetic()).take(MAX_NAME_LEN) {
        if name.is_empty() {
            name.push(ch.to_ascii_uppercase());
        } else {
            name.push(ch.to_ascii_lowercase());
        }
    }
    if name.is_empty() { None } else { Some(name) }
}

fn valid_name(name: &str) -> bool {
    (1..=MAX_NAME_LEN).contains(&name.len()) && name.chars().all(|c| c.is_ascii_alphabetic())
}

fn valid_time(time: &str) -> bool {
    let b = time.as_bytes();
    b.len() == 5
        && b[2] == b':'
        && [0, 1, 3, 4].iter().all(|&i| b[i].is_ascii_digit())
}

/// Records from raw file bytes; lines that are not UTF-8 or lack a comma are skipped
fn parse(bytes: &[u8]) -> Vec<ScoreEntry> {
    bytes
        .split(|&b| b == b'\n')
        .filter_map(|line| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            match std::str::from_utf8(line) {
                Ok(text) => Some(text),
                Err(_) => {
                    warn!("skipping undecodable leaderboard line");
                    None
                }
            }
        })
        .filter_map(|line| line.split_once(','))
        .map(|(time, name)| ScoreEntry {
            time: time.to_string(),
            name: name.to_string(),
            fresh: false,
        })
        .collect()
}

/// File-backed top-N list, re-read before every submission
#[derive(Debug)]
pub struct ScoreBoard {
    path: PathBuf,
    entries: Vec<ScoreEntry>,
}

impl ScoreBoard {
    /// Open the leaderboard at `path`; a missing file is an empty board
    /// Other read failures are logged and also start empty, but `submit` retries the read
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut board = ScoreBoard {
            path: path.into(),
            entries: Vec::new(),
        };
        if let Err(e) = board.reload() {
            warn!(path = %board.path.display(), error = %e, "leaderboard not readable, starting empty");
        }
        board
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Re-read the file; only a missing file counts as an empty leaderboard
    pub fn reload(&mut self) -> Result<(), ScoreError> {
        self.entries = match fs::read(&self.path) {
            Ok(bytes) => parse(&bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(())
    }

    /// Submit a finished run; returns the 1-based rank if it made the top 5
    pub fn submit(&mut self, name: &str, secs: u64) -> Result<Option<usize>, ScoreError> {
        self.submit_time(name, &format_time(secs))
    }

    /// Submit with an already formatted mm:ss time
    /// Ordering compares the time strings, which matches numeric order for fixed-width values
    pub fn submit_time(&mut self, name: &str, time: &str) -> Result<Option<usize>, ScoreError> {
        if !valid_name(name) {
            return Err(ScoreError::InvalidName(name.to_string()));
        }
        if !valid_time(time) {
            return Err(ScoreError::InvalidTime(time.to_string()));
        }

        // never overwrite a file that could not be read
        self.reload()?;
        self.entries.push(ScoreEntry {
            time: time.to_string(),
            name: name.to_string(),
            fresh: true,
        });
        self.entries.sort_by(|a, b| a.time.cmp(&b.time));
        self.entries.truncate(MAX_ENTRIES);

        let rank = self.entries.iter().position(|e| e.fresh).map(|i| i + 1);
        if let Some(rank) = rank {
            self.save()?;
            info!(name, time, rank, "leaderboard updated");
        }
        Ok(rank)
    }

    fn save(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut out = String::new();
        for e in &self.entries {
            out.push_str(&e.time);
            out.push(',');
            out.push_str(&e.name);
            out.push('\n');
        }
        fs::write(&self.path, out)
    }

    /// Display lines `rank.\ttime\tname`, the fresh entry marked with `*`
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let mark = if e.fresh { "*" } else { "" };
                format!("{}.\t{}\t{}{}", i + 1, e.time, e.name, mark)
            })
            .collect()
    }
}
