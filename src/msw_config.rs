// Configuration management
// Board size presets, custom dimensions and leaderboard location, persisted as TOML

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Application name used for the config directory and file
pub const APP_NAME: &str = "mswpr";

/// Difficulty presets and custom settings
/// Stored in the config file by name; Custom dimensions live in their own fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Difficulty {
    Beginner,                    // 9x9, 10 mines
    Intermediate,                // 16x16, 40 mines
    Expert,                      // 16 rows x 30 cols, 99 mines
    Custom(usize, usize, usize), // rows, cols, mines
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty {0:?}")]
pub struct UnknownDifficulty(String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    /// Case-insensitive preset name; Custom starts empty until its fields are applied
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Difficulty::Beginner,
            Difficulty::Intermediate,
            Difficulty::Expert,
            Difficulty::Custom(0, 0, 0),
        ]
        .into_iter()
        .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

impl TryFrom<String> for Difficulty {
    type Error = UnknownDifficulty;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Difficulty> for String {
    fn from(d: Difficulty) -> String {
        d.name().to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols, mines) = self.params();
        write!(f, "{} ({}x{}, {} mines)", self.name(), rows, cols, mines)
    }
}

impl Difficulty {
    /// Board parameters (rows, cols, mines) for this difficulty
    pub fn params(&self) -> (usize, usize, usize) {
        match self {
            Difficulty::Beginner => (9, 9, 10),
            Difficulty::Intermediate => (16, 16, 40),
            Difficulty::Expert => (16, 30, 99),
            Difficulty::Custom(r, c, n) => (*r, *c, *n),
        }
    }

    /// Stable config file identifier
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Expert => "Expert",
            Difficulty::Custom(_, _, _) => "Custom",
        }
    }
}

/// User configuration, persisted to disk as TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub difficulty: Difficulty,

    // Custom difficulty parameters
    pub custom_rows: usize,
    pub custom_cols: usize,
    pub custom_mines: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>, // Last name entered, offered as default
    pub leaderboard_file: String,    // Relative paths resolve next to the config file
}

impl Default for Config {
    fn default() -> Self {
        Config {
            difficulty: Difficulty::Custom(16, 25, 50),
            custom_rows: 16,
            custom_cols: 25,
            custom_mines: 50,
            player_name: None,
            leaderboard_file: "leaderboard.txt".to_string(),
        }
    }
}

impl Config {
    /// Board parameters (rows, cols, mines) bounded to something a board accepts
    pub fn board_params(&self) -> (usize, usize, usize) {
        let (mut rows, mut cols, mut mines) = self.difficulty.params();
        if rows < 1 {
            warn!(rows, "row count raised to 1");
            rows = 1;
        }
        if cols < 1 {
            warn!(cols, "column count raised to 1");
            cols = 1;
        }
        if rows * cols < 2 {
            warn!("1x1 board widened to 1x2");
            cols = 2;
        }
        let cells = rows * cols;
        if mines < 1 {
            warn!(mines, "mine count raised to 1");
            mines = 1;
        } else if mines >= cells {
            warn!(mines, cells, "mine count lowered to leave one safe cell");
            mines = cells - 1;
        }
        (rows, cols, mines)
    }

    /// Where the leaderboard lives
    pub fn leaderboard_path(&self, config_file: Option<&Path>) -> PathBuf {
        let file = PathBuf::from(&self.leaderboard_file);
        if file.is_absolute() {
            return file;
        }
        match config_file.and_then(Path::parent) {
            Some(dir) => dir.join(file),
            None => file,
        }
    }

    /// TOML text with the custom fields taken from a Custom difficulty
    fn to_toml(&self) -> Result<String, toml::ser::Error> {
        let mut cfg = self.clone();
        if let Difficulty::Custom(rows, cols, mines) = cfg.difficulty {
            cfg.custom_rows = rows;
            cfg.custom_cols = cols;
            cfg.custom_mines = mines;
        }
        toml::to_string(&cfg)
    }

    fn from_toml(s: &str) -> Option<Config> {
        let mut cfg = toml::from_str::<Config>(s).ok()?;
        // If difficulty is Custom, restore it with the saved custom values
        if matches!(cfg.difficulty, Difficulty::Custom(_, _, _)) {
            cfg.difficulty = Difficulty::Custom(cfg.custom_rows, cfg.custom_cols, cfg.custom_mines);
        }
        Some(cfg)
    }
}

/// Config file location: `<platform config dir>/mswpr.toml`, or the current
/// directory when the platform has no home directory
pub fn config_path() -> Option<PathBuf> {
    let file = format!("{}.toml", APP_NAME);
    match ProjectDirs::from("com", "xhbl", APP_NAME) {
        Some(dirs) => Some(dirs.config_dir().join(file)),
        None => env::current_dir().ok().map(|dir| dir.join(file)),
    }
}

/// Load configuration from `path`, or write and return the default if missing or unreadable
pub fn load_or_create_config_at(path: &Path) -> Config {
    if path.exists() {
        if let Ok(s) = fs::read_to_string(path) {
            if let Some(cfg) = Config::from_toml(&s) {
                return cfg;
            }
        }
        warn!(path = %path.display(), "config unreadable, using defaults");
    }
    let cfg = Config::default();
    save_config_at(&cfg, path);
    cfg
}

pub fn load_or_create_config() -> Config {
    match config_path() {
        Some(path) => load_or_create_config_at(&path),
        None => Config::default(),
    }
}

/// Save configuration to `path` as TOML
pub fn save_config_at(cfg: &Config, path: &Path) {
    if let Ok(s) = cfg.to_toml() {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(e) = fs::write(path, s) {
            warn!(path = %path.display(), error = %e, "could not save config");
        }
    }
}

pub fn save_config(cfg: &Config) {
    if let Some(path) = config_path() {
        save_config_at(cfg, &path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(rows: usize, cols: usize, mines: usize) -> Config {
        Config {
            difficulty: Difficulty::Custom(rows, cols, mines),
            ..Config::default()
        }
    }

    #[test]
    fn presets_have_expected_params() {
        assert_eq!(Difficulty::Beginner.params(), (9, 9, 10));
        assert_eq!(Difficulty::Expert.params(), (16, 30, 99));
        assert_eq!(Config::default().board_params(), (16, 25, 50));
    }

    #[test]
    fn board_params_are_bounded() {
        assert_eq!(custom(0, 0, 0).board_params(), (1, 2, 1));
        assert_eq!(custom(3, 3, 9).board_params(), (3, 3, 8));
        assert_eq!(custom(4, 5, 0).board_params(), (4, 5, 1));
        assert_eq!(custom(4, 5, 7).board_params(), (4, 5, 7));
    }

    #[test]
    fn custom_difficulty_rebuilt_from_saved_fields() {
        let text = "difficulty = \"Custom\"\ncustom_rows = 10\ncustom_cols = 12\ncustom_mines = 20\n";
        let cfg = Config::from_toml(text).unwrap();
        assert_eq!(cfg.difficulty, Difficulty::Custom(10, 12, 20));
        assert_eq!(cfg.leaderboard_file, "leaderboard.txt");
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        assert!(Config::from_toml("difficulty = \"Nightmare\"\n").is_none());
        assert_eq!(
            "Nightmare".parse::<Difficulty>(),
            Err(UnknownDifficulty("Nightmare".to_string()))
        );
    }

    #[test]
    fn difficulty_names_parse_case_insensitively() {
        assert_eq!("expert".parse::<Difficulty>(), Ok(Difficulty::Expert));
        assert_eq!(" Beginner ".parse::<Difficulty>(), Ok(Difficulty::Beginner));
        assert_eq!("CUSTOM".parse::<Difficulty>(), Ok(Difficulty::Custom(0, 0, 0)));
        assert_eq!(Difficulty::Expert.to_string(), "Expert (16x30, 99 mines)");
    }

    #[test]
    fn custom_difficulty_is_saved_by_name_and_fields() {
        let cfg = custom(7, 11, 13);
        let text = cfg.to_toml().unwrap();
        assert!(text.contains("difficulty = \"Custom\""));
        let loaded = Config::from_toml(&text).unwrap();
        assert_eq!(loaded.difficulty, Difficulty::Custom(7, 11, 13));
    }

    #[test]
    fn config_lives_in_app_named_file() {
        let path = config_path().unwrap();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("mswpr.toml"));
    }

    #[test]
    fn config_round_trips_through_file() {
        let path = std::env::temp_dir().join(format!("mswpr-{}-cfg.toml", std::process::id()));
        let _ = fs::remove_file(&path);

        let created = load_or_create_config_at(&path);
        assert!(path.exists());
        assert_eq!(created.difficulty, Config::default().difficulty);

        let mut cfg = created;
        cfg.difficulty = Difficulty::Intermediate;
        cfg.player_name = Some("Ann".to_string());
        save_config_at(&cfg, &path);

        let loaded = load_or_create_config_at(&path);
        assert_eq!(loaded.difficulty, Difficulty::Intermediate);
        assert_eq!(loaded.player_name.as_deref(), Some("Ann"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn leaderboard_resolves_next_to_config() {
        let cfg = Config::default();
        let dir = std::env::temp_dir();
        let config_file = dir.join("mswpr.toml");
        assert_eq!(cfg.leaderboard_path(Some(&config_file)), dir.join("leaderboard.txt"));
        assert_eq!(cfg.leaderboard_path(None), PathBuf::from("leaderboard.txt"));
    }
}
