use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::game::{FOOD_REWARD, GameRules};
use crate::grid::{Cell, Grid};
use crate::snake::Direction;

/// Default config file, read from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "snake.toml";

/// Score service used when none is configured.
pub const DEFAULT_BACKEND_URL: &str = "https://projeto-ci-cd-back-k57p.onrender.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
    InvalidEnv { var: &'static str, value: String },
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "cannot read {}: {message}", path.display())
            },
            Self::Parse { path, message } => {
                write!(f, "cannot parse {}: {message}", path.display())
            },
            Self::InvalidEnv { var, value } => write!(f, "invalid value for {var}: {value:?}"),
            Self::Invalid(m) => write!(f, "invalid configuration: {m}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration, loaded from `snake.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    pub game: GameSection,
    pub backend: BackendSection,
    pub ui: UiSection,
}

/// Playfield and timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameSection {
    pub canvas_size: u32,
    pub cell_size: u32,
    pub tick_interval_ms: u64,
    pub food_reward: u32,
    pub start_x: i32,
    pub start_y: i32,
    /// Fixed seed for food placement. Random when unset.
    pub seed: Option<u64>,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            canvas_size: 400,
            cell_size: 20,
            tick_interval_ms: 100,
            food_reward: FOOD_REWARD,
            start_x: 10,
            start_y: 10,
            seed: None,
        }
    }
}

/// Score service connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    pub base_url: String,
    pub leaderboard_limit: u32,
    /// No timeout when unset.
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            leaderboard_limit: 10,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UiSection {
    pub message_duration_secs: u64,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            message_duration_secs: 3,
        }
    }
}

impl SnakeConfig {
    /// Load from the file named by `SNAKE_CONFIG` (or `snake.toml` when
    /// unset), apply environment overrides, then validate.
    ///
    /// A missing default file falls back to built-in defaults; an explicitly
    /// named file must exist.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("SNAKE_CONFIG") {
            Ok(path) if !path.is_empty() => Self::from_file(Path::new(&path))?,
            _ => match Self::from_file(Path::new(DEFAULT_CONFIG_FILE)) {
                Ok(cfg) => cfg,
                Err(ConfigError::Io { .. }) => {
                    tracing::info!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    Self::default()
                },
                Err(e) => return Err(e),
            },
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = toml::from_str::<Self>(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Apply `SNAKE_BACKEND_URL`, `SNAKE_TICK_MS` and
    /// `SNAKE_LEADERBOARD_LIMIT` as looked up through `lookup`. Empty values
    /// are ignored.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("SNAKE_BACKEND_URL")
            && !url.is_empty()
        {
            self.backend.base_url = url;
        }
        if let Some(val) = lookup("SNAKE_TICK_MS")
            && !val.is_empty()
        {
            self.game.tick_interval_ms = val.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "SNAKE_TICK_MS",
                value: val.clone(),
            })?;
        }
        if let Some(val) = lookup("SNAKE_LEADERBOARD_LIMIT")
            && !val.is_empty()
        {
            self.backend.leaderboard_limit =
                val.parse().map_err(|_| ConfigError::InvalidEnv {
                    var: "SNAKE_LEADERBOARD_LIMIT",
                    value: val.clone(),
                })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = &self.game;
        if game.cell_size == 0 {
            return Err(ConfigError::Invalid("game.cell_size must be > 0".into()));
        }
        if game.canvas_size % game.cell_size != 0 {
            return Err(ConfigError::Invalid(format!(
                "game.canvas_size ({}) must be a multiple of game.cell_size ({})",
                game.canvas_size, game.cell_size
            )));
        }
        let tiles = game.canvas_size / game.cell_size;
        if tiles < 2 {
            return Err(ConfigError::Invalid(
                "grid must be at least 2 cells wide".into(),
            ));
        }
        let tiles = tiles as i32;
        if !(0..tiles).contains(&game.start_x) || !(0..tiles).contains(&game.start_y) {
            return Err(ConfigError::Invalid(format!(
                "start cell ({}, {}) is outside the {tiles}x{tiles} grid",
                game.start_x, game.start_y
            )));
        }
        if game.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "game.tick_interval_ms must be > 0".into(),
            ));
        }

        let url = &self.backend.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "backend.base_url must be an http(s) URL, got {url:?}"
            )));
        }
        if !(1..=100).contains(&self.backend.leaderboard_limit) {
            return Err(ConfigError::Invalid(
                "backend.leaderboard_limit must be between 1 and 100".into(),
            ));
        }
        if self.backend.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "backend.request_timeout_secs must be > 0 when set".into(),
            ));
        }
        Ok(())
    }

    /// Game rules described by the `[game]` section. Call after `validate`.
    pub fn rules(&self) -> GameRules {
        GameRules {
            grid: Grid::new(self.game.canvas_size, self.game.cell_size),
            start: Cell::new(self.game.start_x, self.game.start_y),
            start_direction: Direction::Right,
            food_reward: self.game.food_reward,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.game.tick_interval_ms)
    }

    pub fn message_duration(&self) -> Duration {
        Duration::from_secs(self.ui.message_duration_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.backend.request_timeout_secs.map(Duration::from_secs)
    }
}
