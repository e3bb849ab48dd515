//! Board constants, fleet composition and game settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::common::ConfigError;
use crate::object::{ObjectTemplate, ShipClass};

pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 10;

/// Columns are addressed by a single letter.
pub const MAX_WIDTH: usize = 26;

/// Pause before a computer shot is executed.
pub const COMPUTER_TURN_DELAY_MS: u64 = 1000;

/// Mines added to each fleet in extended mode.
pub const MINES_PER_PLAYER: usize = 3;

/// Placement order of the standard fleet.
pub const STANDARD_FLEET: [ShipClass; 10] = [
    ShipClass::Battleship,
    ShipClass::Cruiser,
    ShipClass::Cruiser,
    ShipClass::Destroyer,
    ShipClass::Destroyer,
    ShipClass::Destroyer,
    ShipClass::Submarine,
    ShipClass::Submarine,
    ShipClass::Submarine,
    ShipClass::Submarine,
];

/// Templates for the standard fleet, all horizontal.
pub fn standard_fleet() -> Vec<ObjectTemplate> {
    STANDARD_FLEET.iter().map(|&c| ObjectTemplate::ship(c)).collect()
}

/// Standard fleet followed by the mines.
pub fn extended_fleet() -> Vec<ObjectTemplate> {
    let mut fleet = standard_fleet();
    fleet.extend(std::iter::repeat(ObjectTemplate::mine()).take(MINES_PER_PLAYER));
    fleet
}

/// Rule set of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Standard,
    /// Mines in the fleet and ship-confined shooting.
    Extended,
}

impl GameMode {
    /// Fleet placed by each player in this mode.
    pub fn fleet(self) -> Vec<ObjectTemplate> {
        match self {
            GameMode::Standard => standard_fleet(),
            GameMode::Extended => extended_fleet(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    #[default]
    Human,
    Computer,
}

/// Computer strength. `Hard` is the statistics-driven player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Impossible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub name: String,
    pub kind: PlayerKind,
    pub difficulty: Difficulty,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            name: "Player".into(),
            kind: PlayerKind::Human,
            difficulty: Difficulty::Easy,
        }
    }
}

impl PlayerSettings {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PlayerKind::Human,
            difficulty: Difficulty::Easy,
        }
    }

    pub fn computer(name: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            name: name.into(),
            kind: PlayerKind::Computer,
            difficulty,
        }
    }
}

/// Everything needed to start a match. Shared read-only by all phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub width: usize,
    pub height: usize,
    pub mode: GameMode,
    pub players: [PlayerSettings; 2],
    pub computer_delay_ms: u64,
    /// JSON-lines file backing the statistics player. In-memory when unset.
    pub history_path: Option<PathBuf>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            mode: GameMode::Standard,
            players: [
                PlayerSettings::human("Player 1"),
                PlayerSettings::computer("Player 2", Difficulty::Easy),
            ],
            computer_delay_ms: COMPUTER_TURN_DELAY_MS,
            history_path: None,
        }
    }
}

impl GameSettings {
    /// Parse settings from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: GameSettings = toml::from_str(text)?;
        settings.validate()
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyBoard {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_WIDTH {
            return Err(ConfigError::TooWide {
                width: self.width,
                max: MAX_WIDTH,
            });
        }
        Ok(self)
    }

    pub fn computer_delay(&self) -> Duration {
        Duration::from_millis(self.computer_delay_ms)
    }

    pub fn fleet(&self) -> Vec<ObjectTemplate> {
        self.mode.fleet()
    }
}
