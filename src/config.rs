use crate::{GameError, GameStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const MAX_SIDE: u32 = 80;
const MAX_MINES: u32 = 999;

/// Board size, mine count and style flags for a new game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub height: u32,
    pub width: u32,
    pub mines: u32,
    pub bfs: bool,
    #[serde(alias = "ez_flag")]
    pub easy_flag: bool,
    pub nf: bool,
    /// Fixed seed for mine placement; random when absent.
    pub seed: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            height: 16,
            width: 30,
            mines: 99,
            bfs: false,
            easy_flag: false,
            nf: false,
            seed: None,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), GameError> {
        check_range("height", self.height, 1, MAX_SIDE)?;
        check_range("width", self.width, 1, MAX_SIDE)?;
        let max_mines = (self.width * self.height - 1).min(MAX_MINES);
        check_range("mines", self.mines, 0, max_mines)
    }

    pub fn style(&self) -> GameStyle {
        GameStyle {
            bfs: self.bfs,
            no_flag: self.nf,
            easy_flag: self.easy_flag,
        }
    }
}

fn check_range(name: &str, value: u32, low: u32, high: u32) -> Result<(), GameError> {
    if (low..=high).contains(&value) {
        Ok(())
    } else {
        Err(GameError::InvalidSettings(format!(
            "{name} is {value}, expected {low}..={high}"
        )))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game: GameSettings,
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self, GameError> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.game.validate()?;
        Ok(settings)
    }

    /// Reads settings from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }
}
