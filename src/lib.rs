pub mod action;
pub mod board;
pub mod config;
pub mod counter;
pub mod error;
pub mod game;
pub mod layout;
pub mod metrics;
pub mod position;
pub mod segment;
pub mod tile;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use action::{parse_log, refine, ActionEvent, ActionKind, CHORD_TOLERANCE_MS};
pub use board::{Board, BoardState, Changes};
pub use config::{GameSettings, Settings};
pub use counter::{Button, Counters, Tally, Timer};
pub use error::{FormatError, GameError};
pub use game::{replay, Game, GameStyle};
pub use layout::{MineLayout, MINE, MINE_SYMBOL};
pub use metrics::{safe_divide, AnalysisResult, Difficulty, RawStats, Style};
pub use position::{Dimensions, Position};
pub use segment::{segment, RegionId, RegionTracker, Regions};
pub use tile::{DisplayCode, Tile};
