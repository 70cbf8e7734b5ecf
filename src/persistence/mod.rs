//! Shot history for replay
//!
//! Features:
//! - Shots stored as ordered frame lists, keyed by game and shooter
//! - Exact float round-trip of positions and velocities
//! - In-memory store and a versioned JSON file store with backup rotation

pub mod file;
pub mod records;
pub mod rows;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HistoryError;
use crate::sim::Table;

pub use file::{HISTORY_VERSION, JsonHistory};
pub use records::{BallRecord, ShotRecord, TableRecord};
pub use rows::{GameRow, HistoryLog, MemoryHistory, ShotRow};

macro_rules! row_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " {}"), self.0)
            }
        }
    };
}

row_id!(GameId, "game");
row_id!(ShotId, "shot");
row_id!(TableId, "table");

/// Where completed shots are kept
pub trait ShotHistory {
    /// Register a new game and its two players
    fn record_game(&mut self, name: &str, players: [&str; 2]) -> Result<GameId, HistoryError>;

    /// Store a shot's frames in order. Nothing is stored if this fails.
    fn record(&mut self, shot: &ShotRecord) -> Result<ShotId, HistoryError>;

    /// Frames of a recorded shot, in the order they were recorded
    fn load(&self, id: ShotId) -> Result<Vec<Table>, HistoryError>;

    /// A single stored table snapshot
    fn load_table(&self, id: TableId) -> Result<Table, HistoryError>;

    /// Shots of a game in the order they were taken
    fn shots_for_game(&self, game: GameId) -> Result<Vec<ShotId>, HistoryError>;
}
