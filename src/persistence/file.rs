//! File-backed history
//!
//! The whole log is written as one versioned JSON envelope. Saves go to a
//! temp file first, the previous save is kept as a backup, then the temp file
//! is renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::records::ShotRecord;
use super::rows::HistoryLog;
use super::{GameId, ShotHistory, ShotId, TableId};
use crate::error::HistoryError;
use crate::sim::{PhysicsParams, Table};

/// Current envelope format
pub const HISTORY_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    log: HistoryLog,
}

/// History persisted to a JSON file after every write
#[derive(Debug)]
pub struct JsonHistory {
    path: PathBuf,
    log: HistoryLog,
    params: PhysicsParams,
}

impl JsonHistory {
    /// Open an existing history file, or start an empty one at `path`
    pub fn open(path: impl Into<PathBuf>, params: PhysicsParams) -> Result<Self, HistoryError> {
        let path = path.into();
        let log = if path.exists() {
            let envelope: Envelope = serde_json::from_str(&fs::read_to_string(&path)?)?;
            if envelope.version != HISTORY_VERSION {
                return Err(HistoryError::UnsupportedVersion {
                    found: envelope.version,
                    expected: HISTORY_VERSION,
                });
            }
            log::info!(
                "Loaded history from {} ({} games, {} shots)",
                path.display(),
                envelope.log.game_count(),
                envelope.log.shot_count()
            );
            envelope.log
        } else {
            log::info!("Starting new history at {}", path.display());
            HistoryLog::default()
        };

        Ok(Self { path, log, params })
    }

    /// Discard any existing file and start empty
    pub fn create(path: impl Into<PathBuf>, params: PhysicsParams) -> Result<Self, HistoryError> {
        let history = Self {
            path: path.into(),
            log: HistoryLog::default(),
            params,
        };
        history.save()?;
        Ok(history)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&self) -> &HistoryLog {
        &self.log
    }

    fn save(&self) -> Result<(), HistoryError> {
        let json = serde_json::to_string(&Envelope {
            version: HISTORY_VERSION,
            log: self.log.clone(),
        })?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        if self.path.exists() {
            fs::rename(&self.path, self.path.with_extension("bak"))?;
        }
        fs::rename(&tmp, &self.path)?;
        log::debug!("History saved to {}", self.path.display());
        Ok(())
    }

    /// Apply `write` and persist it, undoing the write if the save fails
    fn commit<T>(
        &mut self,
        write: impl FnOnce(&mut HistoryLog) -> Result<T, HistoryError>,
    ) -> Result<T, HistoryError> {
        let mark = self.log.mark();
        let result = write(&mut self.log).and_then(|value| self.save().map(|()| value));
        if result.is_err() {
            self.log.rollback(mark);
        }
        result
    }
}

impl ShotHistory for JsonHistory {
    fn record_game(&mut self, name: &str, players: [&str; 2]) -> Result<GameId, HistoryError> {
        self.commit(|log| Ok(log.insert_game(name, players)))
    }

    fn record(&mut self, shot: &ShotRecord) -> Result<ShotId, HistoryError> {
        self.commit(|log| log.insert_shot(shot))
    }

    fn load(&self, id: ShotId) -> Result<Vec<Table>, HistoryError> {
        self.log.frames(id, &self.params)
    }

    fn load_table(&self, id: TableId) -> Result<Table, HistoryError> {
        self.log.table(id)?.restore(&self.params)
    }

    fn shots_for_game(&self, game: GameId) -> Result<Vec<ShotId>, HistoryError> {
        self.log.shots_for_game(game)
    }
}
