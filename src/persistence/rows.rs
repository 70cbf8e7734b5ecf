//! Relational rows shared by every history store

use serde::{Deserialize, Serialize};

use super::records::{ShotRecord, TableRecord};
use super::{GameId, ShotHistory, ShotId, TableId};
use crate::error::HistoryError;
use crate::sim::{PhysicsParams, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRow {
    pub id: GameId,
    pub name: String,
    pub players: [String; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRow {
    pub id: ShotId,
    pub game: GameId,
    pub shooter: String,
    /// Frames of the shot, in order
    pub tables: Vec<TableId>,
}

/// Row counts at a point in time, for undoing a partial write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    games: usize,
    shots: usize,
    tables: usize,
}

/// Games, shots and tables; ids are 1-based row positions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryLog {
    games: Vec<GameRow>,
    shots: Vec<ShotRow>,
    tables: Vec<TableRecord>,
}

impl HistoryLog {
    pub fn mark(&self) -> Mark {
        Mark {
            games: self.games.len(),
            shots: self.shots.len(),
            tables: self.tables.len(),
        }
    }

    /// Drop every row added after `mark`
    pub fn rollback(&mut self, mark: Mark) {
        self.games.truncate(mark.games);
        self.shots.truncate(mark.shots);
        self.tables.truncate(mark.tables);
    }

    pub fn game(&self, id: GameId) -> Result<&GameRow, HistoryError> {
        row(&self.games, id.0, "game")
    }

    pub fn shot(&self, id: ShotId) -> Result<&ShotRow, HistoryError> {
        row(&self.shots, id.0, "shot")
    }

    pub fn table(&self, id: TableId) -> Result<&TableRecord, HistoryError> {
        row(&self.tables, id.0, "table")
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    pub fn shot_count(&self) -> usize {
        self.shots.len()
    }

    pub fn insert_game(&mut self, name: &str, players: [&str; 2]) -> GameId {
        let id = GameId(self.games.len() as u64 + 1);
        self.games.push(GameRow {
            id,
            name: name.to_string(),
            players: players.map(str::to_string),
        });
        id
    }

    pub fn insert_shot(&mut self, shot: &ShotRecord) -> Result<ShotId, HistoryError> {
        let game = self.game(shot.game)?;
        if !game.players.iter().any(|p| *p == shot.shooter) {
            return Err(HistoryError::UnknownPlayer {
                name: shot.shooter.clone(),
                game: shot.game.0,
            });
        }

        let first = self.tables.len() as u64 + 1;
        self.tables.extend(shot.frames.iter().cloned());
        let tables = (first..first + shot.frames.len() as u64).map(TableId).collect();

        let id = ShotId(self.shots.len() as u64 + 1);
        self.shots.push(ShotRow {
            id,
            game: shot.game,
            shooter: shot.shooter.clone(),
            tables,
        });
        Ok(id)
    }

    pub fn frames(&self, id: ShotId, params: &PhysicsParams) -> Result<Vec<Table>, HistoryError> {
        self.shot(id)?
            .tables
            .iter()
            .map(|&table| self.table(table)?.restore(params))
            .collect()
    }

    pub fn shots_for_game(&self, game: GameId) -> Result<Vec<ShotId>, HistoryError> {
        self.game(game)?;
        Ok(self
            .shots
            .iter()
            .filter(|shot| shot.game == game)
            .map(|shot| shot.id)
            .collect())
    }
}

fn row<'a, T>(rows: &'a [T], id: u64, kind: &'static str) -> Result<&'a T, HistoryError> {
    id.checked_sub(1)
        .and_then(|index| rows.get(index as usize))
        .ok_or(HistoryError::NotFound { kind, id })
}

/// In-process history, lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    log: HistoryLog,
    params: PhysicsParams,
}

impl MemoryHistory {
    pub fn new(params: PhysicsParams) -> Self {
        Self {
            log: HistoryLog::default(),
            params,
        }
    }

    pub fn log(&self) -> &HistoryLog {
        &self.log
    }
}

impl ShotHistory for MemoryHistory {
    fn record_game(&mut self, name: &str, players: [&str; 2]) -> Result<GameId, HistoryError> {
        Ok(self.log.insert_game(name, players))
    }

    fn record(&mut self, shot: &ShotRecord) -> Result<ShotId, HistoryError> {
        self.log.insert_shot(shot)
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
