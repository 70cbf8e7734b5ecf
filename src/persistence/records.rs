//! Persisted row shapes for tables and shots

use serde::{Deserialize, Serialize};

use super::GameId;
use crate::error::HistoryError;
use crate::sim::{Ball, PhysicsParams, Table};
use crate::{Coordinate, drag_acceleration};

/// One ball as stored: a missing velocity marks a still ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallRecord {
    pub number: u8,
    pub pos: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vel: Option<Coordinate>,
}

/// One table snapshot as stored (balls only; fixtures are implied)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub time: f64,
    pub balls: Vec<BallRecord>,
}

impl From<&Table> for TableRecord {
    fn from(table: &Table) -> Self {
        Self {
            time: table.time,
            balls: table
                .balls()
                .map(|ball| BallRecord {
                    number: ball.number,
                    pos: ball.pos,
                    vel: ball.vel(),
                })
                .collect(),
        }
    }
}

impl TableRecord {
    /// Rebuild the snapshot; rolling balls get their drag re-derived from velocity
    pub fn restore(&self, params: &PhysicsParams) -> Result<Table, HistoryError> {
        let mut table = Table::new();
        table.time = self.time;
        for record in &self.balls {
            let ball = match record.vel {
                None => Ball::still(record.number, record.pos),
                Some(vel) => Ball::rolling(
                    record.number,
                    record.pos,
                    vel,
                    drag_acceleration(vel, params.drag, params.vel_epsilon),
                ),
            };
            table
                .add_ball(ball)
                .map_err(|e| HistoryError::Corrupt(format!("table at t={}: {e}", self.time)))?;
        }
        Ok(table)
    }
}

/// A shot ready to be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub game: GameId,
    /// Name of the player who took the shot
    pub shooter: String,
    pub frames: Vec<TableRecord>,
}

impl ShotRecord {
    pub fn new(game: GameId, shooter: impl Into<String>, frames: &[Table]) -> Self {
        Self {
            game,
            shooter: shooter.into(),
            frames: frames.iter().map(TableRecord::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn test_record_drops_fixtures_and_keeps_motion() {
        let mut table = Table::new();
        table.time = 1.25;
        table
            .add_ball(Ball::still(4, Coordinate::new(100.0, 200.0)))
            .unwrap();
        table
            .add_ball(Ball::rolling(
                0,
                Coordinate::new(300.0, 400.0),
                Coordinate::new(-12.5, 7.0),
                Coordinate::ZERO,
            ))
            .unwrap();

        let record = TableRecord::from(&table);
        assert_eq!(record.time, 1.25);
        assert_eq!(record.balls.len(), 2);
        assert_eq!(record.balls[0].vel, None);
        assert_eq!(record.balls[1].vel, Some(Coordinate::new(-12.5, 7.0)));
    }

    #[test]
    fn test_restore_rederives_drag() {
        let record = TableRecord {
            time: 0.5,
            balls: vec![BallRecord {
                number: 0,
                pos: Coordinate::new(10.0, 10.0),
                vel: Some(Coordinate::new(0.0, 300.0)),
            }],
        };
        let table = record.restore(&PhysicsParams::default()).unwrap();
        let cue = table.ball(0).unwrap();
        match cue.state {
            crate::sim::BallState::Rolling { acc, .. } => assert_eq!(acc, Coordinate::new(0.0, -DRAG)),
            crate::sim::BallState::Still => panic!("expected rolling cue"),
        }
        assert_eq!(table.iter().count(), 11);
    }

    #[test]
    fn test_restore_rejects_duplicate_balls() {
        let ball = BallRecord {
            number: 3,
            pos: Coordinate::ZERO,
            vel: None,
        };
        let record = TableRecord {
            time: 0.0,
            balls: vec![ball, ball],
        };
        assert!(matches!(
            record.restore(&PhysicsParams::default()),
            Err(HistoryError::Corrupt(_))
        ));
    }

    #[test]
    fn test_still_ball_serializes_without_velocity() {
        let json = serde_json::to_string(&BallRecord {
            number: 8,
            pos: Coordinate::new(1.5, 2.5),
            vel: None,
        })
        .unwrap();
        assert!(!json.contains("vel"));
    }
}
