//! Table snapshot and the objects it holds
//!
//! A `Table` is a value: advancing, rolling or striking it produces a new
//! snapshot and leaves the original untouched, so frame history never aliases.

use std::collections::BTreeSet;

use crate::consts::*;
use crate::error::{ShotError, TableError};
use crate::{Coordinate, drag_acceleration};

/// Motion state of a ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BallState {
    /// Resting on the felt
    Still,
    /// Moving, decelerating under drag
    Rolling { vel: Coordinate, acc: Coordinate },
}

/// A pool ball (0 = cue, 8 = eight, 1-7 low, 9-15 high)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub number: u8,
    pub pos: Coordinate,
    pub state: BallState,
}

impl Ball {
    pub fn still(number: u8, pos: Coordinate) -> Self {
        Self {
            number,
            pos,
            state: BallState::Still,
        }
    }

    pub fn rolling(number: u8, pos: Coordinate, vel: Coordinate, acc: Coordinate) -> Self {
        Self {
            number,
            pos,
            state: BallState::Rolling { vel, acc },
        }
    }

    #[inline]
    pub fn is_rolling(&self) -> bool {
        matches!(self.state, BallState::Rolling { .. })
    }

    /// Velocity if rolling, `None` for a still ball
    pub fn vel(&self) -> Option<Coordinate> {
        match self.state {
            BallState::Rolling { vel, .. } => Some(vel),
            BallState::Still => None,
        }
    }

    /// Balls are matched across snapshots by number alone
    #[inline]
    pub fn same_number(&self, other: &Ball) -> bool {
        self.number == other.number
    }
}

/// A table edge; fixed for the life of a table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cushion {
    /// Runs along x at offset `y` on the long axis
    Horizontal { y: f64 },
    /// Runs along y at offset `x` on the short axis
    Vertical { x: f64 },
}

/// A pocket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hole {
    pub pos: Coordinate,
}

/// Anything that occupies a table slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableObject {
    Ball(Ball),
    Cushion(Cushion),
    Hole(Hole),
}

impl TableObject {
    pub fn as_ball(&self) -> Option<&Ball> {
        match self {
            TableObject::Ball(ball) => Some(ball),
            _ => None,
        }
    }
}

/// Hole positions of the standard table, in slot order
pub const HOLE_POSITIONS: [(f64, f64); 6] = [
    (0.0, 0.0),
    (0.0, TABLE_LENGTH / 2.0),
    (0.0, TABLE_LENGTH),
    (TABLE_WIDTH, 0.0),
    (TABLE_WIDTH, TABLE_LENGTH / 2.0),
    (TABLE_WIDTH, TABLE_LENGTH),
];

/// An ordered, sparse snapshot of the table at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Simulation time of this snapshot (seconds)
    pub time: f64,
    objects: [Option<TableObject>; MAX_OBJECTS],
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    /// Standard table: four cushions and six holes, no balls, time zero
    pub fn new() -> Self {
        let mut objects = [None; MAX_OBJECTS];
        objects[0] = Some(TableObject::Cushion(Cushion::Horizontal { y: 0.0 }));
        objects[1] = Some(TableObject::Cushion(Cushion::Horizontal { y: TABLE_LENGTH }));
        objects[2] = Some(TableObject::Cushion(Cushion::Vertical { x: 0.0 }));
        objects[3] = Some(TableObject::Cushion(Cushion::Vertical { x: TABLE_WIDTH }));
        for (slot, (x, y)) in objects[4..].iter_mut().zip(HOLE_POSITIONS) {
            *slot = Some(TableObject::Hole(Hole {
                pos: Coordinate::new(x, y),
            }));
        }
        Self { time: 0.0, objects }
    }

    /// Place an object in the first free slot, returning its index
    pub fn add(&mut self, object: TableObject) -> Result<usize, TableError> {
        if let TableObject::Ball(ball) = &object {
            if ball.number > 15 {
                return Err(TableError::InvalidBallNumber {
                    number: ball.number,
                });
            }
            if self.ball(ball.number).is_some() {
                return Err(TableError::DuplicateBall {
                    number: ball.number,
                });
            }
        }

        let index = self
            .objects
            .iter()
            .position(Option::is_none)
            .ok_or(TableError::Full {
                capacity: MAX_OBJECTS,
            })?;
        self.objects[index] = Some(object);
        Ok(index)
    }

    pub fn add_ball(&mut self, ball: Ball) -> Result<usize, TableError> {
        self.add(TableObject::Ball(ball))
    }

    /// Copy of this table with one more ball
    pub fn with_ball(&self, ball: Ball) -> Result<Table, TableError> {
        let mut table = self.clone();
        table.add_ball(ball)?;
        Ok(table)
    }

    /// Copy of this table with every ball removed (fixtures and time kept)
    pub fn without_balls(&self) -> Table {
        let mut table = self.clone();
        for slot in table.objects.iter_mut() {
            if matches!(slot, Some(TableObject::Ball(_))) {
                *slot = None;
            }
        }
        table
    }

    /// Object at a slot, `None` for an empty or out-of-range slot
    pub fn get(&self, index: usize) -> Option<&TableObject> {
        self.objects.get(index).and_then(Option::as_ref)
    }

    /// Raw slots, including empty ones
    pub fn slots(&self) -> &[Option<TableObject>; MAX_OBJECTS] {
        &self.objects
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Option<TableObject>; MAX_OBJECTS] {
        &mut self.objects
    }

    /// Occupied slots in slot order
    pub fn iter(&self) -> impl Iterator<Item = &TableObject> {
        self.objects.iter().flatten()
    }

    /// Balls in slot order
    pub fn balls(&self) -> impl Iterator<Item = &Ball> {
        self.iter().filter_map(TableObject::as_ball)
    }

    pub fn ball(&self, number: u8) -> Option<&Ball> {
        self.balls().find(|b| b.number == number)
    }

    pub fn ball_count(&self) -> usize {
        self.balls().count()
    }

    pub fn rolling_count(&self) -> usize {
        self.balls().filter(|b| b.is_rolling()).count()
    }

    /// Numbers of every ball still on the table, still or rolling
    pub fn balls_remaining(&self) -> BTreeSet<u8> {
        self.balls().map(|b| b.number).collect()
    }

    /// Cue ball, if present and at rest
    pub fn still_cue(&self) -> Option<&Ball> {
        self.balls()
            .find(|b| b.number == CUE_NUMBER && !b.is_rolling())
    }

    /// Copy of this table with the still cue ball struck at `vel`
    pub fn strike(&self, vel: Coordinate, drag: f64, epsilon: f64) -> Result<Table, ShotError> {
        if !vel.is_finite() {
            return Err(ShotError::InvalidVelocity { x: vel.x, y: vel.y });
        }

        let mut table = self.clone();
        let cue = table
            .objects
            .iter_mut()
            .flatten()
            .find_map(|object| match object {
                TableObject::Ball(ball) if ball.number == CUE_NUMBER && !ball.is_rolling() => {
                    Some(ball)
                }
                _ => None,
            })
            .ok_or(ShotError::NoCueBall)?;

        cue.state = BallState::Rolling {
            vel,
            acc: drag_acceleration(vel, drag, epsilon),
        };
        Ok(table)
    }
}
