//! Shot simulation
//!
//! Strikes the cue ball, then repeatedly asks the physics engine for the next
//! event. Each leg between two events is filled with interpolated frames at a
//! fixed granularity so the shot can be animated smoothly.

use super::engine::PhysicsEngine;
use super::pocket::sunk_between;
use super::table::{Ball, Table};
use crate::Coordinate;
use crate::consts::*;
use crate::error::ShotError;

/// A shot that ran to rest
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedShot {
    /// Every frame of the shot in time order
    pub frames: Vec<Table>,
    /// Balls pocketed during the shot, in the order they dropped
    pub sunk: Vec<u8>,
    /// Simulated seconds from strike to rest
    pub elapsed: f64,
    /// Physics events the shot took
    pub events: u32,
}

impl CompletedShot {
    pub fn sank(&self, number: u8) -> bool {
        self.sunk.contains(&number)
    }

    /// The table the next shot is played from.
    ///
    /// Skips the trailing blank frame that follows a pocketed eight ball.
    pub fn resting_table(&self) -> Option<&Table> {
        self.frames.iter().rev().find(|t| t.ball_count() > 0)
    }
}

/// Result of simulating one shot
#[derive(Debug, Clone, PartialEq)]
pub enum ShotOutcome {
    Completed(CompletedShot),
    /// The event ceiling was hit; the table is returned untouched
    Aborted { table: Table, events: u32 },
}

impl ShotOutcome {
    /// Simulated duration, or -1 for an aborted shot
    pub fn elapsed(&self) -> f64 {
        match self {
            ShotOutcome::Completed(shot) => shot.elapsed,
            ShotOutcome::Aborted { .. } => -1.0,
        }
    }

    /// Frames to show: the full shot, or just the original table when aborted
    pub fn frames(&self) -> &[Table] {
        match self {
            ShotOutcome::Completed(shot) => &shot.frames,
            ShotOutcome::Aborted { table, .. } => std::slice::from_ref(table),
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, ShotOutcome::Aborted { .. })
    }
}

/// Runs shots against a physics engine
#[derive(Debug, Clone)]
pub struct ShotSimulator<E> {
    engine: E,
    /// Seconds between interpolated frames
    pub frame_rate: f64,
    /// Events allowed before a shot is abandoned
    pub max_events: u32,
}

impl<E: PhysicsEngine> ShotSimulator<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            frame_rate: FRAME_RATE,
            max_events: MAX_EVENTS,
        }
    }

    pub fn with_limits(engine: E, frame_rate: f64, max_events: u32) -> Self {
        Self {
            engine,
            frame_rate,
            max_events,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Strike the still cue ball on `table` at `velocity` and run the shot to rest.
    ///
    /// `table` itself is never modified. Physics errors are returned as-is.
    pub fn simulate(&self, table: &Table, velocity: Coordinate) -> Result<ShotOutcome, ShotError> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(ShotError::InvalidFrameRate {
                rate: self.frame_rate,
            });
        }
        let cue_spot = table.still_cue().ok_or(ShotError::NoCueBall)?.pos;
        let params = self.engine.params();
        let start = table.strike(velocity, params.drag, params.vel_epsilon)?;

        let mut frames: Vec<Table> = Vec::new();
        let mut sunk: Vec<u8> = Vec::new();
        let mut events: u32 = 0;
        let mut current = start;

        loop {
            events += 1;
            if events > self.max_events {
                log::warn!(
                    "shot abandoned after {} events ({} frames discarded)",
                    self.max_events,
                    frames.len()
                );
                return Ok(ShotOutcome::Aborted {
                    table: table.clone(),
                    events: self.max_events,
                });
            }

            let Some(next) = self.engine.advance(&current)? else {
                break;
            };

            let leg_frames = self.interpolate_leg(&current, &next, frames.is_empty());
            let leg_sunk = sunk_between(&current, &next);
            log::debug!(
                "leg {}: {:.4}s -> {:.4}s, {} frames, sunk {:?}",
                events,
                current.time,
                next.time,
                leg_frames.len() + 1,
                leg_sunk
            );

            frames.extend(leg_frames);
            frames.push(next.clone());
            sunk.extend(leg_sunk);
            current = next;
        }

        // Nothing moved: the shot is the untouched table
        if frames.is_empty() {
            frames.push(table.clone());
        }

        // Scratch: the cue ball comes back to where it was struck from
        if sunk.contains(&CUE_NUMBER) {
            frames.push(current.with_ball(Ball::still(CUE_NUMBER, cue_spot))?);
        }
        // Blank frame closes the animation once the eight ball drops
        if sunk.contains(&EIGHT_NUMBER) {
            frames.push(current.without_balls());
        }

        Ok(ShotOutcome::Completed(CompletedShot {
            elapsed: current.time - table.time,
            frames,
            sunk,
            events,
        }))
    }

    /// Frames between `from` and the event at `to`, excluding `to` itself.
    ///
    /// The first leg of a shot always opens on the struck table so the
    /// animation starts at the shot's start time.
    fn interpolate_leg(&self, from: &Table, to: &Table, opening: bool) -> Vec<Table> {
        let elapsed = to.time - from.time;
        let mut steps = (elapsed / self.frame_rate).floor().max(0.0) as u64;
        if opening {
            steps = steps.max(1);
        }

        (0..steps)
            .map(|step| self.engine.interpolate(from, step as f64 * self.frame_rate))
            .collect()
    }
}
