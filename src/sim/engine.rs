//! Physics engine adapter
//!
//! The shot simulator only needs two things from physics: jump a table to its
//! next significant event, and slide a table forward between events. The
//! `PhysicsEngine` trait is that seam; `EventStepper` is the native engine.

use serde::{Deserialize, Serialize};

use super::collision::{Contact, bounce, distance, roll};
use super::table::{Ball, Table, TableObject};
use crate::consts::*;
use crate::error::PhysicsError;

/// What the shot simulator requires of a physics engine
pub trait PhysicsEngine {
    /// Advance `table` to its next event: a ball stopping, or a ball touching a
    /// cushion, hole or another ball.
    ///
    /// Returns `Ok(None)` once nothing is rolling.
    fn advance(&self, table: &Table) -> Result<Option<Table>, PhysicsError>;

    /// Ball positions `dt` seconds after `table`, assuming no event occurs in
    /// between. The result is stamped `table.time + dt`.
    fn interpolate(&self, table: &Table, dt: f64) -> Table;

    /// Drag and stop threshold used when striking the cue ball
    fn params(&self) -> &PhysicsParams;
}

/// Tunable constants of the native engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Stepping interval (seconds)
    pub sim_rate: f64,
    /// Longest a single event search may run (seconds)
    pub max_time: f64,
    /// Speed below which a ball stops
    pub vel_epsilon: f64,
    /// Deceleration magnitude
    pub drag: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            sim_rate: SIM_RATE,
            max_time: MAX_TIME,
            vel_epsilon: VEL_EPSILON,
            drag: DRAG,
        }
    }
}

/// Fixed-step event search over the standard table
#[derive(Debug, Clone, Default)]
pub struct EventStepper {
    pub params: PhysicsParams,
}

impl EventStepper {
    pub fn new(params: PhysicsParams) -> Self {
        Self { params }
    }

    /// Check every rolling ball of `next` for a stop or contact, in slot order.
    ///
    /// Applies the first event found to `next` and reports whether one occurred.
    // Indexed loops: a ball contact writes back into both slot `i` and slot `j`
    #[allow(clippy::needless_range_loop)]
    fn resolve_first_event(&self, next: &mut Table) -> Result<bool, PhysicsError> {
        let slots = next.slots_mut();

        for i in 0..MAX_OBJECTS {
            let Some(TableObject::Ball(ball)) = slots[i] else {
                continue;
            };
            let Some(vel) = ball.vel() else {
                continue;
            };

            if vel.length() < self.params.vel_epsilon {
                slots[i] = Some(TableObject::Ball(Ball::still(ball.number, ball.pos)));
                return Ok(true);
            }

            for j in 0..MAX_OBJECTS {
                if i == j {
                    continue;
                }
                let Some(other) = slots[j] else {
                    continue;
                };
                if distance(&ball, &other).is_none_or(|gap| gap >= 0.0) {
                    continue;
                }

                match bounce(&ball, &other, self.params.drag, self.params.vel_epsilon)? {
                    Contact::Pocketed => slots[i] = None,
                    Contact::Rebound(out) => slots[i] = Some(TableObject::Ball(out)),
                    Contact::Struck { ball, target } => {
                        slots[i] = Some(TableObject::Ball(ball));
                        slots[j] = Some(TableObject::Ball(target));
                    }
                }
                return Ok(true);
            }
        }

        Ok(false)
    }
}

impl PhysicsEngine for EventStepper {
    fn advance(&self, table: &Table) -> Result<Option<Table>, PhysicsError> {
        if table.rolling_count() == 0 {
            return Ok(None);
        }

        let mut next = table.clone();
        let mut step: u64 = 1;
        loop {
            let t = step as f64 * self.params.sim_rate;
            if t >= self.params.max_time {
                break;
            }
            next.time = table.time + t;

            for (slot, origin) in next.slots_mut().iter_mut().zip(table.slots()) {
                if let (Some(TableObject::Ball(ball)), Some(TableObject::Ball(start))) = (slot, origin) {
                    if start.is_rolling() {
                        *ball = roll(start, t);
                        if !ball.pos.is_finite() {
                            return Err(PhysicsError::NonFinite {
                                number: ball.number,
                                time: next.time,
                            });
                        }
                    }
                }
            }

            if self.resolve_first_event(&mut next)? {
                log::trace!("event at t={:.4} after {} steps", next.time, step);
                return Ok(Some(next));
            }
            step += 1;
        }

        Ok(Some(next))
    }

    fn interpolate(&self, table: &Table, dt: f64) -> Table {
        let mut rolled = table.clone();
        rolled.time = table.time + dt;
        for slot in rolled.slots_mut().iter_mut() {
            if let Some(TableObject::Ball(ball)) = slot {
                *ball = roll(ball, dt);
            }
        }
        rolled
    }

    fn params(&self) -> &PhysicsParams {
        &self.params
    }
}
