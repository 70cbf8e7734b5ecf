//! Eightball - a two-player eight-ball engine
//!
//! Core modules:
//! - `sim`: Deterministic shot simulation (table snapshots, physics events, frames)
//! - `game`: Eight-ball turn rules and table setup
//! - `persistence`: Shot history storage for replay
//! - `renderer`: SVG output of tables and shot animations
//! - `session`: Request boundary owning the active game

pub mod error;
pub mod game;
pub mod persistence;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{HistoryError, PhysicsError, SessionError, SettingsError, ShotError, TableError};
pub use session::Session;
pub use settings::Settings;

use glam::DVec2;

/// A position, velocity or acceleration on the table plane
pub type Coordinate = DVec2;

/// Table and simulation constants
pub mod consts {
    /// Ball geometry
    pub const BALL_RADIUS: f64 = 28.5;
    pub const BALL_DIAMETER: f64 = 2.0 * BALL_RADIUS;
    pub const HOLE_RADIUS: f64 = 2.0 * BALL_DIAMETER;

    /// Table dimensions (length runs along y, width along x)
    pub const TABLE_LENGTH: f64 = 2700.0;
    pub const TABLE_WIDTH: f64 = TABLE_LENGTH / 2.0;

    /// Physics stepping interval (seconds)
    pub const SIM_RATE: f64 = 0.0001;
    /// Below this speed a rolling ball is considered stopped
    pub const VEL_EPSILON: f64 = 0.01;
    /// Rolling resistance (deceleration magnitude, units/s²)
    pub const DRAG: f64 = 150.0;
    /// Longest a single physics event may take (seconds)
    pub const MAX_TIME: f64 = 600.0;
    /// Slots in a table snapshot (cushions + holes + balls)
    pub const MAX_OBJECTS: usize = 26;
    /// Balls present at the start of a game
    pub const MAX_BALLS: usize = 16;

    /// Simulated time between interpolated animation frames (seconds)
    pub const FRAME_RATE: f64 = 0.01;
    /// Physics events allowed per shot before it is aborted
    pub const MAX_EVENTS: u32 = 2500;

    pub const CUE_NUMBER: u8 = 0;
    pub const EIGHT_NUMBER: u8 = 8;
}

/// Deceleration for a ball moving at `vel` under the drag model.
///
/// Zero when the ball is already slower than `epsilon`.
#[inline]
pub fn drag_acceleration(vel: Coordinate, drag: f64, epsilon: f64) -> Coordinate {
    let speed = vel.length();
    if speed > epsilon {
        -vel * (drag / speed)
    } else {
        Coordinate::ZERO
    }
}
