//! Error types for simulation, history and the session boundary

use thiserror::Error;

/// Table snapshot construction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    /// Every object slot is taken
    #[error("Table is full ({capacity} objects)")]
    Full { capacity: usize },

    /// A ball with this number is already on the table
    #[error("Ball {number} is already on the table")]
    DuplicateBall { number: u8 },

    /// Ball numbers run from 0 (cue) to 15
    #[error("Invalid ball number: {number}")]
    InvalidBallNumber { number: u8 },

    /// Rack jitter must be finite and non-negative
    #[error("Invalid rack nudge: {nudge}")]
    InvalidNudge { nudge: f64 },
}

/// Errors raised by a physics engine while stepping a table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Stepping produced a NaN or infinite position/velocity
    #[error("Ball {number} left the finite plane at t={time}")]
    NonFinite { number: u8, time: f64 },

    /// Two balls share a centre, so no collision normal exists
    #[error("Balls {a} and {b} overlap exactly")]
    DegenerateCollision { a: u8, b: u8 },
}

/// Errors that prevent a shot from being simulated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShotError {
    /// The table has no still cue ball to strike
    #[error("No still cue ball on the table")]
    NoCueBall,

    /// Shot velocity must be finite
    #[error("Invalid shot velocity: ({x}, {y})")]
    InvalidVelocity { x: f64, y: f64 },

    /// Frames must be spaced by a positive, finite interval
    #[error("Invalid frame rate: {rate}")]
    InvalidFrameRate { rate: f64 },

    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

/// Shot history storage errors
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Requested row does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    /// Shots can only be recorded for one of the game's players
    #[error("{name} is not a player in game {game}")]
    UnknownPlayer { name: String, game: u64 },

    /// Envelope written by an unknown format version
    #[error("Unsupported history version: {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Stored rows violate a table invariant
    #[error("Corrupt history: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings loading errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value that would stall or break the simulation
    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Errors surfaced by the request boundary
#[derive(Error, Debug)]
pub enum SessionError {
    /// A shot arrived before any game was started
    #[error("No game in progress")]
    NoActiveGame,

    /// The active game already has a winner
    #[error("Game is over")]
    GameOver,

    /// Player names must be non-empty and distinct
    #[error("Invalid players: {0}")]
    InvalidPlayers(String),

    /// The shot could not be taken at all
    #[error("Shot error: {0}")]
    Shot(#[from] ShotError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),
}
