//! Deterministic shot simulation
//!
//! Pure and value-oriented:
//! - Tables are snapshots; every step produces a new one
//! - Stable iteration order (by table slot)
//! - No rules, storage or rendering dependencies

pub mod collision;
pub mod engine;
pub mod pocket;
pub mod shot;
pub mod table;

pub use collision::{Contact, bounce, distance, roll};
pub use engine::{EventStepper, PhysicsEngine, PhysicsParams};
pub use pocket::sunk_between;
pub use shot::{CompletedShot, ShotOutcome, ShotSimulator};
pub use table::{Ball, BallState, Cushion, HOLE_POSITIONS, Hole, Table, TableObject};
