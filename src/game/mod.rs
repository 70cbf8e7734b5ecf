//! Eight-ball rules and table setup
//!
//! Consumes the results of the simulation; never steps physics itself.

pub mod rack;
pub mod rules;

pub use rack::{RACK_ROWS, cue_spot, new_rack, rack_position};
pub use rules::{Game, Group, Seat, TurnOutcome};
