//! SVG rendering module
//!
//! Draws table snapshots and whole shots as SVG documents for a front end.

pub mod svg;

pub use svg::{BALL_COLOURS, animation_svg, frame_id, table_svg};
