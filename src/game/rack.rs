//! Opening table layout
//!
//! Balls 1-15 form a five-row triangle with its apex on the head spot,
//! rows growing toward the far cushion. The cue ball sits on the foot spot.

use rand::Rng;

use crate::consts::*;
use crate::error::TableError;
use crate::sim::{Ball, Table};
use crate::Coordinate;

/// Ball numbers per rack row, apex first, left to right
pub const RACK_ROWS: [&[u8]; 5] = [
    &[1],
    &[2, 9],
    &[3, 8, 10],
    &[4, 14, 7, 11],
    &[12, 6, 15, 13, 5],
];

/// Centre-to-centre spacing inside the rack
const RACK_SPACING: f64 = BALL_DIAMETER + 4.0;

/// Where the cue ball starts
pub fn cue_spot() -> Coordinate {
    Coordinate::new(TABLE_WIDTH / 2.0, TABLE_LENGTH - TABLE_WIDTH / 2.0)
}

/// Unjittered rack position of the ball in `row` at `column`
pub fn rack_position(row: usize, column: usize) -> Coordinate {
    let row_f = row as f64;
    let x = TABLE_WIDTH / 2.0 + (2.0 * column as f64 - row_f) * RACK_SPACING / 2.0;
    let y = TABLE_WIDTH / 2.0 - row_f * 3.0_f64.sqrt() / 2.0 * RACK_SPACING;
    Coordinate::new(x, y)
}

/// A freshly racked table.
///
/// Every racked ball is jittered by up to `nudge` on each axis so no two
/// breaks are identical; the cue ball is placed exactly.
pub fn new_rack<R: Rng>(rng: &mut R, nudge: f64) -> Result<Table, TableError> {
    if !(nudge.is_finite() && nudge >= 0.0) {
        return Err(TableError::InvalidNudge { nudge });
    }
    let mut table = Table::new();
    table.add_ball(Ball::still(CUE_NUMBER, cue_spot()))?;

    for (row, numbers) in RACK_ROWS.iter().enumerate() {
        for (column, &number) in numbers.iter().enumerate() {
            let jitter = Coordinate::new(
                rng.random_range(-nudge..=nudge),
                rng.random_range(-nudge..=nudge),
            );
            table.add_ball(Ball::still(number, rack_position(row, column) + jitter))?;
        }
    }

    Ok(table)
}
