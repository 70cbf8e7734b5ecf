//! Pocketed-ball detection between two snapshots

use super::table::Table;

/// Numbers of balls on `before` that are missing from `after`, in `before`'s slot order.
///
/// Balls are matched by number only; position and motion are ignored.
pub fn sunk_between(before: &Table, after: &Table) -> Vec<u8> {
    before
        .balls()
        .filter(|ball| !after.balls().any(|b| b.same_number(ball)))
        .map(|ball| ball.number)
        .collect()
}
