//! Eight-ball turn rules
//!
//! Groups are assigned by the first numbered ball pocketed (other than the
//! eight). Pocketing one of your own group earns another shot; anything else
//! passes the turn. Dropping the eight ends the game: it wins if the shooter's
//! group is cleared, and loses otherwise.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::EIGHT_NUMBER;

/// One of the two players at the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    /// Coin toss for the opening shot
    pub fn toss<R: Rng>(rng: &mut R) -> Seat {
        if rng.random_bool(0.5) {
            Seat::First
        } else {
            Seat::Second
        }
    }
}

/// A ball group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Group {
    /// Balls 1-7
    Low,
    /// Balls 9-15
    High,
}

impl Group {
    /// Group a numbered ball belongs to; `None` for the cue and eight
    pub fn of(number: u8) -> Option<Group> {
        match number {
            1..=7 => Some(Group::Low),
            9..=15 => Some(Group::High),
            _ => None,
        }
    }

    pub fn numbers(self) -> RangeInclusive<u8> {
        match self {
            Group::Low => 1..=7,
            Group::High => 9..=15,
        }
    }

    #[inline]
    pub fn contains(self, number: u8) -> bool {
        self.numbers().contains(&number)
    }

    pub fn opposite(self) -> Group {
        match self {
            Group::Low => Group::High,
            Group::High => Group::Low,
        }
    }
}

/// What happens after a shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOutcome {
    /// The shooter pocketed one of their own and goes again
    ShootAgain(Seat),
    /// The turn passes to this player
    Pass(Seat),
    /// The eight ball dropped and the game is decided
    GameOver {
        winner: Seat,
        /// The eight went down before the loser's group was cleared
        early_eight: bool,
    },
}

impl TurnOutcome {
    /// Who shoots next; `None` once the game is over
    pub fn next_shooter(&self) -> Option<Seat> {
        match *self {
            TurnOutcome::ShootAgain(seat) | TurnOutcome::Pass(seat) => Some(seat),
            TurnOutcome::GameOver { .. } => None,
        }
    }

    pub fn winner(&self) -> Option<Seat> {
        match *self {
            TurnOutcome::GameOver { winner, .. } => Some(winner),
            _ => None,
        }
    }
}

/// Rules state of one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub name: String,
    players: [String; 2],
    /// Group per seat; both unset until the first assignment
    groups: [Option<Group>; 2],
    winner: Option<Seat>,
}

impl Game {
    pub fn new(name: impl Into<String>, first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            players: [first.into(), second.into()],
            groups: [None, None],
            winner: None,
        }
    }

    pub fn player(&self, seat: Seat) -> &str {
        &self.players[seat.index()]
    }

    pub fn seat_of(&self, name: &str) -> Option<Seat> {
        [Seat::First, Seat::Second]
            .into_iter()
            .find(|seat| self.player(*seat) == name)
    }

    pub fn group_of(&self, seat: Seat) -> Option<Group> {
        self.groups[seat.index()]
    }

    /// Seat holding balls 1-7, once groups are assigned
    pub fn low_owner(&self) -> Option<Seat> {
        [Seat::First, Seat::Second]
            .into_iter()
            .find(|seat| self.group_of(*seat) == Some(Group::Low))
    }

    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Apply one completed shot.
    ///
    /// `sunk` lists every ball pocketed during the shot; `remaining` holds the
    /// numbers still on the table once the balls came to rest.
    pub fn resolve_shot(&mut self, shooter: Seat, sunk: &[u8], remaining: &BTreeSet<u8>) -> TurnOutcome {
        self.assign_groups(shooter, sunk);
        let own = self.group_of(shooter);

        if sunk.contains(&EIGHT_NUMBER) {
            // An unassigned shooter has no group to clear, so the eight is always early
            let early_eight = match own {
                Some(group) => remaining.iter().any(|&n| group.contains(n)),
                None => true,
            };
            let winner = if early_eight { shooter.other() } else { shooter };
            self.winner = Some(winner);
            log::info!(
                "{} wins {} ({})",
                self.player(winner),
                self.name,
                if early_eight { "eight ball sunk early" } else { "eight ball cleared" }
            );
            TurnOutcome::GameOver {
                winner,
                early_eight,
            }
        } else if own.is_some_and(|group| sunk.iter().any(|&n| group.contains(n))) {
            TurnOutcome::ShootAgain(shooter)
        } else {
            TurnOutcome::Pass(shooter.other())
        }
    }

    /// Assign groups from the first numbered ball pocketed, if not yet assigned
    fn assign_groups(&mut self, shooter: Seat, sunk: &[u8]) {
        if self.groups.iter().all(Option::is_some) {
            return;
        }

        // Group::of skips the cue and the eight
        let Some(group) = sunk.iter().find_map(|&n| Group::of(n)) else {
            return;
        };

        self.groups[shooter.index()] = Some(group);
        self.groups[shooter.other().index()] = Some(group.opposite());
        log::info!(
            "{} takes the {:?} group, {} the {:?}",
            self.player(shooter),
            group,
            self.player(shooter.other()),
            group.opposite()
        );
    }
}
