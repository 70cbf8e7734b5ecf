//! Ball kinematics, contact distances and collision response
//!
//! A rolling ball decelerates at a constant rate opposite its velocity. Any
//! velocity component that would change sign is clamped to zero instead,
//! along with its acceleration, so drag never pushes a ball backwards.

use super::table::{Ball, BallState, Cushion, Hole, TableObject};
use crate::consts::*;
use crate::error::PhysicsError;
use crate::{Coordinate, drag_acceleration};

/// Position and velocity of `ball` after rolling for `t` seconds.
///
/// Still balls are returned unchanged.
pub fn roll(ball: &Ball, t: f64) -> Ball {
    let BallState::Rolling { vel, acc } = ball.state else {
        return *ball;
    };

    let pos = ball.pos + vel * t + 0.5 * acc * t * t;
    let mut new_vel = vel + acc * t;
    let mut new_acc = acc;

    if new_vel.x * vel.x < 0.0 {
        new_vel.x = 0.0;
        new_acc.x = 0.0;
    }
    if new_vel.y * vel.y < 0.0 {
        new_vel.y = 0.0;
        new_acc.y = 0.0;
    }

    Ball::rolling(ball.number, pos, new_vel, new_acc)
}

/// Gap between a rolling ball's surface and another object.
///
/// Negative means the two overlap. `None` when `ball` is not rolling.
pub fn distance(ball: &Ball, other: &TableObject) -> Option<f64> {
    if !ball.is_rolling() {
        return None;
    }

    let gap = match other {
        TableObject::Ball(target) => ball.pos.distance(target.pos) - BALL_DIAMETER,
        TableObject::Hole(Hole { pos }) => ball.pos.distance(*pos) - HOLE_RADIUS,
        TableObject::Cushion(Cushion::Horizontal { y }) => (y - ball.pos.y).abs() - BALL_RADIUS,
        TableObject::Cushion(Cushion::Vertical { x }) => (x - ball.pos.x).abs() - BALL_RADIUS,
    };
    Some(gap)
}

/// Outcome of a rolling ball touching another object
#[derive(Debug, Clone, PartialEq)]
pub enum Contact {
    /// The ball dropped into a hole
    Pocketed,
    /// The ball rebounded off a cushion
    Rebound(Ball),
    /// Two balls exchanged momentum
    Struck { ball: Ball, target: Ball },
}

/// Resolve contact between rolling `ball` and `other`.
pub fn bounce(
    ball: &Ball,
    other: &TableObject,
    drag: f64,
    epsilon: f64,
) -> Result<Contact, PhysicsError> {
    let BallState::Rolling { vel, acc } = ball.state else {
        return Ok(Contact::Rebound(*ball));
    };

    match other {
        TableObject::Hole(_) => Ok(Contact::Pocketed),
        TableObject::Cushion(Cushion::Horizontal { .. }) => Ok(Contact::Rebound(Ball::rolling(
            ball.number,
            ball.pos,
            Coordinate::new(vel.x, -vel.y),
            Coordinate::new(acc.x, -acc.y),
        ))),
        TableObject::Cushion(Cushion::Vertical { .. }) => Ok(Contact::Rebound(Ball::rolling(
            ball.number,
            ball.pos,
            Coordinate::new(-vel.x, vel.y),
            Coordinate::new(-acc.x, acc.y),
        ))),
        TableObject::Ball(target) => {
            // A struck still ball starts rolling from rest
            let (target_vel, target_acc) = match target.state {
                BallState::Rolling { vel, acc } => (vel, acc),
                BallState::Still => (Coordinate::ZERO, Coordinate::ZERO),
            };

            let r_ab = ball.pos - target.pos;
            let length = r_ab.length();
            if length == 0.0 {
                return Err(PhysicsError::DegenerateCollision {
                    a: ball.number,
                    b: target.number,
                });
            }
            let n = r_ab / length;
            let v_rel_n = (vel - target_vel).dot(n);

            let new_vel = vel - v_rel_n * n;
            let new_target_vel = target_vel + v_rel_n * n;

            Ok(Contact::Struck {
                ball: Ball::rolling(
                    ball.number,
                    ball.pos,
                    new_vel,
                    rederive_acc(new_vel, acc, drag, epsilon),
                ),
                target: Ball::rolling(
                    target.number,
                    target.pos,
                    new_target_vel,
                    rederive_acc(new_target_vel, target_acc, drag, epsilon),
                ),
            })
        }
    }
}

/// Drag for the new velocity, or the previous acceleration for a ball too slow to steer
fn rederive_acc(vel: Coordinate, previous: Coordinate, drag: f64, epsilon: f64) -> Coordinate {
    if vel.length() > epsilon {
        drag_acceleration(vel, drag, epsilon)
    } else {
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rolling(number: u8, pos: (f64, f64), vel: (f64, f64)) -> Ball {
        let vel = Coordinate::new(vel.0, vel.1);
        Ball::rolling(
            number,
            Coordinate::new(pos.0, pos.1),
            vel,
            drag_acceleration(vel, DRAG, VEL_EPSILON),
        )
    }

    #[test]
    fn test_roll_matches_kinematics() {
        let ball = rolling(1, (100.0, 100.0), (300.0, 0.0));
        let rolled = roll(&ball, 0.5);
        // x = 100 + 300*0.5 - 0.5*150*0.25
        assert!((rolled.pos.x - 231.25).abs() < 1e-9);
        assert_eq!(rolled.pos.y, 100.0);
        assert!((rolled.vel().unwrap().x - 225.0).abs() < 1e-9);
    }

    #[test]
    fn test_roll_clamps_sign_change() {
        let ball = rolling(1, (100.0, 100.0), (15.0, 0.0));
        let rolled = roll(&ball, 1.0);
        let BallState::Rolling { vel, acc } = rolled.state else {
            panic!("rolled ball should still be rolling");
        };
        assert_eq!(vel.x, 0.0);
        assert_eq!(acc.x, 0.0);
    }

    #[test]
    fn test_roll_still_ball_is_identity() {
        let ball = Ball::still(4, Coordinate::new(10.0, 20.0));
        assert_eq!(roll(&ball, 3.0), ball);
    }

    #[test]
    fn test_distance_to_cushions_and_holes() {
        let ball = rolling(0, (50.0, 500.0), (1.0, 0.0));
        let left = TableObject::Cushion(Cushion::Vertical { x: 0.0 });
        assert!((distance(&ball, &left).unwrap() - (50.0 - BALL_RADIUS)).abs() < 1e-9);

        let hole = TableObject::Hole(Hole {
            pos: Coordinate::new(50.0, 600.0),
        });
        assert!((distance(&ball, &hole).unwrap() - (100.0 - HOLE_RADIUS)).abs() < 1e-9);
    }

    #[test]
    fn test_distance_requires_rolling_ball() {
        let ball = Ball::still(0, Coordinate::new(50.0, 500.0));
        let left = TableObject::Cushion(Cushion::Vertical { x: 0.0 });
        assert_eq!(distance(&ball, &left), None);
    }

    #[test]
    fn test_cushion_reflects_velocity_and_drag() {
        let ball = rolling(0, (30.0, 500.0), (-200.0, 50.0));
        let wall = TableObject::Cushion(Cushion::Vertical { x: 0.0 });
        let Contact::Rebound(out) = bounce(&ball, &wall, DRAG, VEL_EPSILON).unwrap() else {
            panic!("expected rebound");
        };
        let BallState::Rolling { vel, acc } = out.state else {
            panic!("expected rolling");
        };
        assert_eq!(vel, Coordinate::new(200.0, 50.0));
        assert!(acc.x < 0.0);
    }

    #[test]
    fn test_head_on_collision_transfers_velocity() {
        let cue = rolling(0, (100.0, 100.0), (0.0, -400.0));
        let target = TableObject::Ball(Ball::still(1, Coordinate::new(100.0, 45.0)));
        let Contact::Struck { ball, target } = bounce(&cue, &target, DRAG, VEL_EPSILON).unwrap()
        else {
            panic!("expected ball contact");
        };
        assert!(ball.vel().unwrap().length() < 1e-9);
        assert!((target.vel().unwrap().y + 400.0).abs() < 1e-9);
        assert!(target.is_rolling());
    }

    #[test]
    fn test_hole_pockets_ball() {
        let ball = rolling(9, (10.0, 10.0), (-5.0, -5.0));
        let hole = TableObject::Hole(Hole { pos: Coordinate::ZERO });
        assert_eq!(
            bounce(&ball, &hole, DRAG, VEL_EPSILON).unwrap(),
            Contact::Pocketed
        );
    }

    #[test]
    fn test_coincident_balls_are_degenerate() {
        let ball = rolling(2, (10.0, 10.0), (1.0, 0.0));
        let other = TableObject::Ball(Ball::still(3, Coordinate::new(10.0, 10.0)));
        assert_eq!(
            bounce(&ball, &other, DRAG, VEL_EPSILON).unwrap_err(),
            PhysicsError::DegenerateCollision { a: 2, b: 3 }
        );
    }
}
