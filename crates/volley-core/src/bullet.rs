//! The moving-token data model: bullets and their per-tick movements.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::direction::Direction;

// ---------------------------------------------------------------------------
// Bullet
// ---------------------------------------------------------------------------

/// A moving token: a position, an absolute heading, and an optional
/// arbitrary-precision value.
///
/// `value == None` is the *empty* token -- a first-class value distinct from
/// every integer, including zero. Conditional nodes and outputs treat it as
/// ordinary data, never as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    pub coordinate: Coordinate,
    pub direction: Direction,
    pub value: Option<BigInt>,
}

impl Bullet {
    pub fn new(coordinate: Coordinate, direction: Direction, value: Option<BigInt>) -> Bullet {
        Bullet {
            coordinate,
            direction,
            value,
        }
    }

    /// The cell this bullet will occupy after the next advance phase.
    ///
    /// Computed, not applied: movement only happens once collisions are
    /// resolved.
    pub fn next_coordinate(&self) -> Coordinate {
        self.coordinate.step(self.direction)
    }

    /// This bullet relocated to `coordinate`, heading and value unchanged.
    pub fn advanced_to(&self, coordinate: Coordinate) -> Bullet {
        Bullet {
            coordinate,
            direction: self.direction,
            value: self.value.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// One bullet's proposed relocation this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub from: Coordinate,
    pub to: Coordinate,
}

// ---------------------------------------------------------------------------
// BulletMovement
// ---------------------------------------------------------------------------

/// A bullet paired with its proposed movement -- the unit collision analysis
/// operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletMovement {
    pub bullet: Bullet,
    pub movement: Movement,
}

impl BulletMovement {
    /// Build the movement descriptor for a bullet from its current state.
    pub fn propose(bullet: Bullet) -> BulletMovement {
        let movement = Movement {
            from: bullet.coordinate,
            to: bullet.next_coordinate(),
        };
        BulletMovement { bullet, movement }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_coordinate_follows_heading() {
        let bullet = Bullet::new(Coordinate::new(1, 1), Direction::Right, None);
        assert_eq!(bullet.next_coordinate(), Coordinate::new(2, 1));
        // Computing the next coordinate does not move the bullet.
        assert_eq!(bullet.coordinate, Coordinate::new(1, 1));
    }

    #[test]
    fn advanced_to_keeps_heading_and_value() {
        let bullet = Bullet::new(
            Coordinate::new(0, 0),
            Direction::Down,
            Some(BigInt::from(-7)),
        );
        let moved = bullet.advanced_to(Coordinate::new(0, 1));
        assert_eq!(moved.coordinate, Coordinate::new(0, 1));
        assert_eq!(moved.direction, Direction::Down);
        assert_eq!(moved.value, Some(BigInt::from(-7)));
    }

    #[test]
    fn propose_records_from_and_to() {
        let bullet = Bullet::new(Coordinate::new(2, 0), Direction::Left, None);
        let bm = BulletMovement::propose(bullet);
        assert_eq!(bm.movement.from, Coordinate::new(2, 0));
        assert_eq!(bm.movement.to, Coordinate::new(1, 0));
    }
}
