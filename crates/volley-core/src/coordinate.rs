//! Integer grid coordinates.

use serde::{Deserialize, Serialize};

use crate::direction::Direction;

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// A position on the grid.
///
/// Coordinates are signed: positions outside the board are legal transient
/// values, meaning "about to exit" -- the board decides what is in bounds via
/// [`Board::contains`](crate::board::Board::contains).
///
/// Ordering is row-major (`y` first, then `x`), which fixes the node
/// iteration order used by launch, serialization, and state digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub fn new(x: i32, y: i32) -> Coordinate {
        Coordinate { x, y }
    }

    /// The adjacent coordinate one cell in the given direction.
    ///
    /// No bounds clamping: stepping off the board is how bullets become
    /// outputs.
    pub fn step(self, direction: Direction) -> Coordinate {
        let (dx, dy) = direction.offset();
        Coordinate {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
