//! 4-way compass directions with quarter-turn arithmetic.
//!
//! Node routing works in two frames: a node yields routes *relative to its
//! own facing* (relative `Up` means "out the front"), and the board converts
//! each relative direction to a world-absolute bullet heading with
//! `node_facing + relative`. [`Direction::relative_to`] is the inverse
//! conversion, used to express an incoming bullet's absolute heading in the
//! node's frame.
//!
//! ```
//! use volley_core::direction::Direction;
//!
//! // A node facing Right that routes relative-Up emits an absolute-Right bullet.
//! assert_eq!(Direction::Right + Direction::Up, Direction::Right);
//! // The same conversion, inverted.
//! assert_eq!(Direction::Right.relative_to(Direction::Right), Direction::Up);
//! ```

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the four compass directions, counted in clockwise quarter turns
/// from `Up`.
///
/// The declaration order (`Up`, `Right`, `Down`, `Left`) is canonical: it
/// fixes [`others`](Self::others) order, route-map iteration order, and
/// therefore the bullet order that collision pairing depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in canonical order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// The number of clockwise quarter turns from `Up` (0..=3).
    ///
    /// This is the wire representation of a node's rotation in board
    /// documents.
    pub fn quarters(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// The direction at the given quarter-turn count, or `None` for counts
    /// outside `0..=3`.
    pub fn from_quarters(quarters: u8) -> Option<Direction> {
        if quarters <= 3 {
            Some(Self::from_quarters_wrapping(quarters))
        } else {
            None
        }
    }

    fn from_quarters_wrapping(quarters: u8) -> Direction {
        match quarters % 4 {
            0 => Direction::Up,
            1 => Direction::Right,
            2 => Direction::Down,
            _ => Direction::Left,
        }
    }

    /// The 180-degree rotation of this direction.
    pub fn inverse(self) -> Direction {
        self + Direction::Down
    }

    /// The three directions excluding `self`, in canonical order.
    ///
    /// Splitter fan-out uses this; the fixed order keeps the emitted bullet
    /// order (and downstream collision tie-breaking) deterministic.
    pub fn others(self) -> [Direction; 3] {
        let mut out = [Direction::Up; 3];
        let mut i = 0;
        for direction in Direction::ALL {
            if direction != self {
                out[i] = direction;
                i += 1;
            }
        }
        out
    }

    /// Express this absolute direction in the frame of a node with the given
    /// facing.
    ///
    /// Inverse of the `facing + relative` conversion:
    /// `(facing + relative).relative_to(facing) == relative`.
    pub fn relative_to(self, facing: Direction) -> Direction {
        Self::from_quarters_wrapping(4 + self.quarters() - facing.quarters())
    }

    /// Rotate one quarter turn clockwise.
    pub fn rotate_cw(self) -> Direction {
        self + Direction::Right
    }

    /// Rotate one quarter turn anticlockwise.
    pub fn rotate_ccw(self) -> Direction {
        self + Direction::Left
    }

    /// The unit grid step for this direction. The y axis grows downward.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }
}

impl std::ops::Add for Direction {
    type Output = Direction;

    /// Rotate `self` clockwise by `rhs`'s quarter-turn count.
    ///
    /// This is the relative-to-absolute conversion for node routes:
    /// `absolute = node_facing + relative`.
    fn add(self, rhs: Direction) -> Direction {
        Self::from_quarters_wrapping(self.quarters() + rhs.quarters())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
