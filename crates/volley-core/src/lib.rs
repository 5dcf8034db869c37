//! Volley Core -- grid-based, tick-driven token-routing simulator.
//!
//! A fixed-size 2D [`Board`](board::Board) holds typed [`Node`](node::Node)s
//! at grid coordinates. [`Bullet`](bullet::Bullet)s -- tokens carrying an
//! optional arbitrary-precision integer -- move one cell per tick, are
//! transformed when they sit on a node, and collide with each other. Each
//! call to [`Board::tick`](board::Board::tick) advances the simulation by
//! exactly one discrete, deterministic step and returns a
//! [`TickReport`](report::TickReport) describing collisions, values that left
//! the board, and whether the program halted.
//!
//! # Quick Start
//!
//! ```
//! use volley_core::prelude::*;
//!
//! // A 3x1 program: input fires a bullet rightwards, a branch relays it,
//! // and a halt node stops the run.
//! let mut board = Board::new(3, 1);
//! board.place_node(
//!     Coordinate::new(0, 0),
//!     Node::new(NodeKind::input(Some(0)), Direction::Right),
//! );
//! board.place_node(
//!     Coordinate::new(1, 0),
//!     Node::new(NodeKind::Branch, Direction::Right),
//! );
//! board.place_node(
//!     Coordinate::new(2, 0),
//!     Node::new(NodeKind::Halt, Direction::Up),
//! );
//!
//! board.launch(&[Some(BigInt::from(5))]);
//! assert_eq!(board.bullets().len(), 1);
//!
//! board.tick(); // bullet advances to (1, 0)
//! board.tick(); // bullet advances onto the halt cell
//! let report = board.tick(); // halt fires at the start of this tick
//!
//! assert!(report.halted);
//! assert!(board.bullets().is_empty());
//! ```

#![deny(unsafe_code)]

pub mod board;
pub mod bullet;
pub mod collision;
pub mod coordinate;
pub mod direction;
pub mod node;
pub mod report;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::board::Board;
    pub use crate::bullet::{Bullet, BulletMovement, Movement};
    pub use crate::collision::{partition, Collision, CollisionReport};
    pub use crate::coordinate::Coordinate;
    pub use crate::direction::Direction;
    pub use crate::node::{Node, NodeKind, Routes};
    pub use crate::report::TickReport;
    pub use num_bigint::BigInt;
}
