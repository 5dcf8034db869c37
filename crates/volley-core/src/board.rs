//! The board: node and bullet storage plus the tick engine.
//!
//! [`Board::tick`] advances the simulation by one discrete step. The phases
//! run in a fixed order, each exactly once per call:
//!
//! 1. **Halt check** -- a bullet resting on a halt node wipes every bullet
//!    before anything else happens this tick.
//! 2. **Node processing** -- each bullet sitting on a node is handed to that
//!    node; the next bullet set is built only from the emitted routes.
//! 3. **Movement computation** -- each surviving bullet proposes its next
//!    cell, in bullet order.
//! 4. **Collision resolution** -- [`partition`](crate::collision::partition)
//!    splits the movements into swap collisions, final collisions, and
//!    survivors.
//! 5. **Removal + advance** -- collided bullets vanish; survivors relocate.
//! 6. **Output extraction** -- bullets now outside the bounds leave the board
//!    and their values become this tick's outputs.
//!
//! The engine is synchronous and single-owner: a tick is atomic, the board's
//! storage is never aliased outside a call, and the same snapshot always
//! produces the same report.
//!
//! ```
//! use volley_core::prelude::*;
//!
//! let mut board = Board::new(4, 4);
//! board.place_node(
//!     Coordinate::new(0, 0),
//!     Node::new(NodeKind::input(None), Direction::Right),
//! );
//! board.launch(&[]);
//! let report = board.tick();
//! assert!(!report.halted);
//! ```

use std::collections::BTreeMap;

use num_bigint::BigInt;

use crate::bullet::{Bullet, BulletMovement};
use crate::collision;
use crate::coordinate::Coordinate;
use crate::direction::Direction;
use crate::node::Node;
use crate::report::TickReport;

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A fixed-size grid of nodes plus the live bullet set.
///
/// Dimensions are fixed at construction; resizing means building a new board
/// and re-placing nodes. Nodes live in a coordinate-indexed map owned solely
/// by the board, iterated in row-major order wherever order matters (launch,
/// serialization, digests).
#[derive(Debug, Clone)]
pub struct Board {
    width: u32,
    height: u32,
    nodes: BTreeMap<Coordinate, Node>,
    bullets: Vec<Bullet>,
}

impl Board {
    /// Create an empty board.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or exceeds `i32::MAX` (coordinates
    /// are `i32`).
    pub fn new(width: u32, height: u32) -> Board {
        assert!(
            width > 0 && height > 0,
            "board dimensions must be nonzero, got {width}x{height}"
        );
        assert!(
            width <= i32::MAX as u32 && height <= i32::MAX as u32,
            "board dimensions must fit in i32, got {width}x{height}"
        );
        Board {
            width,
            height,
            nodes: BTreeMap::new(),
            bullets: Vec::new(),
        }
    }

    // -- geometry -----------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the coordinate lies inside the board bounds.
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        coordinate.x >= 0
            && (coordinate.x as u32) < self.width
            && coordinate.y >= 0
            && (coordinate.y as u32) < self.height
    }

    // -- editor interface ---------------------------------------------------

    /// Place (or replace) a node.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the board.
    pub fn place_node(&mut self, coordinate: Coordinate, node: Node) {
        assert!(
            self.contains(coordinate),
            "node placement at {coordinate} is outside the {}x{} board",
            self.width,
            self.height
        );
        self.nodes.insert(coordinate, node);
    }

    /// Remove and return the node at the coordinate, if any.
    pub fn remove_node(&mut self, coordinate: Coordinate) -> Option<Node> {
        self.nodes.remove(&coordinate)
    }

    pub fn node_at(&self, coordinate: Coordinate) -> Option<&Node> {
        self.nodes.get(&coordinate)
    }

    pub fn node_at_mut(&mut self, coordinate: Coordinate) -> Option<&mut Node> {
        self.nodes.get_mut(&coordinate)
    }

    /// Rotate the node at the coordinate clockwise. Returns `false` if the
    /// cell is empty.
    pub fn rotate_node_cw(&mut self, coordinate: Coordinate) -> bool {
        match self.nodes.get_mut(&coordinate) {
            Some(node) => {
                node.rotate_cw();
                true
            }
            None => false,
        }
    }

    /// Rotate the node at the coordinate anticlockwise. Returns `false` if
    /// the cell is empty.
    pub fn rotate_node_ccw(&mut self, coordinate: Coordinate) -> bool {
        match self.nodes.get_mut(&coordinate) {
            Some(node) => {
                node.rotate_ccw();
                true
            }
            None => false,
        }
    }

    /// All placed nodes in row-major order.
    pub fn nodes(&self) -> impl Iterator<Item = (&Coordinate, &Node)> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Remove every node. Bullets are untouched.
    pub fn clear_nodes(&mut self) {
        self.nodes.clear();
    }

    /// Call [`Node::reset`] on every node, clearing internal counters
    /// without touching placement or rotation. Editors call this after
    /// structural edits and drivers call it when restarting a run.
    pub fn reset_nodes(&mut self) {
        for node in self.nodes.values_mut() {
            node.reset();
        }
    }

    // -- bullets ------------------------------------------------------------

    /// The live bullets, in insertion order.
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    /// Add a bullet to the live set.
    ///
    /// [`launch`](Self::launch) is the normal creation path; this exists for
    /// drivers and tests that set up mid-run states directly.
    pub fn spawn_bullet(&mut self, bullet: Bullet) {
        self.bullets.push(bullet);
    }

    /// Remove every bullet.
    pub fn clear_bullets(&mut self) {
        self.bullets.clear();
    }

    // -- launch -------------------------------------------------------------

    /// Emit the run's initial bullets from input-capable nodes.
    ///
    /// Every node's [`initialize`](Node::initialize) is called in row-major
    /// order; each emission becomes a bullet at that node's coordinate,
    /// heading `facing + relative`. Called once per run, before any tick.
    pub fn launch(&mut self, inputs: &[Option<BigInt>]) {
        let mut emissions = Vec::new();
        for (&coordinate, node) in self.nodes.iter_mut() {
            if let Some((relative, value)) = node.initialize(inputs) {
                emissions.push((coordinate, relative, value));
            }
        }
        tracing::debug!(bullets = emissions.len(), "launching program");
        for (coordinate, relative, value) in emissions {
            let bullet = self.bullet_from_node(coordinate, relative, value);
            self.bullets.push(bullet);
        }
    }

    // -- tick ---------------------------------------------------------------

    /// Advance the simulation by exactly one step.
    pub fn tick(&mut self) -> TickReport {
        let halted = self.try_halt();
        self.process_bullets();
        let movements = self.bullet_movements();
        let collisions = collision::partition(movements);

        // Survivors are exactly the uncollided movements, advanced in order;
        // collided bullets simply never re-enter the live set.
        self.bullets = collisions
            .remaining
            .iter()
            .map(|bm| bm.bullet.advanced_to(bm.movement.to))
            .collect();

        let outputs = self.drain_outputs();
        TickReport {
            collisions,
            outputs,
            halted,
        }
    }

    /// Phase 1: a bullet resting on a halt node wipes the whole board before
    /// any node gets to process this tick.
    fn try_halt(&mut self) -> bool {
        let tripped = self
            .bullets
            .iter()
            .any(|bullet| self.nodes.get(&bullet.coordinate).is_some_and(Node::is_halt));
        if tripped {
            tracing::debug!(cleared = self.bullets.len(), "halt node tripped");
            self.bullets.clear();
        }
        tripped
    }

    /// Phase 2: rebuild the bullet set from node emissions.
    ///
    /// Only bullets co-located with a node are carried forward; a bullet
    /// over an empty cell is dropped here. That is the reference behavior,
    /// preserved deliberately and pinned by the
    /// `bullets_over_empty_cells_are_dropped_by_node_processing` test.
    fn process_bullets(&mut self) {
        let incoming = std::mem::take(&mut self.bullets);
        let mut emissions = Vec::new();
        for bullet in incoming {
            let Some(node) = self.nodes.get_mut(&bullet.coordinate) else {
                continue;
            };
            let relative = bullet.direction.relative_to(node.direction());
            let routes = node.process(relative, bullet.value);
            for (direction, value) in routes {
                emissions.push((bullet.coordinate, direction, value));
            }
        }
        for (coordinate, relative, value) in emissions {
            let bullet = self.bullet_from_node(coordinate, relative, value);
            self.bullets.push(bullet);
        }
    }

    /// Convert a node emission (relative route) into an absolute bullet.
    ///
    /// # Panics
    ///
    /// Panics if no node exists at the coordinate. Emissions are only ever
    /// synthesized against occupied cells, so a miss means the board state
    /// was corrupted; dropping it silently would throw off collision
    /// accounting downstream.
    fn bullet_from_node(
        &self,
        coordinate: Coordinate,
        relative: Direction,
        value: Option<BigInt>,
    ) -> Bullet {
        let node = self.nodes.get(&coordinate).unwrap_or_else(|| {
            panic!("no node at {coordinate}: cannot convert a node emission into a bullet")
        });
        Bullet::new(coordinate, node.direction() + relative, value)
    }

    /// Phase 3: propose every bullet's next cell, in bullet order.
    fn bullet_movements(&self) -> Vec<BulletMovement> {
        self.bullets
            .iter()
            .cloned()
            .map(BulletMovement::propose)
            .collect()
    }

    /// Phase 6: bullets now outside the bounds leave the board; their values
    /// are this tick's outputs, in bullet order.
    fn drain_outputs(&mut self) -> Vec<Option<BigInt>> {
        let width = self.width;
        let height = self.height;
        let inside = |c: &Coordinate| {
            c.x >= 0 && (c.x as u32) < width && c.y >= 0 && (c.y as u32) < height
        };

        let mut outputs = Vec::new();
        let mut kept = Vec::with_capacity(self.bullets.len());
        for bullet in self.bullets.drain(..) {
            if inside(&bullet.coordinate) {
                kept.push(bullet);
            } else {
                outputs.push(bullet.value);
            }
        }
        self.bullets = kept;
        outputs
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
