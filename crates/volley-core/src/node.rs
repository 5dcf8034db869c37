//! The closed node variant set and its processing contract.
//!
//! A node is a fixed grid cell behavior: given an incoming bullet (direction
//! expressed in the node's own frame, plus an optional value) it yields zero
//! or more outgoing `(relative direction, value)` routes. Routing is total --
//! every `(direction, value)` pair maps to some route set, never an error.
//!
//! [`Node::process`] and [`Node::initialize`] are pure functions of their
//! arguments and the node's own internal counters; they never reach into the
//! board. The board owns every node through its coordinate map, so per-node
//! state (an input latch, a list cursor) is mutated only through board
//! accessors and is never aliased.

use std::collections::BTreeMap;

use num_bigint::{BigInt, Sign};
use serde::Serialize;

use crate::direction::Direction;

/// The routes a node emits for one incoming bullet, keyed by node-relative
/// direction.
///
/// A `BTreeMap` for two reasons: at most one route per direction (later
/// inserts overwrite, which is how the input node's latched value wins over
/// a pass-through on the same key), and iteration in canonical direction
/// order, which fixes emitted-bullet order.
pub type Routes = BTreeMap<Direction, Option<BigInt>>;

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// Every node behavior the simulator supports.
///
/// A closed set dispatched by pattern matching: adding a node type is a
/// localized change and the compiler checks exhaustiveness everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    /// Absorbs everything; a bullet resting here at the start of a tick
    /// halts the whole board.
    Halt,
    /// Absorbs everything, emits nothing.
    Void,
    /// Routes every bullet out the node's facing.
    Branch,
    /// One bullet in, three bullets out: every direction except straight
    /// back where the bullet came from, each carrying the incoming value.
    Splitter,
    /// Redirects bullets whose value is exactly zero out the facing; all
    /// other bullets pass through unaffected.
    IfZero,
    /// Redirects empty bullets out the facing; all other bullets pass
    /// through unaffected.
    IfNull,
    /// Redirects bullets with value greater than zero out the facing; all
    /// other bullets (including empty ones) pass through unaffected.
    IfPositive,
    /// Emits a program input at launch and re-emits it whenever a bullet
    /// passes through. `index: None` means the node fires an empty bullet.
    In {
        index: Option<usize>,
        /// The value latched from the program inputs at launch.
        latched: Option<BigInt>,
    },
    /// Captures the whole program input list at launch and deals one value
    /// per triggering bullet, advancing a cursor. Empty once exhausted.
    List {
        captured: Vec<Option<BigInt>>,
        cursor: usize,
    },
}

impl NodeKind {
    /// An input node for the given program-input index.
    pub fn input(index: Option<usize>) -> NodeKind {
        NodeKind::In {
            index,
            latched: None,
        }
    }

    /// A list node with an empty capture.
    pub fn list() -> NodeKind {
        NodeKind::List {
            captured: Vec::new(),
            cursor: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A placed node: a behavior plus an absolute facing.
///
/// The facing is what relative `Up` routes point along; it is mutated only
/// through [`rotate_cw`](Self::rotate_cw) / [`rotate_ccw`](Self::rotate_ccw).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    kind: NodeKind,
    direction: Direction,
}

impl Node {
    pub fn new(kind: NodeKind, direction: Direction) -> Node {
        Node { kind, direction }
    }

    /// The node's absolute facing.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The node's behavior variant.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Whether this node triggers a board-wide halt when a bullet rests on it.
    pub fn is_halt(&self) -> bool {
        matches!(self.kind, NodeKind::Halt)
    }

    /// Rotate the facing one quarter turn clockwise.
    pub fn rotate_cw(&mut self) {
        self.direction = self.direction.rotate_cw();
    }

    /// Rotate the facing one quarter turn anticlockwise.
    pub fn rotate_ccw(&mut self) {
        self.direction = self.direction.rotate_ccw();
    }

    /// The stable tag identifying this node type in board documents.
    pub fn type_tag(&self) -> &'static str {
        match self.kind {
            NodeKind::Halt => "halt",
            NodeKind::Void => "void",
            NodeKind::Branch => "branch",
            NodeKind::Splitter => "splitter",
            NodeKind::IfZero => "branch if zero",
            NodeKind::IfNull => "branch if null",
            NodeKind::IfPositive => "branch if positive",
            NodeKind::In { .. } => "input",
            NodeKind::List { .. } => "list",
        }
    }

    /// A short human-readable description of the node's behavior.
    pub fn description(&self) -> &'static str {
        match self.kind {
            NodeKind::Halt => "Stops the program when a bullet lands on it",
            NodeKind::Void => "Blocks bullets",
            NodeKind::Branch => "Redirects all bullets out its facing",
            NodeKind::Splitter => "A bullet in one side produces 3 bullets in the others",
            NodeKind::IfZero => {
                "Redirects all zero bullets. Other bullets pass through unaffected"
            }
            NodeKind::IfNull => {
                "Redirects all empty bullets. Other bullets pass through unaffected"
            }
            NodeKind::IfPositive => {
                "Redirects all values larger than zero. Other bullets pass through unaffected"
            }
            NodeKind::In { .. } => {
                "Provides input at program start and every time a bullet passes through"
            }
            NodeKind::List { .. } => {
                "Every time a bullet comes in, outputs the next value in the input list"
            }
        }
    }

    /// Transform one incoming bullet into outgoing routes.
    ///
    /// `incoming` is the bullet's heading expressed in this node's frame
    /// (see [`Direction::relative_to`]); the returned keys are likewise
    /// relative, with `Up` meaning "out the facing". Total: every input pair
    /// produces a route set (possibly empty), never an error.
    pub fn process(&mut self, incoming: Direction, value: Option<BigInt>) -> Routes {
        match &mut self.kind {
            NodeKind::Halt | NodeKind::Void => Routes::new(),
            NodeKind::Branch => {
                let mut routes = Routes::new();
                routes.insert(Direction::Up, value);
                routes
            }
            NodeKind::Splitter => {
                // Fan out everywhere except straight back where the bullet
                // came from; the node's own facing plays no part.
                incoming
                    .inverse()
                    .others()
                    .into_iter()
                    .map(|direction| (direction, value.clone()))
                    .collect()
            }
            NodeKind::IfZero => conditional_routes(incoming, value, |value| {
                matches!(value, Some(v) if v.sign() == Sign::NoSign)
            }),
            NodeKind::IfNull => conditional_routes(incoming, value, |value| value.is_none()),
            NodeKind::IfPositive => conditional_routes(incoming, value, |value| {
                matches!(value, Some(v) if v.sign() == Sign::Plus)
            }),
            NodeKind::In { latched, .. } => {
                let mut routes = Routes::new();
                routes.insert(incoming, value);
                // On a key collision the latched input wins.
                routes.insert(Direction::Up, latched.clone());
                routes
            }
            NodeKind::List { captured, cursor } => {
                let next = captured.get(*cursor).cloned().flatten();
                *cursor += 1;
                let mut routes = Routes::new();
                routes.insert(incoming, value);
                routes.insert(Direction::Up, next);
                routes
            }
        }
    }

    /// Launch-time emission, called once per run before any tick.
    ///
    /// Input nodes latch their program input and emit the run's initial
    /// bullet; list nodes capture the input list silently; every other
    /// variant emits nothing.
    pub fn initialize(
        &mut self,
        inputs: &[Option<BigInt>],
    ) -> Option<(Direction, Option<BigInt>)> {
        match &mut self.kind {
            NodeKind::In { index, latched } => {
                *latched = index.and_then(|i| inputs.get(i).cloned()).flatten();
                Some((Direction::Up, latched.clone()))
            }
            NodeKind::List { captured, cursor } => {
                *captured = inputs.to_vec();
                *cursor = 0;
                None
            }
            _ => None,
        }
    }

    /// Clear internal counters without touching placement or rotation.
    ///
    /// Rewinds the list cursor; everything else (including the input latch)
    /// is untouched.
    pub fn reset(&mut self) {
        if let NodeKind::List { cursor, .. } = &mut self.kind {
            *cursor = 0;
        }
    }
}

/// Shared shape of the three conditional variants: redirect out the facing
/// when the predicate holds, otherwise pass straight through unchanged.
fn conditional_routes(
    incoming: Direction,
    value: Option<BigInt>,
    predicate: impl Fn(&Option<BigInt>) -> bool,
) -> Routes {
    let mut routes = Routes::new();
    if predicate(&value) {
        routes.insert(Direction::Up, value);
    } else {
        routes.insert(incoming, value);
    }
    routes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
