//! Immutable per-tick summaries returned to the caller.

use num_bigint::BigInt;
use serde::Serialize;

use crate::collision::CollisionReport;

// ---------------------------------------------------------------------------
// TickReport
// ---------------------------------------------------------------------------

/// Everything one [`Board::tick`](crate::board::Board::tick) produced.
///
/// Plain data: drivers read `outputs` to accumulate the program's output
/// stream, `halted` to stop the run, and `collisions` for visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct TickReport {
    /// How this tick's movements collided (or didn't).
    pub collisions: CollisionReport,
    /// Values carried by bullets that exited the board this tick, in bullet
    /// order. `None` entries are ordinary empty-token outputs.
    pub outputs: Vec<Option<BigInt>>,
    /// Whether a bullet resting on a halt node wiped the board this tick.
    pub halted: bool,
}

impl TickReport {
    /// True when the tick produced nothing of note: no collisions, no
    /// outputs, no halt.
    pub fn is_quiet(&self) -> bool {
        self.collisions.is_empty() && self.outputs.is_empty() && !self.halted
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
