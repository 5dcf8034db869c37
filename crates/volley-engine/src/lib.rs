//! Volley Engine -- the application-facing layer over [`volley_core`].
//!
//! Builds on the core tick engine with a playback [`Runner`](runner::Runner)
//! (launch / step / bounded fast-forward with cancellation), JSON board
//! persistence, and BLAKE3-digested run traces for determinism verification.
//!
//! # Quick Start
//!
//! ```
//! use volley_engine::prelude::*;
//!
//! let mut board = Board::new(2, 1);
//! board.place_node(
//!     Coordinate::new(0, 0),
//!     Node::new(NodeKind::input(Some(0)), Direction::Right),
//! );
//! board.place_node(
//!     Coordinate::new(1, 0),
//!     Node::new(NodeKind::Branch, Direction::Right),
//! );
//!
//! let mut runner = Runner::new(board);
//! runner.start(&parse_inputs("5").unwrap());
//! let summary = runner.fast_forward(100);
//!
//! assert_eq!(summary.reason, StopReason::Drained);
//! assert_eq!(runner.outputs(), &[Some(BigInt::from(5))]);
//! ```

#![deny(unsafe_code)]

pub mod persist;
pub mod runner;
pub mod trace;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the core crate for convenience.
pub use volley_core;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    // Re-export everything from the core prelude.
    pub use volley_core::prelude::*;

    // Engine-specific exports.
    pub use crate::persist::{
        board_from_doc, board_to_doc, load_board, save_board, BoardDoc, CoordinateDoc, LoadError,
        NodePlacementDoc,
    };
    pub use crate::runner::{
        parse_inputs, InputParseError, RunSummary, Runner, StopReason,
        DEFAULT_FAST_FORWARD_LIMIT,
    };
    pub use crate::trace::{
        board_digest, verify, RunTrace, TraceDivergence, TraceEntry, TraceRecorder, VerifyResult,
    };
}
