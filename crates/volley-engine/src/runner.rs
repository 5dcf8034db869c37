//! Playback driver: launch, single-step, and bounded fast-forward.
//!
//! The [`Runner`] owns a [`Board`] and the run state accumulated on top of
//! it: the output stream, the tick count, and the latched halt flag. Ticks
//! are atomic -- fast-forward never aborts mid-tick; cancellation is checked
//! between ticks and surfaced as [`StopReason::Cancelled`].
//!
//! ```
//! use volley_engine::prelude::*;
//!
//! let mut board = Board::new(1, 1);
//! board.place_node(
//!     Coordinate::new(0, 0),
//!     Node::new(NodeKind::input(Some(0)), Direction::Right),
//! );
//!
//! let mut runner = Runner::new(board);
//! runner.start(&parse_inputs("42").unwrap());
//! let summary = runner.fast_forward(DEFAULT_FAST_FORWARD_LIMIT);
//!
//! assert_eq!(summary.reason, StopReason::Drained);
//! assert_eq!(runner.outputs(), &[Some(BigInt::from(42))]);
//! ```

use num_bigint::BigInt;

use volley_core::board::Board;
use volley_core::report::TickReport;

/// The fast-forward tick bound used by playback UIs.
pub const DEFAULT_FAST_FORWARD_LIMIT: u64 = 1_000_000;

// ---------------------------------------------------------------------------
// InputParseError
// ---------------------------------------------------------------------------

/// A program-input token that is not an integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid input token '{token}' at position {position}: expected an integer")]
pub struct InputParseError {
    pub token: String,
    pub position: usize,
}

/// Parse a space-separated list of arbitrary-precision integers, the format
/// playback UIs collect program inputs in.
pub fn parse_inputs(text: &str) -> Result<Vec<Option<BigInt>>, InputParseError> {
    text.split_whitespace()
        .enumerate()
        .map(|(position, token)| {
            token
                .parse::<BigInt>()
                .map(Some)
                .map_err(|_| InputParseError {
                    token: token.to_owned(),
                    position,
                })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// StopReason / RunSummary
// ---------------------------------------------------------------------------

/// Why a fast-forward loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A halt node wiped the board.
    Halted,
    /// No bullets remain; the program has nothing left to do.
    Drained,
    /// The tick bound was reached with the program still running.
    LimitReached,
    /// The caller's cancellation check fired between ticks.
    Cancelled,
}

/// The outcome of a fast-forward loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks executed by this loop (not the runner's lifetime total).
    pub ticks_run: u64,
    pub reason: StopReason,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Drives a board through a run: `start` once, then `step` or
/// `fast_forward` until halted or drained.
///
/// The board is owned exclusively; there is at most one tick in flight at a
/// time by construction. Concurrent drivers must treat a runner as a single
/// critical section.
pub struct Runner {
    board: Board,
    outputs: Vec<Option<BigInt>>,
    ticks: u64,
    halted: bool,
}

impl Runner {
    pub fn new(board: Board) -> Runner {
        Runner {
            board,
            outputs: Vec::new(),
            ticks: 0,
            halted: false,
        }
    }

    /// Begin a run: node state and any previous run's bullets and outputs
    /// are cleared, then the program's initial bullets are launched.
    pub fn start(&mut self, inputs: &[Option<BigInt>]) {
        tracing::info!(inputs = inputs.len(), "starting run");
        self.reset();
        self.board.launch(inputs);
    }

    /// Execute one tick, folding its outputs and halt flag into the run
    /// state. The report is returned for visualization.
    pub fn step(&mut self) -> TickReport {
        let report = self.board.tick();
        self.outputs.extend(report.outputs.iter().cloned());
        if report.halted {
            self.halted = true;
        }
        self.ticks += 1;
        report
    }

    /// Run up to `limit` ticks, stopping early when the program halts or
    /// drains.
    pub fn fast_forward(&mut self, limit: u64) -> RunSummary {
        self.fast_forward_until(limit, || false)
    }

    /// Like [`fast_forward`](Self::fast_forward), with a cancellation check
    /// evaluated between ticks. A tick is never aborted mid-flight; a
    /// cancellation surfaces after the tick that preceded it completes.
    pub fn fast_forward_until(
        &mut self,
        limit: u64,
        mut cancelled: impl FnMut() -> bool,
    ) -> RunSummary {
        let mut ticks_run = 0;
        let reason = loop {
            if self.halted {
                break StopReason::Halted;
            }
            if self.board.bullets().is_empty() {
                break StopReason::Drained;
            }
            if ticks_run >= limit {
                break StopReason::LimitReached;
            }
            if cancelled() {
                break StopReason::Cancelled;
            }
            self.step();
            ticks_run += 1;
        };
        tracing::debug!(ticks_run, ?reason, "fast-forward stopped");
        RunSummary { ticks_run, reason }
    }

    /// Return to the pre-launch state: outputs, bullets, the tick counter,
    /// and node-internal state are cleared; placements are untouched.
    pub fn reset(&mut self) {
        self.board.reset_nodes();
        self.board.clear_bullets();
        self.outputs.clear();
        self.ticks = 0;
        self.halted = false;
    }

    // -- accessors ----------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for editors between runs. Structural edits made
    /// mid-run are the caller's responsibility.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    /// The output stream accumulated since `start`, in emission order.
    pub fn outputs(&self) -> &[Option<BigInt>] {
        &self.outputs
    }

    /// Ticks executed since `start`.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Whether no bullets remain on the board.
    pub fn is_drained(&self) -> bool {
        self.board.bullets().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
