//! Run traces with BLAKE3 checkpoints for determinism verification.
//!
//! A [`TraceRecorder`] captures a run -- the board document, the program
//! inputs, each tick's outputs, and periodic digests of the full live board
//! state -- into a [`RunTrace`]. The trace is plain serde data, suitable for
//! regression fixtures. [`verify`] then replays the trace from scratch:
//! it rebuilds the board from the document, re-launches the inputs, re-runs
//! every tick, and compares outputs and digests, reporting the first
//! divergence instead of erroring on mismatch.
//!
//! # Recording
//!
//! ```
//! use volley_engine::prelude::*;
//!
//! let mut board = Board::new(2, 1);
//! board.place_node(
//!     Coordinate::new(0, 0),
//!     Node::new(NodeKind::input(Some(0)), Direction::Right),
//! );
//!
//! let inputs = parse_inputs("9").unwrap();
//! let mut recorder = TraceRecorder::new(board_to_doc(&board), inputs.clone(), 1);
//!
//! board.launch(&inputs);
//! let mut tick = 0;
//! while !board.bullets().is_empty() {
//!     let report = board.tick();
//!     tick += 1;
//!     recorder.record_tick(tick, &report, Some(board_digest(&board)));
//! }
//!
//! let trace = recorder.finish();
//! let result = verify(&trace).unwrap();
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! ```

use std::collections::BTreeMap;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use volley_core::board::Board;
use volley_core::bullet::Bullet;
use volley_core::coordinate::Coordinate;
use volley_core::node::Node;
use volley_core::report::TickReport;

use crate::persist::{board_from_doc, BoardDoc};

// ---------------------------------------------------------------------------
// board_digest
// ---------------------------------------------------------------------------

/// BLAKE3 hex digest of the full live board state.
///
/// Covers dimensions, placements *with* runtime node state (input latches,
/// list cursors), and the live bullets. The encoding is canonical: nodes in
/// row-major order, bullets in insertion order, so equal states always
/// digest equally.
pub fn board_digest(board: &Board) -> String {
    #[derive(Serialize)]
    struct HashableBoard<'a> {
        width: u32,
        height: u32,
        nodes: Vec<(&'a Coordinate, &'a Node)>,
        bullets: &'a [Bullet],
    }

    let hashable = HashableBoard {
        width: board.width(),
        height: board.height(),
        nodes: board.nodes().collect(),
        bullets: board.bullets(),
    };

    let json_bytes = serde_json::to_vec(&hashable)
        .expect("live board state should always be JSON-serializable");

    blake3::hash(&json_bytes).to_hex().to_string()
}

// ---------------------------------------------------------------------------
// RunTrace
// ---------------------------------------------------------------------------

/// A complete recorded run: starting board document, program inputs, and an
/// ordered sequence of outputs and checkpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTrace {
    /// The board document the run started from. Verification rebuilds the
    /// board from this, so runtime state never leaks into a trace.
    pub board: BoardDoc,
    /// The program inputs passed at launch.
    pub inputs: Vec<Option<BigInt>>,
    /// The tick number of the last recorded tick; verification replays
    /// ticks `1..=total_ticks`.
    pub total_ticks: u64,
    /// Ordered sequence of trace entries.
    pub entries: Vec<TraceEntry>,
}

/// A single entry in a [`RunTrace`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceEntry {
    /// The values a tick emitted. Quiet ticks are not recorded.
    Outputs {
        tick: u64,
        values: Vec<Option<BigInt>>,
    },
    /// A BLAKE3 digest of the board state after the given tick.
    Checkpoint { tick: u64, digest: String },
}

// ---------------------------------------------------------------------------
// TraceRecorder
// ---------------------------------------------------------------------------

/// Records a run into a [`RunTrace`].
///
/// Call [`record_tick`](Self::record_tick) after executing each tick,
/// numbering ticks from 1. The recorder keeps only non-empty outputs and
/// interval-aligned checkpoints, so quiet stretches cost nothing.
pub struct TraceRecorder {
    trace: RunTrace,
    /// How often (in ticks) to keep a provided digest. 0 means "keep every
    /// provided digest".
    checkpoint_interval: u64,
    /// The tick number of the last `record_tick` call, enforcing monotonic
    /// ordering. `None` before the first call.
    last_tick: Option<u64>,
}

impl TraceRecorder {
    pub fn new(board: BoardDoc, inputs: Vec<Option<BigInt>>, checkpoint_interval: u64) -> Self {
        TraceRecorder {
            trace: RunTrace {
                board,
                inputs,
                total_ticks: 0,
                entries: Vec::new(),
            },
            checkpoint_interval,
            last_tick: None,
        }
    }

    /// Record one executed tick.
    ///
    /// `digest` is the board digest *after* the tick; pass `None` to skip
    /// checkpointing regardless of the interval.
    ///
    /// # Panics
    ///
    /// Panics if `tick` is zero or not strictly greater than the previously
    /// recorded tick.
    pub fn record_tick(&mut self, tick: u64, report: &TickReport, digest: Option<String>) {
        assert!(tick > 0, "trace ticks are numbered from 1");
        if let Some(prev) = self.last_tick {
            assert!(
                tick > prev,
                "record_tick: tick {tick} is not strictly greater than previous tick {prev}"
            );
        }
        self.last_tick = Some(tick);

        if !report.outputs.is_empty() {
            self.trace.entries.push(TraceEntry::Outputs {
                tick,
                values: report.outputs.clone(),
            });
        }

        if let Some(digest) = digest {
            let aligned = self.checkpoint_interval == 0 || tick % self.checkpoint_interval == 0;
            if aligned {
                self.trace.entries.push(TraceEntry::Checkpoint { tick, digest });
            }
        }
    }

    /// Finish recording and return the completed trace.
    pub fn finish(mut self) -> RunTrace {
        self.trace.total_ticks = self.last_tick.unwrap_or(0);
        self.trace
    }
}

// ---------------------------------------------------------------------------
// verify()
// ---------------------------------------------------------------------------

/// Details about a determinism failure detected during verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceDivergence {
    /// A tick emitted different outputs than the trace recorded.
    Outputs {
        tick: u64,
        expected: Vec<Option<BigInt>>,
        actual: Vec<Option<BigInt>>,
    },
    /// A checkpoint digest did not match the replayed board state.
    Digest {
        tick: u64,
        expected: String,
        actual: String,
    },
}

/// The outcome of verifying a [`RunTrace`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResult {
    /// Whether the replay ran all recorded ticks without diverging.
    pub completed: bool,
    /// Ticks replayed, including the diverging one if any.
    pub ticks_replayed: u64,
    /// The first mismatch, or `None` if the run reproduced exactly.
    pub first_divergence: Option<TraceDivergence>,
}

/// Replay a trace from its board document and compare every tick's outputs
/// plus each checkpoint digest.
///
/// A mismatch is a *result* ([`VerifyResult::first_divergence`]), not an
/// error; verification stops at the first one. Errors are reserved for
/// malformed traces: an undecodable board document, duplicate entries for
/// one tick, or entries beyond `total_ticks`. All validation happens before
/// any replay work.
pub fn verify(trace: &RunTrace) -> Result<VerifyResult, anyhow::Error> {
    // Index the entries, rejecting duplicates and stragglers.
    let mut outputs_map: BTreeMap<u64, &Vec<Option<BigInt>>> = BTreeMap::new();
    let mut checkpoint_map: BTreeMap<u64, &String> = BTreeMap::new();

    for entry in &trace.entries {
        match entry {
            TraceEntry::Outputs { tick, values } => {
                if outputs_map.insert(*tick, values).is_some() {
                    return Err(anyhow::anyhow!(
                        "trace contains duplicate Outputs entry at tick {tick}"
                    ));
                }
            }
            TraceEntry::Checkpoint { tick, digest } => {
                if checkpoint_map.insert(*tick, digest).is_some() {
                    return Err(anyhow::anyhow!(
                        "trace contains duplicate Checkpoint entry at tick {tick}"
                    ));
                }
            }
        }
    }
    let last_entry_tick = outputs_map
        .keys()
        .chain(checkpoint_map.keys())
        .max()
        .copied()
        .unwrap_or(0);
    if last_entry_tick > trace.total_ticks {
        return Err(anyhow::anyhow!(
            "trace entry at tick {last_entry_tick} lies beyond total_ticks {}",
            trace.total_ticks
        ));
    }

    let mut board = board_from_doc(&trace.board)
        .map_err(|e| anyhow::anyhow!("cannot decode board document for verification: {e}"))?;
    board.launch(&trace.inputs);

    let mut ticks_replayed = 0;
    for tick in 1..=trace.total_ticks {
        let report = board.tick();
        ticks_replayed += 1;

        let expected_outputs = outputs_map.get(&tick).map(|v| v.as_slice()).unwrap_or(&[]);
        if report.outputs != expected_outputs {
            return Ok(VerifyResult {
                completed: false,
                ticks_replayed,
                first_divergence: Some(TraceDivergence::Outputs {
                    tick,
                    expected: expected_outputs.to_vec(),
                    actual: report.outputs,
                }),
            });
        }

        if let Some(expected) = checkpoint_map.get(&tick) {
            let actual = board_digest(&board);
            if actual != **expected {
                return Ok(VerifyResult {
                    completed: false,
                    ticks_replayed,
                    first_divergence: Some(TraceDivergence::Digest {
                        tick,
                        expected: (*expected).clone(),
                        actual,
                    }),
                });
            }
        }
    }

    Ok(VerifyResult {
        completed: true,
        ticks_replayed,
        first_divergence: None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
