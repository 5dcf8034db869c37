//! Playback runner tests over small programs.

use std::cell::Cell;

use volley_engine::prelude::*;

fn big(v: i64) -> Option<BigInt> {
    Some(BigInt::from(v))
}

/// Input at (0, 0) firing right, branch relay at (1, 0), halt at (2, 0).
fn relay_to_halt() -> Board {
    let mut board = Board::new(3, 1);
    board.place_node(
        Coordinate::new(0, 0),
        Node::new(NodeKind::input(Some(0)), Direction::Right),
    );
    board.place_node(
        Coordinate::new(1, 0),
        Node::new(NodeKind::Branch, Direction::Right),
    );
    board.place_node(
        Coordinate::new(2, 0),
        Node::new(NodeKind::Halt, Direction::Up),
    );
    board
}

/// A 2x1 relay whose bullet exits the right edge.
fn relay_to_edge() -> Board {
    let mut board = Board::new(2, 1);
    board.place_node(
        Coordinate::new(0, 0),
        Node::new(NodeKind::input(Some(0)), Direction::Right),
    );
    board.place_node(
        Coordinate::new(1, 0),
        Node::new(NodeKind::Branch, Direction::Right),
    );
    board
}

// -- 1. stepping -------------------------------------------------------------

#[test]
fn step_accumulates_outputs_and_latches_halt() {
    let mut runner = Runner::new(relay_to_halt());
    runner.start(&[big(7)]);

    assert!(!runner.is_halted());
    runner.step();
    runner.step();
    assert!(!runner.is_halted());

    let report = runner.step();
    assert!(report.halted);
    assert!(runner.is_halted());
    assert!(runner.is_drained());
    assert_eq!(runner.ticks(), 3);
    assert!(runner.outputs().is_empty());
}

// -- 2. fast-forward ---------------------------------------------------------

#[test]
fn fast_forward_stops_on_halt() {
    let mut runner = Runner::new(relay_to_halt());
    runner.start(&[big(7)]);

    let summary = runner.fast_forward(DEFAULT_FAST_FORWARD_LIMIT);
    assert_eq!(summary.reason, StopReason::Halted);
    assert_eq!(summary.ticks_run, 3);
}

#[test]
fn fast_forward_stops_when_drained() {
    let mut runner = Runner::new(relay_to_edge());
    runner.start(&[big(5)]);

    let summary = runner.fast_forward(DEFAULT_FAST_FORWARD_LIMIT);
    assert_eq!(summary.reason, StopReason::Drained);
    assert_eq!(runner.outputs(), &[big(5)]);
}

#[test]
fn fast_forward_respects_the_tick_limit() {
    // Two opposing branches trap the launched bullet in a perpetual bounce,
    // so only the limit can stop the loop.
    let mut board = Board::new(3, 3);
    board.place_node(
        Coordinate::new(0, 0),
        Node::new(NodeKind::input(Some(0)), Direction::Down),
    );
    board.place_node(
        Coordinate::new(0, 2),
        Node::new(NodeKind::Branch, Direction::Up),
    );
    board.place_node(
        Coordinate::new(0, 1),
        Node::new(NodeKind::Branch, Direction::Down),
    );
    // The bullet drops to (0, 1), gets routed down to (0, 2), gets routed
    // back up, and cycles between the two branch cells from then on.
    let mut runner = Runner::new(board);
    runner.start(&[big(1)]);

    let summary = runner.fast_forward(10);
    assert_eq!(summary.reason, StopReason::LimitReached);
    assert_eq!(summary.ticks_run, 10);
}

#[test]
fn fast_forward_cancellation_is_checked_between_ticks() {
    let mut runner = Runner::new(relay_to_halt());
    runner.start(&[big(7)]);

    let calls = Cell::new(0u32);
    let summary = runner.fast_forward_until(DEFAULT_FAST_FORWARD_LIMIT, || {
        calls.set(calls.get() + 1);
        calls.get() > 2
    });
    assert_eq!(summary.reason, StopReason::Cancelled);
    assert_eq!(summary.ticks_run, 2);
    // The run is resumable: the remaining tick halts it.
    let summary = runner.fast_forward(DEFAULT_FAST_FORWARD_LIMIT);
    assert_eq!(summary.reason, StopReason::Halted);
}

#[test]
fn fast_forward_on_an_empty_board_is_a_noop() {
    let mut runner = Runner::new(Board::new(2, 2));
    let summary = runner.fast_forward(100);
    assert_eq!(summary.reason, StopReason::Drained);
    assert_eq!(summary.ticks_run, 0);
}

// -- 3. reset and restart ----------------------------------------------------

#[test]
fn reset_returns_to_the_pre_launch_state() {
    let mut runner = Runner::new(relay_to_edge());
    runner.start(&[big(5)]);
    runner.fast_forward(DEFAULT_FAST_FORWARD_LIMIT);
    assert!(!runner.outputs().is_empty());

    runner.reset();
    assert!(runner.outputs().is_empty());
    assert_eq!(runner.ticks(), 0);
    assert!(!runner.is_halted());
    assert!(runner.board().bullets().is_empty());
    // Placements survive a reset.
    assert_eq!(runner.board().node_count(), 2);
}

#[test]
fn restarting_a_run_reproduces_it() {
    let mut runner = Runner::new(relay_to_edge());

    runner.start(&[big(8)]);
    runner.fast_forward(DEFAULT_FAST_FORWARD_LIMIT);
    let first = runner.outputs().to_vec();

    runner.start(&[big(8)]);
    runner.fast_forward(DEFAULT_FAST_FORWARD_LIMIT);
    assert_eq!(runner.outputs(), first.as_slice());
}

#[test]
fn start_clears_the_previous_runs_leftovers() {
    let mut runner = Runner::new(relay_to_halt());
    runner.start(&[big(1)]);
    runner.step();
    assert!(!runner.is_drained());

    runner.start(&[big(2)]);
    // Only the fresh launch bullet remains.
    assert_eq!(runner.board().bullets().len(), 1);
    assert_eq!(runner.board().bullets()[0].value, big(2));
    assert_eq!(runner.ticks(), 0);
}

// -- 4. a full splitter-and-gate program --------------------------------------

/// Input feeds a splitter; the upward copy is voided, the downward copy is
/// relayed off the bottom edge, and the straight copy runs through an
/// if-zero gate that deflects zeros into a halt node and relays everything
/// else off the right edge. Every hop lands on a node or off the board, so
/// no copy is lost to an empty cell mid-flight.
fn splitter_gate_board() -> Board {
    let mut board = Board::new(4, 3);
    board.place_node(
        Coordinate::new(0, 1),
        Node::new(NodeKind::input(Some(0)), Direction::Right),
    );
    board.place_node(
        Coordinate::new(1, 1),
        Node::new(NodeKind::Splitter, Direction::Up),
    );
    board.place_node(Coordinate::new(1, 0), Node::new(NodeKind::Void, Direction::Up));
    board.place_node(
        Coordinate::new(1, 2),
        Node::new(NodeKind::Branch, Direction::Down),
    );
    board.place_node(
        Coordinate::new(2, 1),
        Node::new(NodeKind::IfZero, Direction::Down),
    );
    board.place_node(Coordinate::new(2, 2), Node::new(NodeKind::Halt, Direction::Up));
    board.place_node(
        Coordinate::new(3, 1),
        Node::new(NodeKind::Branch, Direction::Right),
    );
    board
}

#[test]
fn gate_program_drains_with_both_outputs_on_nonzero_input() {
    let mut runner = Runner::new(splitter_gate_board());
    runner.start(&[big(42)]);

    let summary = runner.fast_forward(DEFAULT_FAST_FORWARD_LIMIT);
    assert_eq!(summary.reason, StopReason::Drained);
    assert!(!runner.is_halted());
    // The bottom-edge copy exits first, the gate-passing copy a tick later.
    assert_eq!(runner.outputs(), &[big(42), big(42)]);
}

#[test]
fn gate_program_halts_on_zero_input() {
    let mut runner = Runner::new(splitter_gate_board());
    runner.start(&[big(0)]);

    let summary = runner.fast_forward(DEFAULT_FAST_FORWARD_LIMIT);
    assert_eq!(summary.reason, StopReason::Halted);
    assert!(runner.is_halted());
    // Only the bottom-edge copy escaped; the zero went into the halt node.
    assert_eq!(runner.outputs(), &[big(0)]);
}
