//! Record-then-verify round trips for run traces.

use volley_engine::prelude::*;

fn big(v: i64) -> Option<BigInt> {
    Some(BigInt::from(v))
}

/// A splitter program with a few ticks of life and real outputs.
fn splitter_program() -> Board {
    let mut board = Board::new(3, 3);
    board.place_node(
        Coordinate::new(0, 1),
        Node::new(NodeKind::input(Some(0)), Direction::Right),
    );
    board.place_node(
        Coordinate::new(1, 1),
        Node::new(NodeKind::Splitter, Direction::Up),
    );
    board.place_node(
        Coordinate::new(2, 1),
        Node::new(NodeKind::Branch, Direction::Right),
    );
    board
}

/// Run the board to completion while recording every tick with the given
/// checkpoint interval.
fn record_run(board: &mut Board, inputs: &[Option<BigInt>], interval: u64) -> RunTrace {
    let mut recorder = TraceRecorder::new(board_to_doc(board), inputs.to_vec(), interval);
    board.launch(inputs);
    let mut tick = 0;
    while !board.bullets().is_empty() && tick < 100 {
        let report = board.tick();
        tick += 1;
        recorder.record_tick(tick, &report, Some(board_digest(board)));
    }
    recorder.finish()
}

// -- 1. faithful replay ------------------------------------------------------

#[test]
fn recorded_run_verifies_cleanly() {
    let mut board = splitter_program();
    let trace = record_run(&mut board, &[big(7)], 1);
    assert!(trace.total_ticks > 0);

    let result = verify(&trace).unwrap();
    assert!(result.completed);
    assert_eq!(result.ticks_replayed, trace.total_ticks);
    assert_eq!(result.first_divergence, None);
}

#[test]
fn trace_survives_a_serde_round_trip() {
    let mut board = splitter_program();
    let trace = record_run(&mut board, &[big(7)], 2);

    let json = serde_json::to_string(&trace).unwrap();
    let reloaded: RunTrace = serde_json::from_str(&json).unwrap();

    let result = verify(&reloaded).unwrap();
    assert!(result.completed);
}

#[test]
fn recorded_outputs_match_a_runner_replay() {
    let mut board = splitter_program();
    let trace = record_run(&mut board, &[big(7)], 1);

    let mut runner = Runner::new(board_from_doc(&trace.board).unwrap());
    runner.start(&trace.inputs);
    runner.fast_forward(DEFAULT_FAST_FORWARD_LIMIT);

    let traced_outputs: Vec<Option<BigInt>> = trace
        .entries
        .iter()
        .filter_map(|entry| match entry {
            TraceEntry::Outputs { values, .. } => Some(values.clone()),
            TraceEntry::Checkpoint { .. } => None,
        })
        .flatten()
        .collect();
    assert_eq!(runner.outputs(), traced_outputs.as_slice());
}

// -- 2. divergence detection -------------------------------------------------

#[test]
fn tampered_checkpoint_reports_a_digest_divergence() {
    let mut board = splitter_program();
    let mut trace = record_run(&mut board, &[big(7)], 1);

    // Corrupt the first checkpoint.
    let position = trace
        .entries
        .iter()
        .position(|e| matches!(e, TraceEntry::Checkpoint { .. }))
        .unwrap();
    if let TraceEntry::Checkpoint { digest, .. } = &mut trace.entries[position] {
        *digest = "0".repeat(64);
    }

    let result = verify(&trace).unwrap();
    assert!(!result.completed);
    match result.first_divergence {
        Some(TraceDivergence::Digest { tick, .. }) => assert_eq!(tick, 1),
        other => panic!("expected a digest divergence, got {other:?}"),
    }
}

#[test]
fn tampered_outputs_report_an_output_divergence() {
    let mut board = splitter_program();
    let mut trace = record_run(&mut board, &[big(7)], 0);

    let position = trace
        .entries
        .iter()
        .position(|e| matches!(e, TraceEntry::Outputs { .. }))
        .unwrap();
    if let TraceEntry::Outputs { values, .. } = &mut trace.entries[position] {
        values.push(big(999));
    }
    // Drop checkpoints so the output mismatch is what gets reported.
    trace
        .entries
        .retain(|e| !matches!(e, TraceEntry::Checkpoint { .. }));

    let result = verify(&trace).unwrap();
    assert!(!result.completed);
    assert!(matches!(
        result.first_divergence,
        Some(TraceDivergence::Outputs { .. })
    ));
}

#[test]
fn edited_board_document_diverges_at_the_first_checkpoint() {
    let mut board = splitter_program();
    let mut trace = record_run(&mut board, &[big(7)], 1);

    // Re-point the splitter's cell at a void node; outputs and digests no
    // longer reproduce.
    assert!(trace
        .entries
        .iter()
        .any(|e| matches!(e, TraceEntry::Checkpoint { .. })));
    trace.board.nodes[1].node = serde_json::json!({"type": "void", "rotation": 0});

    let result = verify(&trace).unwrap();
    assert!(!result.completed);
    assert!(result.first_divergence.is_some());
}
