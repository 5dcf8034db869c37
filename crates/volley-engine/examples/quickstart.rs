//! End-to-end tour: build a small program in code, run it, trace it, verify it.
//!
//! Run with:
//!   cargo run --example quickstart -p volley-engine
//!
//! The program splits each input into three copies: the upward copy is
//! discarded by a void node, the downward copy is relayed off the bottom
//! edge as an output, and the straight-ahead copy runs through an if-zero
//! gate -- zeros deflect down into the halt node, everything else is relayed
//! off the right edge as a second output. Set RUST_LOG=debug to watch the
//! tick engine's internal logging.

use volley_engine::prelude::*;

fn build_board() -> Board {
    let mut board = Board::new(4, 3);

    // Input feeds rightward into the splitter.
    board.place_node(
        Coordinate::new(0, 1),
        Node::new(NodeKind::input(Some(0)), Direction::Right),
    );
    board.place_node(
        Coordinate::new(1, 1),
        Node::new(NodeKind::Splitter, Direction::Up),
    );

    // The upward copy is discarded; the downward one is relayed off the
    // bottom edge.
    board.place_node(Coordinate::new(1, 0), Node::new(NodeKind::Void, Direction::Up));
    board.place_node(
        Coordinate::new(1, 2),
        Node::new(NodeKind::Branch, Direction::Down),
    );

    // The straight-ahead copy runs through an if-zero gate: zeros deflect
    // down into the halt node, everything else is relayed off the right
    // edge.
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

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let inputs = parse_inputs("42")?;

    // Run once with the playback runner.
    let mut runner = Runner::new(build_board());
    runner.start(&inputs);
    let summary = runner.fast_forward(DEFAULT_FAST_FORWARD_LIMIT);

    println!("stopped after {} ticks: {:?}", summary.ticks_run, summary.reason);
    println!("outputs: {:?}", runner.outputs());

    // A zero input takes the deflection path into the halt node instead.
    runner.start(&parse_inputs("0")?);
    let summary = runner.fast_forward(DEFAULT_FAST_FORWARD_LIMIT);
    println!(
        "zero input stopped after {} ticks: {:?}, halted: {}",
        summary.ticks_run,
        summary.reason,
        runner.is_halted()
    );

    // Run again under a trace recorder, then prove the run reproduces.
    let mut board = build_board();
    let mut recorder = TraceRecorder::new(board_to_doc(&board), inputs.clone(), 1);
    board.launch(&inputs);

    let mut tick = 0;
    loop {
        let report = board.tick();
        tick += 1;
        recorder.record_tick(tick, &report, Some(board_digest(&board)));
        if report.halted || board.bullets().is_empty() {
            break;
        }
    }

    let trace = recorder.finish();
    println!("trace: {} ticks, {} entries", trace.total_ticks, trace.entries.len());

    let result = verify(&trace)?;
    println!(
        "verification {} after {} ticks",
        if result.completed { "passed" } else { "FAILED" },
        result.ticks_replayed
    );

    Ok(())
}
