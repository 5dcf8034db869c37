//! JSON board persistence.
//!
//! A board serializes to `{width, height, nodes: [{coordinate, node}]}`.
//! Each node object carries its stable `"type"` tag, its `"rotation"` as a
//! quarter-turn count, and any type-specific fields (an input node's
//! `"index"`, a number or null). Runtime node state (input latches, list
//! cursors) and bullets are never persisted: loading always yields a
//! pristine board.
//!
//! Loading validates the whole document *before* constructing a board, so a
//! malformed document fails fast with a [`LoadError`] identifying the
//! offending node by array index and coordinate, and no partially-built
//! board escapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use volley_core::board::Board;
use volley_core::coordinate::Coordinate;
use volley_core::direction::Direction;
use volley_core::node::{Node, NodeKind};

// ---------------------------------------------------------------------------
// Wire documents
// ---------------------------------------------------------------------------

/// The persisted shape of a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDoc {
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<NodePlacementDoc>,
}

/// One placed node in a [`BoardDoc`].
///
/// The node payload stays a raw JSON object so loading can report precisely
/// which field of which node is missing or mistyped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodePlacementDoc {
    pub coordinate: CoordinateDoc,
    pub node: Value,
}

/// Wire form of a coordinate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoordinateDoc {
    pub x: i32,
    pub y: i32,
}

// ---------------------------------------------------------------------------
// LoadError
// ---------------------------------------------------------------------------

/// Errors produced while loading a persisted board.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The document is not valid JSON or misses the top-level shape.
    #[error("malformed board document: {details}")]
    Malformed { details: String },

    /// Width or height is unusable.
    #[error("invalid board dimensions {width}x{height}: both must be nonzero and fit in i32")]
    InvalidDimensions { width: u32, height: u32 },

    /// A node's `"type"` tag names no known node variant.
    #[error("node {index} at ({x}, {y}): unknown node type '{tag}'")]
    UnknownNodeType {
        index: usize,
        x: i32,
        y: i32,
        tag: String,
    },

    /// A node object misses a required field or carries the wrong JSON type.
    #[error("node {index} at ({x}, {y}): missing or mistyped field '{field}'")]
    InvalidField {
        index: usize,
        x: i32,
        y: i32,
        field: &'static str,
    },

    /// A node's rotation is not a quarter-turn count.
    #[error("node {index} at ({x}, {y}): rotation {rotation} out of range (expected 0..=3)")]
    InvalidRotation {
        index: usize,
        x: i32,
        y: i32,
        rotation: u64,
    },

    /// A node's coordinate lies outside the declared board.
    #[error("node {index} at ({x}, {y}): coordinate outside the {width}x{height} board")]
    OutOfBounds {
        index: usize,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    /// Two nodes claim the same cell.
    #[error("node {index} at ({x}, {y}): duplicate coordinate")]
    DuplicateCoordinate { index: usize, x: i32, y: i32 },
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

/// Serialize a board's placements to a JSON string.
pub fn save_board(board: &Board) -> String {
    serde_json::to_string(&board_to_doc(board))
        .expect("board documents should always be JSON-serializable")
}

/// Build the wire document for a board's placements.
///
/// Nodes appear in row-major order. Bullets and runtime node state are not
/// part of the document.
pub fn board_to_doc(board: &Board) -> BoardDoc {
    let nodes = board
        .nodes()
        .map(|(coordinate, node)| NodePlacementDoc {
            coordinate: CoordinateDoc {
                x: coordinate.x,
                y: coordinate.y,
            },
            node: node_to_value(node),
        })
        .collect();
    BoardDoc {
        width: board.width(),
        height: board.height(),
        nodes,
    }
}

fn node_to_value(node: &Node) -> Value {
    let mut object = serde_json::Map::new();
    object.insert("type".to_owned(), Value::from(node.type_tag()));
    object.insert(
        "rotation".to_owned(),
        Value::from(node.direction().quarters()),
    );
    if let NodeKind::In { index, .. } = node.kind() {
        object.insert(
            "index".to_owned(),
            match index {
                Some(i) => Value::from(*i as u64),
                None => Value::Null,
            },
        );
    }
    Value::Object(object)
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse and validate a persisted board.
///
/// Fails fast on the first problem; on success the board carries the
/// document's placements with pristine runtime state and no bullets.
pub fn load_board(json: &str) -> Result<Board, LoadError> {
    let doc: BoardDoc = serde_json::from_str(json).map_err(|e| LoadError::Malformed {
        details: e.to_string(),
    })?;
    board_from_doc(&doc)
}

/// Reconstruct a board from an already-parsed document.
pub fn board_from_doc(doc: &BoardDoc) -> Result<Board, LoadError> {
    if doc.width == 0
        || doc.height == 0
        || doc.width > i32::MAX as u32
        || doc.height > i32::MAX as u32
    {
        return Err(LoadError::InvalidDimensions {
            width: doc.width,
            height: doc.height,
        });
    }

    // Validate every placement before constructing the board.
    let mut placements: Vec<(Coordinate, Node)> = Vec::with_capacity(doc.nodes.len());
    for (index, placement) in doc.nodes.iter().enumerate() {
        let x = placement.coordinate.x;
        let y = placement.coordinate.y;
        let coordinate = Coordinate::new(x, y);

        if x < 0 || (x as u32) >= doc.width || y < 0 || (y as u32) >= doc.height {
            return Err(LoadError::OutOfBounds {
                index,
                x,
                y,
                width: doc.width,
                height: doc.height,
            });
        }
        if placements.iter().any(|(placed, _)| *placed == coordinate) {
            return Err(LoadError::DuplicateCoordinate { index, x, y });
        }

        let node = parse_node(&placement.node, index, x, y)?;
        placements.push((coordinate, node));
    }

    let mut board = Board::new(doc.width, doc.height);
    for (coordinate, node) in placements {
        board.place_node(coordinate, node);
    }
    tracing::debug!(
        width = board.width(),
        height = board.height(),
        nodes = board.node_count(),
        "board document loaded"
    );
    Ok(board)
}

fn parse_node(value: &Value, index: usize, x: i32, y: i32) -> Result<Node, LoadError> {
    let object = value.as_object().ok_or(LoadError::InvalidField {
        index,
        x,
        y,
        field: "node",
    })?;

    let tag = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(LoadError::InvalidField {
            index,
            x,
            y,
            field: "type",
        })?;

    let rotation = object
        .get("rotation")
        .and_then(Value::as_u64)
        .ok_or(LoadError::InvalidField {
            index,
            x,
            y,
            field: "rotation",
        })?;
    let direction = u8::try_from(rotation)
        .ok()
        .and_then(Direction::from_quarters)
        .ok_or(LoadError::InvalidRotation {
            index,
            x,
            y,
            rotation,
        })?;

    let kind = match tag {
        "halt" => NodeKind::Halt,
        "void" => NodeKind::Void,
        "branch" => NodeKind::Branch,
        "splitter" => NodeKind::Splitter,
        "branch if zero" => NodeKind::IfZero,
        "branch if null" => NodeKind::IfNull,
        "branch if positive" => NodeKind::IfPositive,
        "input" => {
            let field = object.get("index").ok_or(LoadError::InvalidField {
                index,
                x,
                y,
                field: "index",
            })?;
            let input_index = match field {
                Value::Null => None,
                other => Some(other.as_u64().ok_or(LoadError::InvalidField {
                    index,
                    x,
                    y,
                    field: "index",
                })? as usize),
            };
            NodeKind::input(input_index)
        }
        "list" => NodeKind::list(),
        unknown => {
            return Err(LoadError::UnknownNodeType {
                index,
                x,
                y,
                tag: unknown.to_owned(),
            })
        }
    };

    Ok(Node::new(kind, direction))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_board() -> Board {
        let mut board = Board::new(4, 3);
        board.place_node(
            Coordinate::new(0, 0),
            Node::new(NodeKind::input(Some(2)), Direction::Right),
        );
        board.place_node(
            Coordinate::new(3, 0),
            Node::new(NodeKind::input(None), Direction::Down),
        );
        board.place_node(
            Coordinate::new(1, 1),
            Node::new(NodeKind::Splitter, Direction::Left),
        );
        board.place_node(
            Coordinate::new(2, 2),
            Node::new(NodeKind::Halt, Direction::Up),
        );
        board
    }

    // -- 1. round trip ------------------------------------------------------

    #[test]
    fn save_load_round_trip_reproduces_placements() {
        let board = sample_board();
        let loaded = load_board(&save_board(&board)).unwrap();

        assert_eq!(loaded.width(), board.width());
        assert_eq!(loaded.height(), board.height());
        assert_eq!(loaded.node_count(), board.node_count());
        for ((ca, na), (cb, nb)) in board.nodes().zip(loaded.nodes()) {
            assert_eq!(ca, cb);
            assert_eq!(na.type_tag(), nb.type_tag());
            assert_eq!(na.direction(), nb.direction());
        }
        assert!(loaded.bullets().is_empty());
    }

    #[test]
    fn loaded_input_node_keeps_its_index() {
        let loaded = load_board(&save_board(&sample_board())).unwrap();
        let node = loaded.node_at(Coordinate::new(0, 0)).unwrap();
        assert_eq!(node.kind(), &NodeKind::input(Some(2)));
        let node = loaded.node_at(Coordinate::new(3, 0)).unwrap();
        assert_eq!(node.kind(), &NodeKind::input(None));
    }

    #[test]
    fn load_discards_runtime_state() {
        let mut board = sample_board();
        // Latch an input and advance a cursor, then persist.
        use num_bigint::BigInt;
        board.launch(&[
            Some(BigInt::from(1)),
            Some(BigInt::from(2)),
            Some(BigInt::from(3)),
        ]);
        let loaded = load_board(&save_board(&board)).unwrap();
        assert_eq!(
            loaded.node_at(Coordinate::new(0, 0)).unwrap().kind(),
            &NodeKind::input(Some(2))
        );
        assert!(loaded.bullets().is_empty());
    }

    // -- 2. malformed documents ---------------------------------------------

    #[test]
    fn not_json_is_malformed() {
        assert!(matches!(
            load_board("not json"),
            Err(LoadError::Malformed { .. })
        ));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let err = load_board(r#"{"width": 0, "height": 3, "nodes": []}"#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidDimensions {
                width: 0,
                height: 3
            }
        ));
    }

    #[test]
    fn unknown_node_type_names_the_offender() {
        let json = r#"{"width": 2, "height": 2, "nodes": [
            {"coordinate": {"x": 1, "y": 0}, "node": {"type": "teleporter", "rotation": 0}}
        ]}"#;
        let err = load_board(json).unwrap_err();
        match err {
            LoadError::UnknownNodeType { index, x, y, ref tag } => {
                assert_eq!((index, x, y), (0, 1, 0));
                assert_eq!(tag, "teleporter");
            }
            other => panic!("expected UnknownNodeType, got {other:?}"),
        }
        assert!(err.to_string().contains("teleporter"));
    }

    #[test]
    fn missing_rotation_is_an_invalid_field() {
        let json = r#"{"width": 2, "height": 2, "nodes": [
            {"coordinate": {"x": 0, "y": 0}, "node": {"type": "halt"}}
        ]}"#;
        assert!(matches!(
            load_board(json).unwrap_err(),
            LoadError::InvalidField {
                field: "rotation",
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_rotation_is_rejected() {
        let json = r#"{"width": 2, "height": 2, "nodes": [
            {"coordinate": {"x": 0, "y": 0}, "node": {"type": "halt", "rotation": 7}}
        ]}"#;
        assert!(matches!(
            load_board(json).unwrap_err(),
            LoadError::InvalidRotation { rotation: 7, .. }
        ));
    }

    #[test]
    fn input_node_requires_an_index_field() {
        let json = r#"{"width": 2, "height": 2, "nodes": [
            {"coordinate": {"x": 0, "y": 0}, "node": {"type": "input", "rotation": 1}}
        ]}"#;
        assert!(matches!(
            load_board(json).unwrap_err(),
            LoadError::InvalidField { field: "index", .. }
        ));
    }

    #[test]
    fn out_of_bounds_placement_is_rejected() {
        let json = r#"{"width": 2, "height": 2, "nodes": [
            {"coordinate": {"x": 2, "y": 0}, "node": {"type": "halt", "rotation": 0}}
        ]}"#;
        assert!(matches!(
            load_board(json).unwrap_err(),
            LoadError::OutOfBounds { x: 2, y: 0, .. }
        ));
    }

    #[test]
    fn duplicate_coordinates_are_rejected() {
        let json = r#"{"width": 2, "height": 2, "nodes": [
            {"coordinate": {"x": 0, "y": 0}, "node": {"type": "halt", "rotation": 0}},
            {"coordinate": {"x": 0, "y": 0}, "node": {"type": "void", "rotation": 0}}
        ]}"#;
        assert!(matches!(
            load_board(json).unwrap_err(),
            LoadError::DuplicateCoordinate { index: 1, .. }
        ));
    }

    #[test]
    fn rotation_survives_the_round_trip() {
        let mut board = Board::new(2, 2);
        let mut node = Node::new(NodeKind::Branch, Direction::Up);
        node.rotate_ccw(); // Left, quarter count 3
        board.place_node(Coordinate::new(1, 1), node);

        let loaded = load_board(&save_board(&board)).unwrap();
        assert_eq!(
            loaded.node_at(Coordinate::new(1, 1)).unwrap().direction(),
            Direction::Left
        );
    }
}
