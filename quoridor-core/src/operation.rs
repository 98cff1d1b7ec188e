//! Operation log entries and their JSON wire format.
//!
//! The log is the sync payload: every message carries the full history.
//!
//! ```text
//! [
//!   { "type": "piece", "before": { "X": 4, "Y": 0 }, "after": { "X": 4, "Y": 1 } },
//!   { "type": "wall",  "wall": { "X": 3, "Y": 5, "direction": "horizontal" } }
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::{Position, Result, Wall};

/// One turn's action. The acting player is implied by the entry's index in
/// the log (even = Player One, odd = Player Two).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    /// Pawn moved from `before` to `after`.
    #[serde(rename = "piece")]
    Move { before: Position, after: Position },
    /// Wall placed.
    #[serde(rename = "wall")]
    WallPlacement { wall: Wall },
}

impl Operation {
    #[inline]
    pub fn is_wall(&self) -> bool {
        matches!(self, Operation::WallPlacement { .. })
    }
}

/// Serialize a log to its wire form.
pub fn encode_log(operations: &[Operation]) -> Result<String> {
    Ok(serde_json::to_string(operations)?)
}

/// Parse a log from its wire form. Only checks the shape; see
/// [`crate::GameSession::replay`] for consistency checks.
pub fn decode_log(payload: &str) -> Result<Vec<Operation>> {
    Ok(serde_json::from_str(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_move_wire_shape() {
        let op = Operation::Move {
            before: Position::new(4, 0),
            after: Position::new(4, 1),
        };
        let json = serde_json::to_value(op).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "piece",
                "before": { "X": 4, "Y": 0 },
                "after": { "X": 4, "Y": 1 }
            })
        );
    }

    #[test]
    fn test_wall_wire_shape() {
        let op = Operation::WallPlacement {
            wall: Wall::vertical(3, 5),
        };
        let json = serde_json::to_value(op).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "wall",
                "wall": { "X": 3, "Y": 5, "direction": "vertical" }
            })
        );
    }

    #[test]
    fn test_decode_log() {
        let payload = r#"[
            {"type":"piece","before":{"X":4,"Y":0},"after":{"X":4,"Y":1}},
            {"type":"wall","wall":{"X":2,"Y":7,"direction":"horizontal"}}
        ]"#;
        let ops = decode_log(payload).unwrap();
        assert_eq!(
            ops,
            vec![
                Operation::Move {
                    before: Position::new(4, 0),
                    after: Position::new(4, 1),
                },
                Operation::WallPlacement {
                    wall: Wall::horizontal(2, 7),
                },
            ]
        );
        assert!(!ops[0].is_wall());
        assert!(ops[1].is_wall());
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        for payload in [
            "pong",
            "{}",
            r#"[{"type":"jump","before":{"X":4,"Y":0}}]"#,
            r#"[{"type":"wall","wall":{"X":2,"Y":7,"direction":"diagonal"}}]"#,
            r#"[{"type":"piece","before":{"X":-1,"Y":0},"after":{"X":0,"Y":0}}]"#,
            r#"[{"type":"piece","before":{"x":4,"y":0},"after":{"x":4,"y":1}}]"#,
        ] {
            assert!(matches!(decode_log(payload), Err(Error::Json(_))), "{payload}");
        }
    }

    #[test]
    fn test_encode_empty_log() {
        assert_eq!(encode_log(&[]).unwrap(), "[]");
        assert!(decode_log("[]").unwrap().is_empty());
    }
}
