//! Engine error type.

use thiserror::Error;

use crate::{Player, Position, Wall};

#[derive(Debug, Error)]
pub enum Error {
    /// A direction vector that is not a unit cardinal step. Caller bug.
    #[error("({dx}, {dy}) is not a unit direction vector")]
    InvalidDirection { dx: i32, dy: i32 },

    #[error("({x}, {y}) is off the board")]
    OutOfBounds { x: i32, y: i32 },

    #[error("player {player} cannot move to {to}")]
    IllegalMove { player: Player, to: Position },

    #[error("cannot place wall {0}")]
    IllegalWall(Wall),

    #[error("player {0} has no walls remaining")]
    NoWallsRemaining(Player),

    #[error("malformed operation log at entry {index}: {reason}")]
    MalformedLog { index: usize, reason: String },

    #[error("invalid operation log JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
