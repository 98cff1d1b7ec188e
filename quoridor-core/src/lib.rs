//! Quoridor rules engine.
//!
//! # Board Coordinates
//!
//! ```text
//!        X: 0 1 2 3 4 5 6 7 8
//!   Y: 0    . . . . 1 . . . .    Player One starts at (4,0), goal row Y=8
//!      1    . . . . . . . . .
//!      ...
//!      8    . . . . 2 . . . .    Player Two starts at (4,8), goal row Y=0
//! ```
//!
//! # Wall Anchors
//!
//! A wall is anchored at the grid intersection (X, Y), the top-left corner
//! of tile (X, Y), and always covers two tile edges:
//!
//! ```text
//! Horizontal (X, Y): edges between rows Y-1 and Y, on columns X-1 and X
//! Vertical   (X, Y): edges between columns X-1 and X, on rows Y-1 and Y
//! ```
//!
//! Anchors range over the interior intersections 1..=8 on both axes.
//!
//! # Layers
//!
//! [`Board`] is a plain snapshot (two pawns, the placed walls). The query
//! functions in [`rules`] are pure functions of a snapshot. [`GameSession`]
//! owns the operation log and is the only thing that mutates game state.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod error;
pub mod operation;
pub mod rules;
pub mod session;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{Error, Result};
pub use operation::{decode_log, encode_log, Operation};
pub use rules::{can_put_wall, can_reach_goal, collided, is_blocked, placeable_walls, selectables};
pub use session::{Change, GameSession, SubscriptionId};

/// Tiles per side.
pub const BOARD_SIZE: u8 = 9;

/// Walls each player may place over a whole game.
pub const WALLS_PER_PLAYER: u8 = 10;

pub const PLAYER_COUNT: usize = 2;

/// Player identifier. `One` moves first.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum Player {
    One = 0,
    Two = 1,
}

impl Player {
    pub const ALL: [Player; PLAYER_COUNT] = [Player::One, Player::Two];

    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Index into per-player arrays (0 or 1).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Convert from index (0 or 1) to Player.
    #[inline]
    pub fn from_index(idx: usize) -> Option<Player> {
        match idx {
            0 => Some(Player::One),
            1 => Some(Player::Two),
            _ => None,
        }
    }

    /// The player who acts on the given turn (0-based log length).
    #[inline]
    pub fn at_turn(turn: usize) -> Player {
        if turn % PLAYER_COUNT == 0 {
            Player::One
        } else {
            Player::Two
        }
    }

    /// Starting tile of this player's pawn.
    pub fn start(self) -> Position {
        match self {
            Player::One => Position::new(4, 0),
            Player::Two => Position::new(4, BOARD_SIZE - 1),
        }
    }

    /// Row this player's pawn must reach.
    pub fn goal_row(self) -> u8 {
        match self {
            Player::One => BOARD_SIZE - 1,
            Player::Two => 0,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// A tile on the 9x9 board.
///
/// Serialized as `{ "X": x, "Y": y }`, the shape used on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "X")]
    pub x: u8,
    #[serde(rename = "Y")]
    pub y: u8,
}

impl Position {
    #[inline]
    pub const fn new(x: u8, y: u8) -> Position {
        Position { x, y }
    }

    /// Create a position from signed coordinates, failing off the board.
    pub fn try_new(x: i32, y: i32) -> Result<Position> {
        let size = BOARD_SIZE as i32;
        if (0..size).contains(&x) && (0..size).contains(&y) {
            Ok(Position::new(x as u8, y as u8))
        } else {
            Err(Error::OutOfBounds { x, y })
        }
    }

    /// Check if this is a tile of the board.
    #[inline]
    pub fn in_bounds(self) -> bool {
        self.x < BOARD_SIZE && self.y < BOARD_SIZE
    }

    /// The neighbouring tile in `dir`, or None when that leaves the board.
    pub fn step(self, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.vector();
        Position::try_new(self.x as i32 + dx, self.y as i32 + dy).ok()
    }

    /// Row-major index (0-80).
    #[inline]
    pub fn index(self) -> usize {
        self.y as usize * BOARD_SIZE as usize + self.x as usize
    }

    /// Iterate over all 81 tiles, row by row.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).flat_map(|y| (0..BOARD_SIZE).map(move |x| Position::new(x, y)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal unit step. Y grows downwards, towards Player Two's side.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Scan order used by move enumeration.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// The (dx, dy) unit vector.
    #[inline]
    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Parse a unit cardinal vector. Anything with `|dx| + |dy| != 1` is a
    /// caller bug and fails with [`Error::InvalidDirection`].
    pub fn from_vector(dx: i32, dy: i32) -> Result<Direction> {
        match (dx, dy) {
            (0, -1) => Ok(Direction::Up),
            (0, 1) => Ok(Direction::Down),
            (-1, 0) => Ok(Direction::Left),
            (1, 0) => Ok(Direction::Right),
            _ => Err(Error::InvalidDirection { dx, dy }),
        }
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// The two directions at right angles to this one.
    pub fn perpendicular(self) -> [Direction; 2] {
        if self.is_horizontal() {
            [Direction::Up, Direction::Down]
        } else {
            [Direction::Left, Direction::Right]
        }
    }
}

/// Wall orientation, serialized as `"horizontal"` / `"vertical"`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub const ALL: [Orientation; 2] = [Orientation::Horizontal, Orientation::Vertical];

    #[inline]
    pub fn other(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => f.write_str("horizontal"),
            Orientation::Vertical => f.write_str("vertical"),
        }
    }
}

/// A placed (or candidate) wall.
///
/// Serialized as `{ "X": x, "Y": y, "direction": "horizontal" | "vertical" }`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Wall {
    #[serde(rename = "X")]
    pub x: u8,
    #[serde(rename = "Y")]
    pub y: u8,
    #[serde(rename = "direction")]
    pub orientation: Orientation,
}

impl Wall {
    #[inline]
    pub const fn new(x: u8, y: u8, orientation: Orientation) -> Wall {
        Wall { x, y, orientation }
    }

    #[inline]
    pub const fn horizontal(x: u8, y: u8) -> Wall {
        Wall::new(x, y, Orientation::Horizontal)
    }

    #[inline]
    pub const fn vertical(x: u8, y: u8) -> Wall {
        Wall::new(x, y, Orientation::Vertical)
    }

    /// Check the anchor is an interior intersection (1..=8 on both axes).
    #[inline]
    pub fn in_bounds(self) -> bool {
        (1..BOARD_SIZE).contains(&self.x) && (1..BOARD_SIZE).contains(&self.y)
    }

    /// Check whether two walls compete for the same slot.
    ///
    /// Walls sharing an anchor always conflict, whatever their orientation.
    /// Same-orientation walls also conflict when they are one step apart
    /// along their own axis, since they would overlap by one edge.
    pub fn conflicts_with(&self, other: &Wall) -> bool {
        if self.x == other.x && self.y == other.y {
            return true;
        }
        if self.orientation != other.orientation {
            return false;
        }
        match self.orientation {
            Orientation::Horizontal => self.y == other.y && self.x.abs_diff(other.x) == 1,
            Orientation::Vertical => self.x == other.x && self.y.abs_diff(other.y) == 1,
        }
    }

    /// Iterate over every in-bounds anchor in both orientations (128 walls).
    pub fn all() -> impl Iterator<Item = Wall> {
        (1..BOARD_SIZE).flat_map(|x| {
            (1..BOARD_SIZE)
                .flat_map(move |y| Orientation::ALL.into_iter().map(move |o| Wall::new(x, y, o)))
        })
    }
}

impl fmt::Display for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.orientation, self.x, self.y)
    }
}

/// Board snapshot: pawn positions and placed walls.
///
/// This is the value every query in [`rules`] reads. A [`GameSession`] only
/// hands out shared references to its board, so the snapshot it exposes
/// always matches its operation log. Free-standing boards may be edited to
/// build hypothetical positions.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    pawns: [Position; PLAYER_COUNT],
    walls: Vec<Wall>,
}

impl Board {
    /// Initial configuration: both pawns on their start tiles, no walls.
    pub fn new() -> Board {
        Board {
            pawns: [Player::One.start(), Player::Two.start()],
            walls: Vec::new(),
        }
    }

    /// Get a player's pawn position.
    #[inline]
    pub fn pawn(&self, player: Player) -> Position {
        self.pawns[player.index()]
    }

    /// Both pawns, indexed by player.
    #[inline]
    pub fn pawns(&self) -> [Position; PLAYER_COUNT] {
        self.pawns
    }

    /// Placed walls, in placement order.
    #[inline]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn set_pawn(&mut self, player: Player, pos: Position) {
        self.pawns[player.index()] = pos;
    }

    pub fn push_wall(&mut self, wall: Wall) {
        self.walls.push(wall);
    }

    /// Remove the wall matching `wall` exactly. Returns false if none matched.
    pub fn remove_wall(&mut self, wall: &Wall) -> bool {
        match self.walls.iter().position(|w| w == wall) {
            Some(idx) => {
                self.walls.remove(idx);
                true
            }
            None => false,
        }
    }

    /// The player whose pawn stands on their goal row, if any.
    pub fn winner(&self) -> Option<Player> {
        Player::ALL
            .into_iter()
            .find(|&p| self.pawn(p).y == p.goal_row())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent(), Player::One);
    }

    #[test]
    fn test_player_turn_parity() {
        assert_eq!(Player::at_turn(0), Player::One);
        assert_eq!(Player::at_turn(1), Player::Two);
        assert_eq!(Player::at_turn(2), Player::One);
        assert_eq!(Player::at_turn(7), Player::Two);
        assert_eq!(Player::from_index(2), None);
    }

    #[test]
    fn test_player_start_and_goal() {
        assert_eq!(Player::One.start(), Position::new(4, 0));
        assert_eq!(Player::Two.start(), Position::new(4, 8));
        assert_eq!(Player::One.goal_row(), 8);
        assert_eq!(Player::Two.goal_row(), 0);
    }

    #[test]
    fn test_position_bounds() {
        assert!(Position::new(0, 0).in_bounds());
        assert!(Position::new(8, 8).in_bounds());
        assert!(!Position::new(9, 0).in_bounds());
        assert!(!Position::new(0, 9).in_bounds());
        assert!(matches!(Position::try_new(-1, 3), Err(Error::OutOfBounds { x: -1, y: 3 })));
        assert_eq!(Position::try_new(3, 4).unwrap(), Position::new(3, 4));
    }

    #[test]
    fn test_position_step() {
        let corner = Position::new(0, 0);
        assert_eq!(corner.step(Direction::Up), None);
        assert_eq!(corner.step(Direction::Left), None);
        assert_eq!(corner.step(Direction::Down), Some(Position::new(0, 1)));
        assert_eq!(corner.step(Direction::Right), Some(Position::new(1, 0)));
        assert_eq!(Position::new(8, 8).step(Direction::Down), None);
    }

    #[test]
    fn test_position_all() {
        let all: Vec<Position> = Position::all().collect();
        assert_eq!(all.len(), 81);
        for (i, pos) in all.iter().enumerate() {
            assert_eq!(pos.index(), i);
        }
    }

    #[test]
    fn test_direction_from_vector() {
        for dir in Direction::ALL {
            let (dx, dy) = dir.vector();
            assert_eq!(Direction::from_vector(dx, dy).unwrap(), dir);
        }
        for (dx, dy) in [(0, 0), (2, 0), (-2, 0), (1, 1), (1, -1)] {
            assert!(matches!(
                Direction::from_vector(dx, dy),
                Err(Error::InvalidDirection { .. })
            ));
        }
    }

    #[test]
    fn test_direction_perpendicular() {
        assert_eq!(Direction::Left.perpendicular(), [Direction::Up, Direction::Down]);
        assert_eq!(Direction::Down.perpendicular(), [Direction::Left, Direction::Right]);
    }

    #[test]
    fn test_wall_bounds() {
        assert!(Wall::horizontal(1, 1).in_bounds());
        assert!(Wall::vertical(8, 8).in_bounds());
        assert!(!Wall::horizontal(0, 4).in_bounds());
        assert!(!Wall::vertical(4, 9).in_bounds());
        assert_eq!(Wall::all().count(), 128);
        assert!(Wall::all().all(Wall::in_bounds));
    }

    #[test]
    fn test_wall_conflicts() {
        let wall = Wall::horizontal(1, 2);
        // same slot, either orientation
        assert!(wall.conflicts_with(&Wall::horizontal(1, 2)));
        assert!(wall.conflicts_with(&Wall::vertical(1, 2)));
        // collinear neighbours
        assert!(wall.conflicts_with(&Wall::horizontal(2, 2)));
        assert!(wall.conflicts_with(&Wall::horizontal(0, 2)));
        // crossing a neighbour's anchor is fine
        assert!(!wall.conflicts_with(&Wall::vertical(2, 2)));
        // parallel, one row apart
        assert!(!wall.conflicts_with(&Wall::horizontal(1, 1)));
        assert!(!wall.conflicts_with(&Wall::horizontal(3, 2)));

        let wall = Wall::vertical(4, 4);
        assert!(wall.conflicts_with(&Wall::vertical(4, 5)));
        assert!(wall.conflicts_with(&Wall::vertical(4, 3)));
        assert!(!wall.conflicts_with(&Wall::vertical(5, 4)));
        assert!(wall.conflicts_with(&Wall::new(4, 4, wall.orientation.other())));
    }

    #[test]
    fn test_wall_conflicts_symmetric() {
        for a in Wall::all() {
            for b in Wall::all() {
                assert_eq!(a.conflicts_with(&b), b.conflicts_with(&a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_board_new() {
        let board = Board::new();
        assert_eq!(board.pawn(Player::One), Position::new(4, 0));
        assert_eq!(board.pawn(Player::Two), Position::new(4, 8));
        assert!(board.walls().is_empty());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_board_remove_wall() {
        let mut board = Board::new();
        board.push_wall(Wall::horizontal(3, 3));
        board.push_wall(Wall::vertical(5, 5));
        assert!(!board.remove_wall(&Wall::vertical(3, 3)));
        assert!(board.remove_wall(&Wall::horizontal(3, 3)));
        assert_eq!(board.walls(), &[Wall::vertical(5, 5)]);
    }

    #[test]
    fn test_board_winner() {
        let mut board = Board::new();
        board.set_pawn(Player::One, Position::new(2, 8));
        assert_eq!(board.winner(), Some(Player::One));

        let mut board = Board::new();
        board.set_pawn(Player::Two, Position::new(7, 0));
        assert_eq!(board.winner(), Some(Player::Two));
    }
}
