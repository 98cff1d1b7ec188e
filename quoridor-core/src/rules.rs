//! Rule queries over a [`Board`] snapshot.
//!
//! Everything here is a pure function of its arguments. Nothing mutates the
//! board it is given; the wall validator works on a private copy.

use std::collections::VecDeque;

use tracing::trace;

use crate::{Board, Direction, Orientation, Player, Position, Result, Wall, BOARD_SIZE};

// ============================================================================
// COLLISION
// ============================================================================

/// Check whether a wall blocks the step from `pos` along `(dx, dy)`.
///
/// Fails with [`crate::Error::InvalidDirection`] unless `(dx, dy)` is a unit
/// cardinal vector.
pub fn collided(walls: &[Wall], pos: Position, dx: i32, dy: i32) -> Result<bool> {
    let dir = Direction::from_vector(dx, dy)?;
    Ok(is_blocked(walls, pos, dir))
}

/// Check whether a wall blocks the step from `pos` in `dir`.
///
/// Sideways steps can only hit vertical walls and up/down steps only
/// horizontal ones. The wall must sit on the crossed edge line and its
/// two-edge span must cover the destination row (or column).
pub fn is_blocked(walls: &[Wall], pos: Position, dir: Direction) -> bool {
    let (dx, dy) = dir.vector();
    let (x, y) = (pos.x as i32, pos.y as i32);
    let (to_x, to_y) = (x + dx, y + dy);

    if dir.is_horizontal() {
        let edge = x + i32::from(dx > 0);
        walls.iter().any(|w| {
            w.orientation == Orientation::Vertical
                && w.x as i32 == edge
                && (w.y as i32 == to_y || w.y as i32 == to_y + 1)
        })
    } else {
        let edge = y + i32::from(dy > 0);
        walls.iter().any(|w| {
            w.orientation == Orientation::Horizontal
                && w.y as i32 == edge
                && (w.x as i32 == to_x || w.x as i32 == to_x + 1)
        })
    }
}

// ============================================================================
// MOVE ENUMERATION
// ============================================================================

/// Legal destinations for `player`'s pawn standing on `from`.
///
/// `from` need not be the pawn's actual tile: reachability search asks about
/// tiles the pawn could move to. The opponent's pawn is always read from the
/// board.
///
/// Scanning Up, Down, Left, Right:
/// - an empty neighbour behind no wall is a destination;
/// - if the opponent stands there, jump straight over it when nothing blocks
///   the far side and the landing tile is on the board;
/// - if a wall blocks the far side, step sideways off the opponent's tile
///   instead, in either perpendicular direction that is open.
///
/// An opponent on the board edge is neither jumpable nor sidestepped.
pub fn selectables(player: Player, from: Position, board: &Board) -> Vec<Position> {
    let walls = board.walls();
    let opponent = board.pawn(player.opponent());
    let mut out = Vec::with_capacity(5);

    for dir in Direction::ALL {
        let Some(next) = from.step(dir) else {
            continue;
        };
        if is_blocked(walls, from, dir) {
            continue;
        }

        if next != opponent {
            out.push(next);
            continue;
        }

        if !is_blocked(walls, next, dir) {
            if let Some(landing) = next.step(dir) {
                out.push(landing);
            }
        } else {
            for side in dir.perpendicular() {
                if let Some(landing) = next.step(side) {
                    if !is_blocked(walls, next, side) {
                        out.push(landing);
                    }
                }
            }
        }
    }

    out
}

// ============================================================================
// REACHABILITY
// ============================================================================

/// Check whether `player` can still walk to their goal row.
///
/// Breadth-first search over [`selectables`] from the pawn's tile, always
/// enumerating as `player` so jumps orient correctly. Bounded by the 81
/// tiles of the board.
pub fn can_reach_goal(player: Player, board: &Board) -> bool {
    let goal = player.goal_row();
    let start = board.pawn(player);

    let mut visited = [false; (BOARD_SIZE as usize) * (BOARD_SIZE as usize)];
    let mut queue = VecDeque::new();
    visited[start.index()] = true;
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        if pos.y == goal {
            return true;
        }
        for next in selectables(player, pos, board) {
            if !visited[next.index()] {
                visited[next.index()] = true;
                queue.push_back(next);
            }
        }
    }

    false
}

// ============================================================================
// WALL PLACEMENT
// ============================================================================

/// Check whether `candidate` may be placed on `board`.
///
/// Rejected when the anchor is not an interior intersection, when it
/// conflicts with a placed wall, or when either player would lose every path
/// to their goal row. Wall stock is not checked here.
pub fn can_put_wall(board: &Board, candidate: Wall) -> bool {
    if !candidate.in_bounds() {
        trace!(wall = %candidate, "wall anchor off the grid");
        return false;
    }

    if let Some(existing) = board.walls().iter().find(|w| w.conflicts_with(&candidate)) {
        trace!(wall = %candidate, conflict = %existing, "wall slot taken");
        return false;
    }

    let mut next = board.clone();
    next.push_wall(candidate);
    for player in Player::ALL {
        if !can_reach_goal(player, &next) {
            trace!(wall = %candidate, player = player.index(), "wall would seal off a player");
            return false;
        }
    }

    true
}

/// Every wall that [`can_put_wall`] accepts on `board`.
pub fn placeable_walls(board: &Board) -> Vec<Wall> {
    Wall::all().filter(|&w| can_put_wall(board, w)).collect()
}
