//! Game session: the operation log and the board folded from it.
//!
//! The log is the single source of truth. Pawn positions, walls, the player
//! to move and wall stock are all derived from it; the board is kept in step
//! incrementally and rebuilt from scratch when a remote log arrives.

use std::fmt;

use tracing::{debug, warn};

use crate::operation::{decode_log, encode_log, Operation};
use crate::rules::{can_put_wall, selectables};
use crate::{
    Board, Error, Orientation, Player, Position, Result, Wall, PLAYER_COUNT, WALLS_PER_PLAYER,
};

/// What a mutation did, passed to subscribers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Change {
    Moved,
    WallAdded,
    Reverted,
    Synced,
    Reset,
}

/// Handle returned by [`GameSession::subscribe`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GameSession, Change) + Send>;

/// A match in progress.
pub struct GameSession {
    operations: Vec<Operation>,
    board: Board,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl GameSession {
    /// New match: pawns on their start tiles, empty log.
    pub fn new() -> GameSession {
        GameSession {
            operations: Vec::new(),
            board: Board::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Rebuild a session by folding `operations` from the initial position.
    ///
    /// Each entry is checked for consistency with the position reached so
    /// far: coordinates on the board, a move's `before` equal to the mover's
    /// pawn, and no player exceeding their wall stock. Move and wall legality
    /// is not re-checked; the peer that produced the log did that.
    pub fn replay(operations: Vec<Operation>) -> Result<GameSession> {
        let mut board = Board::new();
        let mut placed = [0u8; PLAYER_COUNT];

        for (index, op) in operations.iter().enumerate() {
            let player = Player::at_turn(index);
            let malformed = |reason: String| Error::MalformedLog { index, reason };

            match *op {
                Operation::Move { before, after } => {
                    if !before.in_bounds() || !after.in_bounds() {
                        return Err(malformed(format!("move {before} -> {after} leaves the board")));
                    }
                    let pawn = board.pawn(player);
                    if pawn != before {
                        return Err(malformed(format!(
                            "move starts at {before} but player {player} stands on {pawn}"
                        )));
                    }
                    board.set_pawn(player, after);
                }
                Operation::WallPlacement { wall } => {
                    if !wall.in_bounds() {
                        return Err(malformed(format!("wall {wall} is off the grid")));
                    }
                    placed[player.index()] += 1;
                    if placed[player.index()] > WALLS_PER_PLAYER {
                        return Err(malformed(format!("player {player} has no walls left")));
                    }
                    board.push_wall(wall);
                }
            }
        }

        Ok(GameSession {
            operations,
            board,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    // ------------------------------------------------------------------------
    // Read-only surface
    // ------------------------------------------------------------------------

    /// Current board snapshot.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The full log, oldest first.
    #[inline]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Player to act: log length modulo player count.
    #[inline]
    pub fn current_player(&self) -> Player {
        Player::at_turn(self.operations.len())
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.operations.is_empty()
    }

    /// Walls `player` may still place: the stock minus the wall placements
    /// on that player's turns.
    pub fn remaining_walls(&self, player: Player) -> u8 {
        let placed = self
            .operations
            .iter()
            .enumerate()
            .filter(|(i, op)| Player::at_turn(*i) == player && op.is_wall())
            .count();
        WALLS_PER_PLAYER.saturating_sub(placed as u8)
    }

    /// Remaining walls for both players, indexed by player.
    pub fn remaining_walls_all(&self) -> [u8; PLAYER_COUNT] {
        Player::ALL.map(|p| self.remaining_walls(p))
    }

    /// Legal destinations for the player to act.
    pub fn selectables(&self) -> Vec<Position> {
        let player = self.current_player();
        selectables(player, self.board.pawn(player), &self.board)
    }

    pub fn winner(&self) -> Option<Player> {
        self.board.winner()
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Move the current player's pawn to `to` and pass the turn.
    ///
    /// No legality check: the caller must have taken `to` from
    /// [`selectables`]. Use [`GameSession::try_move_piece`] otherwise.
    pub fn move_piece(&mut self, to: Position) {
        let player = self.current_player();
        let before = self.board.pawn(player);
        self.operations.push(Operation::Move { before, after: to });
        self.board.set_pawn(player, to);
        debug!(player = player.index(), from = %before, to = %to, "pawn moved");
        self.emit(Change::Moved);
    }

    /// Place a wall for the current player and pass the turn.
    ///
    /// No legality check: the caller must have validated the wall with
    /// [`can_put_wall`] and confirmed the player has a wall left. Use
    /// [`GameSession::try_add_wall`] otherwise.
    pub fn add_wall(&mut self, x: u8, y: u8, orientation: Orientation) -> Wall {
        let player = self.current_player();
        let wall = Wall::new(x, y, orientation);
        self.operations.push(Operation::WallPlacement { wall });
        self.board.push_wall(wall);
        debug!(player = player.index(), %wall, "wall placed");
        self.emit(Change::WallAdded);
        wall
    }

    /// Move after checking `to` is a legal destination for the current player.
    pub fn try_move_piece(&mut self, to: Position) -> Result<()> {
        if !self.selectables().contains(&to) {
            return Err(Error::IllegalMove {
                player: self.current_player(),
                to,
            });
        }
        self.move_piece(to);
        Ok(())
    }

    /// Place a wall after checking wall stock and placement legality.
    pub fn try_add_wall(&mut self, wall: Wall) -> Result<()> {
        let player = self.current_player();
        if self.remaining_walls(player) == 0 {
            return Err(Error::NoWallsRemaining(player));
        }
        if !can_put_wall(&self.board, wall) {
            return Err(Error::IllegalWall(wall));
        }
        self.add_wall(wall.x, wall.y, wall.orientation);
        Ok(())
    }

    /// Undo the most recent operation. Returns it, or None on an empty log.
    pub fn revert(&mut self) -> Option<Operation> {
        let last = self.operations.pop()?;
        // the player who made `last` is the one to act again
        let player = self.current_player();

        match last {
            Operation::Move { before, .. } => {
                self.board.set_pawn(player, before);
            }
            Operation::WallPlacement { wall } => {
                if !self.board.remove_wall(&wall) {
                    warn!(%wall, "reverted wall was not on the board");
                }
            }
        }

        debug!(player = player.index(), ?last, "operation reverted");
        self.emit(Change::Reverted);
        Some(last)
    }

    /// Start over from the initial position. Subscribers are kept.
    pub fn reset(&mut self) {
        self.operations.clear();
        self.board = Board::new();
        self.emit(Change::Reset);
    }

    // ------------------------------------------------------------------------
    // Sync
    // ------------------------------------------------------------------------

    /// The full log in wire form.
    pub fn sync_payload(&self) -> Result<String> {
        encode_log(&self.operations)
    }

    /// Replace the local log with a peer's and re-derive the board.
    ///
    /// Safe to repeat with the same or a longer log. On error the session is
    /// left as it was.
    pub fn apply_remote_log(&mut self, operations: Vec<Operation>) -> Result<()> {
        let replayed = GameSession::replay(operations)?;
        self.operations = replayed.operations;
        self.board = replayed.board;
        debug!(len = self.operations.len(), "remote log applied");
        self.emit(Change::Synced);
        Ok(())
    }

    /// Apply a raw sync message from the transport.
    ///
    /// Malformed or empty payloads are logged and skipped. Returns whether
    /// the session took the update.
    pub fn receive(&mut self, payload: &str) -> bool {
        let operations = match decode_log(payload) {
            Ok(ops) => ops,
            Err(err) => {
                warn!(%err, payload, "ignoring malformed sync payload");
                return false;
            }
        };
        if operations.is_empty() {
            debug!("ignoring empty sync payload");
            return false;
        }
        match self.apply_remote_log(operations) {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, payload, "ignoring inconsistent sync payload");
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // Change notification
    // ------------------------------------------------------------------------

    /// Register `listener` to run after every mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GameSession, Change) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drop a listener. Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, change: Change) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(self, change);
        }
        self.listeners = listeners;
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("operations", &self.operations)
            .field("board", &self.board)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
