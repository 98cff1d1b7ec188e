//! WASM bindings for quoridor-core
//!
//! Provides a JavaScript-friendly API for the renderer. Commits go through
//! the checked session helpers, so the page cannot corrupt the log.

use wasm_bindgen::prelude::*;

use crate::{can_put_wall, GameSession, Orientation, Player, Position, Wall};

fn orientation(horizontal: bool) -> Orientation {
    if horizontal {
        Orientation::Horizontal
    } else {
        Orientation::Vertical
    }
}

fn player(index: u8) -> Result<Player, JsValue> {
    Player::from_index(index as usize).ok_or_else(|| JsValue::from_str("player must be 0 or 1"))
}

/// WASM-friendly wrapper around GameSession
#[wasm_bindgen]
pub struct WasmGame {
    inner: GameSession,
}

#[wasm_bindgen]
impl WasmGame {
    /// Start a new match
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame {
            inner: GameSession::new(),
        }
    }

    /// Player to act (0 or 1)
    #[wasm_bindgen(js_name = currentPlayer)]
    pub fn current_player(&self) -> u8 {
        self.inner.current_player().index() as u8
    }

    /// Walls left as [player0, player1]
    #[wasm_bindgen(js_name = remainingWalls)]
    pub fn remaining_walls(&self) -> Vec<u8> {
        self.inner.remaining_walls_all().to_vec()
    }

    /// Length of the operation log
    #[wasm_bindgen(js_name = operationCount)]
    pub fn operation_count(&self) -> usize {
        self.inner.operations().len()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    /// Pawn of a player as { X, Y }
    pub fn pawn(&self, index: u8) -> Result<JsValue, JsValue> {
        let pos = self.inner.board().pawn(player(index)?);
        Ok(serde_wasm_bindgen::to_value(&pos)?)
    }

    /// Placed walls as [{ X, Y, direction }]
    pub fn walls(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(self.inner.board().walls())?)
    }

    /// Legal destinations for the player to act, as [{ X, Y }]
    pub fn selectables(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.inner.selectables())?)
    }

    /// Check a wall before offering it to the player
    #[wasm_bindgen(js_name = canPutWall)]
    pub fn can_put_wall(&self, x: u8, y: u8, horizontal: bool) -> bool {
        can_put_wall(self.inner.board(), Wall::new(x, y, orientation(horizontal)))
    }

    /// Move the current pawn. Returns false if the move is illegal.
    #[wasm_bindgen(js_name = movePiece)]
    pub fn move_piece(&mut self, x: u8, y: u8) -> bool {
        self.inner.try_move_piece(Position::new(x, y)).is_ok()
    }

    /// Place a wall. Returns false if it cannot be placed.
    #[wasm_bindgen(js_name = addWall)]
    pub fn add_wall(&mut self, x: u8, y: u8, horizontal: bool) -> bool {
        self.inner
            .try_add_wall(Wall::new(x, y, orientation(horizontal)))
            .is_ok()
    }

    /// Undo the last operation. Returns false on an empty log.
    pub fn revert(&mut self) -> bool {
        self.inner.revert().is_some()
    }

    /// Winner index, or -1 while the game is on
    pub fn winner(&self) -> i8 {
        self.inner.winner().map_or(-1, |p| p.index() as i8)
    }

    /// Full operation log as a JSON string, for the transport
    #[wasm_bindgen(js_name = syncPayload)]
    pub fn sync_payload(&self) -> Result<String, JsValue> {
        self.inner
            .sync_payload()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Apply a peer's JSON log. Returns false if it was ignored.
    pub fn receive(&mut self, payload: &str) -> bool {
        self.inner.receive(payload)
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
