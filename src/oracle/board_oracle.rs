//! Rules-engine interface consumed by the search.
//!
//! The search never implements chess rules itself; legal move enumeration,
//! move application and terminal detection all go through `BoardOracle`.
//! A handle is mutated only by `apply_move`/`undo_move` pairs, and every
//! caller restores the position it was given before returning.

use chess::{BitBoard, ChessMove, Color, Piece, Square};

use crate::errors::EngineResult;

/// The move that produced the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedMove {
    pub mv: ChessMove,
    pub was_capture: bool,
}

pub trait BoardOracle: Clone {
    fn legal_moves(&self) -> Vec<ChessMove>;

    /// Applies a legal move. Illegal moves are rejected with
    /// `EngineError::IllegalMove` and leave the position untouched.
    fn apply_move(&mut self, mv: ChessMove) -> EngineResult<()>;

    /// Reverts the most recent `apply_move` and returns the reverted move.
    fn undo_move(&mut self) -> EngineResult<ChessMove>;

    fn side_to_move(&self) -> Color;
    fn is_checkmate(&self) -> bool;
    fn is_stalemate(&self) -> bool;
    fn is_in_check(&self) -> bool;
    fn is_capture(&self, mv: ChessMove) -> bool;
    fn piece_at(&self, square: Square) -> Option<(Piece, Color)>;

    /// Squares attacked by the piece standing on `square` with the current
    /// occupancy. Empty squares attack nothing.
    fn attacked_squares(&self, square: Square) -> BitBoard;

    fn piece_count(&self) -> u32;
    fn last_move(&self) -> Option<PlayedMove>;

    /// Half-moves played since the start of the game.
    fn ply(&self) -> u32;

    /// Identity of the position (placement, side to move, rights).
    fn position_key(&self) -> u64;

    /// Copy of the current position without the undo history.
    fn snapshot(&self) -> Self;

    fn fen(&self) -> String;

    #[inline]
    fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_stalemate()
    }
}
