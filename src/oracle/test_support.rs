//! Instrumented rules engine for tests.

use std::cell::Cell;
use std::rc::Rc;

use chess::{BitBoard, ChessMove, Color, Piece, Square};

use crate::errors::EngineResult;
use crate::oracle::board_oracle::{BoardOracle, PlayedMove};
use crate::oracle::chess_board::ChessBoard;

/// Delegates to `ChessBoard`, counting legal-move enumerations across all
/// clones. With `hide_moves` set it reports no moves while the game is not
/// over.
#[derive(Debug, Clone)]
pub struct ProbeBoard {
    pub inner: ChessBoard,
    pub legal_calls: Rc<Cell<usize>>,
    pub hide_moves: bool,
}

impl ProbeBoard {
    pub fn new(inner: ChessBoard) -> Self {
        Self {
            inner,
            legal_calls: Rc::new(Cell::new(0)),
            hide_moves: false,
        }
    }

    pub fn from_fen(fen: &str) -> Self {
        Self::new(ChessBoard::from_fen(fen).expect("FEN should parse"))
    }

    pub fn without_moves(inner: ChessBoard) -> Self {
        Self {
            hide_moves: true,
            ..Self::new(inner)
        }
    }

    pub fn calls(&self) -> usize {
        self.legal_calls.get()
    }

    pub fn reset_calls(&self) {
        self.legal_calls.set(0);
    }
}

impl BoardOracle for ProbeBoard {
    fn legal_moves(&self) -> Vec<ChessMove> {
        self.legal_calls.set(self.legal_calls.get() + 1);
        if self.hide_moves {
            Vec::new()
        } else {
            self.inner.legal_moves()
        }
    }

    fn apply_move(&mut self, mv: ChessMove) -> EngineResult<()> {
        self.inner.apply_move(mv)
    }

    fn undo_move(&mut self) -> EngineResult<ChessMove> {
        self.inner.undo_move()
    }

    fn side_to_move(&self) -> Color {
        self.inner.side_to_move()
    }

    fn is_checkmate(&self) -> bool {
        !self.hide_moves && self.inner.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        !self.hide_moves && self.inner.is_stalemate()
    }

    fn is_in_check(&self) -> bool {
        self.inner.is_in_check()
    }

    fn is_capture(&self, mv: ChessMove) -> bool {
        self.inner.is_capture(mv)
    }

    fn piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        self.inner.piece_at(square)
    }

    fn attacked_squares(&self, square: Square) -> BitBoard {
        self.inner.attacked_squares(square)
    }

    fn piece_count(&self) -> u32 {
        self.inner.piece_count()
    }

    fn last_move(&self) -> Option<PlayedMove> {
        self.inner.last_move()
    }

    fn ply(&self) -> u32 {
        self.inner.ply()
    }

    fn position_key(&self) -> u64 {
        self.inner.position_key()
    }

    fn snapshot(&self) -> Self {
        Self {
            inner: self.inner.snapshot(),
            legal_calls: Rc::clone(&self.legal_calls),
            hide_moves: self.hide_moves,
        }
    }

    fn fen(&self) -> String {
        self.inner.fen()
    }
}
