//! `BoardOracle` adapter over the `chess` crate.
//!
//! `chess::Board` is an immutable copy-make position, so undo is a stack of
//! previous boards. The adapter also tracks what `chess::Board` drops: the
//! game ply (read from the FEN full-move number), the half-move clock and
//! whether the last move was a capture.

use std::str::FromStr;

use chess::{
    get_bishop_moves, get_king_moves, get_knight_moves, get_pawn_attacks, get_rook_moves,
    BitBoard, Board, BoardStatus, ChessMove, Color, File, Piece, Rank, Square, EMPTY,
};

use crate::errors::{EngineError, EngineResult};
use crate::oracle::board_oracle::{BoardOracle, PlayedMove};

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Single undo record for `apply_move` / `undo_move`.
#[derive(Debug, Clone)]
struct UndoState {
    mv: ChessMove,
    board: Board,
    halfmove_clock: u32,
    last_move: Option<PlayedMove>,
}

#[derive(Debug, Clone)]
pub struct ChessBoard {
    board: Board,
    ply: u32,
    /// Plies since the last capture or pawn move.
    halfmove_clock: u32,
    last_move: Option<PlayedMove>,
    undo_stack: Vec<UndoState>,
}

impl Default for ChessBoard {
    fn default() -> Self {
        Self::new_game()
    }
}

impl ChessBoard {
    #[inline]
    pub fn new_game() -> Self {
        Self {
            board: Board::default(),
            ply: 0,
            halfmove_clock: 0,
            last_move: None,
            undo_stack: Vec::new(),
        }
    }

    pub fn from_fen(fen: &str) -> EngineResult<Self> {
        let board =
            Board::from_str(fen.trim()).map_err(|_| EngineError::InvalidFen(fen.to_owned()))?;

        let halfmove_clock = match fen.split_whitespace().nth(4) {
            Some(token) => token
                .parse::<u32>()
                .map_err(|_| EngineError::InvalidFen(fen.to_owned()))?,
            None => 0,
        };
        let fullmove = match fen.split_whitespace().nth(5) {
            Some(token) => token
                .parse::<u32>()
                .map_err(|_| EngineError::InvalidFen(fen.to_owned()))?
                .max(1),
            None => 1,
        };
        let ply = (fullmove - 1) * 2 + u32::from(board.side_to_move() == Color::Black);

        Ok(Self {
            board,
            ply,
            halfmove_clock,
            last_move: None,
            undo_stack: Vec::new(),
        })
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Resolves coordinate notation (`e2e4`, `e7e8q`) against the legal moves
    /// of the current position.
    pub fn parse_move(&self, text: &str) -> EngineResult<ChessMove> {
        let invalid = || EngineError::InvalidMoveText(text.to_owned());
        let bytes = text.trim().as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return Err(invalid());
        }

        let source = square_from_bytes(bytes[0], bytes[1]).ok_or_else(invalid)?;
        let dest = square_from_bytes(bytes[2], bytes[3]).ok_or_else(invalid)?;
        let promotion = match bytes.get(4) {
            None => None,
            Some(b'q') => Some(Piece::Queen),
            Some(b'r') => Some(Piece::Rook),
            Some(b'b') => Some(Piece::Bishop),
            Some(b'n') => Some(Piece::Knight),
            Some(_) => return Err(invalid()),
        };

        let mv = ChessMove::new(source, dest, promotion);
        if self.board.legal(mv) {
            Ok(mv)
        } else {
            Err(invalid())
        }
    }

    /// Applies a whitespace-separated list of coordinate moves.
    pub fn apply_move_list(&mut self, moves: &str) -> EngineResult<()> {
        for text in moves.split_whitespace() {
            let mv = self.parse_move(text)?;
            self.apply_move(mv)?;
        }
        Ok(())
    }
}

fn square_from_bytes(file: u8, rank: u8) -> Option<Square> {
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some(Square::make_square(
        Rank::from_index(usize::from(rank - b'1')),
        File::from_index(usize::from(file - b'a')),
    ))
}

impl BoardOracle for ChessBoard {
    fn legal_moves(&self) -> Vec<ChessMove> {
        chess::MoveGen::new_legal(&self.board).collect()
    }

    fn apply_move(&mut self, mv: ChessMove) -> EngineResult<()> {
        if !self.board.legal(mv) {
            return Err(EngineError::IllegalMove {
                mv: mv.to_string(),
                fen: self.fen(),
            });
        }

        let was_capture = self.is_capture(mv);
        let pawn_move = self.board.piece_on(mv.get_source()) == Some(Piece::Pawn);
        self.undo_stack.push(UndoState {
            mv,
            board: self.board,
            halfmove_clock: self.halfmove_clock,
            last_move: self.last_move,
        });
        self.halfmove_clock = if was_capture || pawn_move {
            0
        } else {
            self.halfmove_clock + 1
        };
        self.board = self.board.make_move_new(mv);
        self.last_move = Some(PlayedMove { mv, was_capture });
        self.ply += 1;
        Ok(())
    }

    fn undo_move(&mut self) -> EngineResult<ChessMove> {
        let undo = self.undo_stack.pop().ok_or(EngineError::NothingToUndo)?;
        self.board = undo.board;
        self.halfmove_clock = undo.halfmove_clock;
        self.last_move = undo.last_move;
        self.ply -= 1;
        Ok(undo.mv)
    }

    #[inline]
    fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    #[inline]
    fn is_checkmate(&self) -> bool {
        self.board.status() == BoardStatus::Checkmate
    }

    #[inline]
    fn is_stalemate(&self) -> bool {
        self.board.status() == BoardStatus::Stalemate
    }

    #[inline]
    fn is_in_check(&self) -> bool {
        *self.board.checkers() != EMPTY
    }

    fn is_capture(&self, mv: ChessMove) -> bool {
        let source = mv.get_source();
        let dest = mv.get_dest();
        if self.board.piece_on(dest).is_some() {
            return true;
        }
        // En passant lands on an empty square.
        self.board.piece_on(source) == Some(Piece::Pawn) && source.get_file() != dest.get_file()
    }

    fn piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        let piece = self.board.piece_on(square)?;
        let color = self.board.color_on(square)?;
        Some((piece, color))
    }

    fn attacked_squares(&self, square: Square) -> BitBoard {
        let Some((piece, color)) = self.piece_at(square) else {
            return EMPTY;
        };
        let blockers = *self.board.combined();
        match piece {
            Piece::Pawn => get_pawn_attacks(square, color, !EMPTY),
            Piece::Knight => get_knight_moves(square),
            Piece::Bishop => get_bishop_moves(square, blockers),
            Piece::Rook => get_rook_moves(square, blockers),
            Piece::Queen => get_bishop_moves(square, blockers) | get_rook_moves(square, blockers),
            Piece::King => get_king_moves(square),
        }
    }

    #[inline]
    fn piece_count(&self) -> u32 {
        self.board.combined().popcnt()
    }

    #[inline]
    fn last_move(&self) -> Option<PlayedMove> {
        self.last_move
    }

    #[inline]
    fn ply(&self) -> u32 {
        self.ply
    }

    #[inline]
    fn position_key(&self) -> u64 {
        self.board.get_hash()
    }

    fn snapshot(&self) -> Self {
        Self {
            board: self.board,
            ply: self.ply,
            halfmove_clock: self.halfmove_clock,
            last_move: self.last_move,
            undo_stack: Vec::new(),
        }
    }

    /// `chess::Board` prints fixed move counters; they are rebuilt from the
    /// tracked half-move clock and ply.
    fn fen(&self) -> String {
        let text = self.board.to_string();
        let fields: Vec<&str> = text.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            fields.join(" "),
            self.halfmove_clock,
            self.ply / 2 + 1
        )
    }
}
