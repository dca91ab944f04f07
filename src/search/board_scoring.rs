//! Score constants, material values and terminal-state scoring.
//!
//! Scores are always from White's point of view: positive favours White,
//! negative favours Black. Win sentinels sit far outside any reachable
//! material total so a mate always dominates ordinary comparisons.

use chess::{Color, Piece, ALL_SQUARES};

use crate::oracle::board_oracle::BoardOracle;

pub const WHITE_WIN_SCORE: i32 = 100_000;
pub const BLACK_WIN_SCORE: i32 = -100_000;

/// Initial alpha: strictly below every attainable score.
pub const SEARCH_FLOOR: i32 = BLACK_WIN_SCORE - 1;
/// Initial beta: strictly above every attainable score.
pub const SEARCH_CEILING: i32 = WHITE_WIN_SCORE + 1;

#[inline]
pub const fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 300,
        Piece::Bishop => 300,
        Piece::Rook => 500,
        Piece::Queen => 800,
        Piece::King => 0,
    }
}

#[inline]
pub const fn is_mate_score(score: i32) -> bool {
    score == WHITE_WIN_SCORE || score == BLACK_WIN_SCORE
}

/// Full material count, White minus Black.
pub fn material_balance<B: BoardOracle>(board: &B) -> i32 {
    ALL_SQUARES
        .iter()
        .filter_map(|&square| board.piece_at(square))
        .map(|(piece, color)| match color {
            Color::White => piece_value(piece),
            Color::Black => -piece_value(piece),
        })
        .sum()
}

/// Game-ending states that override material scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// The side to move is mated.
    Checkmate { mated: Color },
    Stalemate,
}

impl Terminal {
    pub fn detect<B: BoardOracle>(board: &B) -> Option<Self> {
        if board.is_checkmate() {
            Some(Terminal::Checkmate {
                mated: board.side_to_move(),
            })
        } else if board.is_stalemate() {
            Some(Terminal::Stalemate)
        } else {
            None
        }
    }

    #[inline]
    pub const fn score(self) -> i32 {
        match self {
            Terminal::Checkmate {
                mated: Color::Black,
            } => WHITE_WIN_SCORE,
            Terminal::Checkmate {
                mated: Color::White,
            } => BLACK_WIN_SCORE,
            Terminal::Stalemate => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::chess_board::ChessBoard;

    #[test]
    fn start_position_is_balanced() {
        assert_eq!(material_balance(&ChessBoard::new_game()), 0);
    }

    #[test]
    fn material_counts_white_positive() {
        let board =
            ChessBoard::from_fen("4k3/8/8/8/8/8/8/QR2K3 w - - 0 1").expect("FEN should parse");
        assert_eq!(material_balance(&board), 1300);

        let board =
            ChessBoard::from_fen("rn2k3/8/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        assert_eq!(material_balance(&board), -800);
    }

    #[test]
    fn sentinels_exceed_any_material_total() {
        // Nine queens, two rooks, two knights, two bishops for one side.
        let max_material = 9 * 800 + 2 * 500 + 4 * 300;
        assert!(WHITE_WIN_SCORE > max_material * 2);
        assert!(SEARCH_FLOOR < BLACK_WIN_SCORE);
        assert!(SEARCH_CEILING > WHITE_WIN_SCORE);
    }

    #[test]
    fn terminal_scores() {
        let black_mated = ChessBoard::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 30")
            .expect("FEN should parse");
        let terminal = Terminal::detect(&black_mated).expect("position is mate");
        assert_eq!(terminal.score(), WHITE_WIN_SCORE);

        let white_mated = ChessBoard::from_fen("6k1/8/8/8/8/8/5PPP/r5K1 w - - 0 30")
            .expect("FEN should parse");
        assert_eq!(
            Terminal::detect(&white_mated).map(Terminal::score),
            Some(BLACK_WIN_SCORE)
        );

        let stalemate =
            ChessBoard::from_fen("k7/2Q5/1K6/8/8/8/8/8 b - - 0 50").expect("FEN should parse");
        assert_eq!(Terminal::detect(&stalemate), Some(Terminal::Stalemate));
        assert_eq!(Terminal::Stalemate.score(), 0);

        assert_eq!(Terminal::detect(&ChessBoard::new_game()), None);
    }
}
