//! Move ordering for the alpha-beta search.
//!
//! Every legal move gets a signed `score_change`: the value of the captured
//! piece plus the positional terms of the current game phase. Moves sharing a
//! score form a group; groups are sorted best first, and a group may be
//! shuffled so equally rated moves are tried in varying order.

use chess::{ChessMove, Piece};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::oracle::board_oracle::BoardOracle;
use crate::search::board_scoring::piece_value;
use crate::search::phase::{
    distance_to_any_edge, distance_to_center, distance_to_promotion_rank, distance_to_side_edge,
    GamePhase, PhaseWeights,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: ChessMove,
    /// Estimated gain for the mover; the search adds it for White and
    /// subtracts it for Black.
    pub score_change: i32,
}

#[derive(Debug, Clone, Default)]
pub struct OrderedMoves {
    pub moves: Vec<ScoredMove>,
    /// The previous ply captured on a square that can be recaptured now.
    pub has_capture: bool,
}

pub fn order_moves<B, R>(board: &B, shuffle: Option<&mut R>) -> OrderedMoves
where
    B: BoardOracle,
    R: Rng + ?Sized,
{
    let legal = board.legal_moves();
    let weights = GamePhase::from_piece_count(board.piece_count()).weights();
    let in_check = board.is_in_check();

    let recapture_square = board
        .last_move()
        .filter(|last| last.was_capture)
        .map(|last| last.mv.get_dest());
    let mut has_capture = false;

    // Groups keep first-seen order so an unshuffled ordering is stable.
    let mut groups: Vec<(i32, Vec<ChessMove>)> = Vec::new();
    for mv in legal {
        if recapture_square == Some(mv.get_dest()) && board.is_capture(mv) {
            has_capture = true;
        }

        let score_change = score_move(board, mv, weights, in_check);
        match groups.iter_mut().find(|(score, _)| *score == score_change) {
            Some((_, group)) => group.push(mv),
            None => groups.push((score_change, vec![mv])),
        }
    }

    if let Some(rng) = shuffle {
        for (_, group) in groups.iter_mut() {
            group.shuffle(rng);
        }
    }
    groups.sort_by(|a, b| b.0.cmp(&a.0));

    let moves = groups
        .into_iter()
        .flat_map(|(score_change, group)| {
            group
                .into_iter()
                .map(move |mv| ScoredMove { mv, score_change })
        })
        .collect();

    OrderedMoves { moves, has_capture }
}

pub(crate) fn score_move<B: BoardOracle>(
    board: &B,
    mv: ChessMove,
    weights: &PhaseWeights,
    in_check: bool,
) -> i32 {
    let source = mv.get_source();
    let dest = mv.get_dest();
    let mut score_change = 0;

    if board.is_capture(mv) {
        score_change += board
            .piece_at(dest)
            .map_or(piece_value(Piece::Pawn), |(piece, _)| piece_value(piece));
    }

    let Some((piece, color)) = board.piece_at(source) else {
        return score_change;
    };

    if in_check {
        score_change += weights.check_bonus;
    }

    if matches!(piece, Piece::Pawn | Piece::Knight | Piece::Bishop) {
        score_change +=
            (distance_to_center(source) - distance_to_center(dest)) * weights.minor_centralization;
    }

    if weights.mobility != 0 {
        let before = board.attacked_squares(source).popcnt() as i32;
        let after = board.attacked_squares(dest).popcnt() as i32;
        score_change += (after - before) * weights.mobility;
    }

    match piece {
        Piece::Pawn => {
            score_change += (distance_to_promotion_rank(source, color)
                - distance_to_promotion_rank(dest, color))
                * weights.pawn_advance;
        }
        Piece::King => {
            score_change += (distance_to_side_edge(source) - distance_to_side_edge(dest))
                * weights.king_to_side_edge;
            score_change += (distance_to_any_edge(dest) - distance_to_any_edge(source))
                * weights.king_activity;
        }
        _ => {}
    }

    score_change
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::chess_board::ChessBoard;
    use chess::Square;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ordered(board: &ChessBoard) -> OrderedMoves {
        order_moves::<_, StdRng>(board, None)
    }

    #[test]
    fn opening_prefers_centralizing_knights() {
        let board = ChessBoard::new_game();
        let out = ordered(&board);

        assert_eq!(out.moves.len(), 20);
        assert!(!out.has_capture);
        assert_eq!(out.moves[0].score_change, 30);
        assert_eq!(out.moves[1].score_change, 30);
        for scored in &out.moves[..2] {
            assert_eq!(
                board.piece_at(scored.mv.get_source()).map(|(p, _)| p),
                Some(Piece::Knight)
            );
        }
        assert!(out
            .moves
            .windows(2)
            .all(|pair| pair[0].score_change >= pair[1].score_change));
    }

    #[test]
    fn captures_lead_the_ordering() {
        let board =
            ChessBoard::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 30").expect("FEN should parse");
        let out = ordered(&board);
        assert_eq!(out.moves[0].mv, ChessMove::new(Square::E4, Square::D5, None));
        assert_eq!(out.moves[0].score_change, 800);
    }

    #[test]
    fn en_passant_is_valued_as_a_pawn() {
        let board =
            ChessBoard::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").expect("FEN should parse");
        let out = ordered(&board);
        assert_eq!(out.moves[0].mv, ChessMove::new(Square::E5, Square::D6, None));
        assert_eq!(out.moves[0].score_change, 100);
    }

    #[test]
    fn endgame_rewards_king_activity() {
        let board =
            ChessBoard::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").expect("FEN should parse");
        let weights = GamePhase::Endgame.weights();
        let up = ChessMove::new(Square::E1, Square::D2, None);
        let along = ChessMove::new(Square::E1, Square::F1, None);
        assert_eq!(score_move(&board, up, weights, false), 25);
        assert_eq!(score_move(&board, along, weights, false), 0);
        assert_eq!(score_move(&board, along, weights, true), 5);
    }

    #[test]
    fn middlegame_terms() {
        let board = ChessBoard::from_fen(
            "r1bqk2r/pppp1ppp/2n5/4p3/4P3/2N5/PPPP1PPP/R1BQK2R w KQkq - 0 8",
        )
        .expect("FEN should parse");
        assert_eq!(board.piece_count(), 28);
        let weights = GamePhase::Middlegame.weights();

        // Advance +10, pawn loses its single b3 attack.
        let pawn = ChessMove::new(Square::A2, Square::A3, None);
        assert_eq!(score_move(&board, pawn, weights, false), 9);

        // Toward the h-file +10, five king attacks measured on an empty f1.
        let king = ChessMove::new(Square::E1, Square::F1, None);
        assert_eq!(score_move(&board, king, weights, false), 5);
    }

    #[test]
    fn pending_recapture_sets_has_capture() {
        let mut board = ChessBoard::from_fen("4k3/8/5n2/3p4/4P3/8/8/4K3 w - - 0 30")
            .expect("FEN should parse");

        board.apply_move_list("e4d5").expect("capture is legal");
        assert!(ordered(&board).has_capture);
        board.undo_move().expect("undo capture");

        board.apply_move_list("e4e5").expect("push is legal");
        assert!(!ordered(&board).has_capture);
    }

    #[test]
    fn capture_without_recapture_is_not_pending() {
        let mut board =
            ChessBoard::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 30").expect("FEN should parse");
        board.apply_move_list("e4d5").expect("capture is legal");
        assert!(!ordered(&board).has_capture);
    }

    #[test]
    fn shuffling_only_permutes_within_groups() {
        let board = ChessBoard::new_game();
        let plain = ordered(&board);
        let mut rng = StdRng::seed_from_u64(7);
        let shuffled = order_moves(&board, Some(&mut rng));

        let scores = |o: &OrderedMoves| o.moves.iter().map(|m| m.score_change).collect::<Vec<_>>();
        assert_eq!(scores(&plain), scores(&shuffled));

        let mut a: Vec<_> = plain.moves.iter().map(|m| m.mv.to_string()).collect();
        let mut b: Vec<_> = shuffled.moves.iter().map(|m| m.mv.to_string()).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }
}
