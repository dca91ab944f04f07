//! Game phase classification and the positional weight table.
//!
//! The phase is a pure function of the number of pieces on the board. Each
//! phase selects one row of `PhaseWeights`; a zero weight switches the term
//! off for that phase.

use chess::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

impl GamePhase {
    /// More than 28 pieces is the opening, 21..=28 the middlegame, the rest
    /// the endgame.
    #[inline]
    pub const fn from_piece_count(pieces: u32) -> Self {
        if pieces > 28 {
            GamePhase::Opening
        } else if pieces > 20 {
            GamePhase::Middlegame
        } else {
            GamePhase::Endgame
        }
    }

    #[inline]
    pub const fn weights(self) -> &'static PhaseWeights {
        match self {
            GamePhase::Opening => &OPENING_WEIGHTS,
            GamePhase::Middlegame => &MIDDLEGAME_WEIGHTS,
            GamePhase::Endgame => &ENDGAME_WEIGHTS,
        }
    }
}

/// Weighted positional terms used by move ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseWeights {
    /// Pawns, knights and bishops closing in on d4/d5/e4/e5.
    pub minor_centralization: i32,
    /// Flat bonus for every move while the side to move is in check.
    pub check_bonus: i32,
    /// Change in attacked-square count between origin and destination.
    pub mobility: i32,
    /// Pawns closing in on their promotion rank.
    pub pawn_advance: i32,
    /// King closing in on the a- or h-file.
    pub king_to_side_edge: i32,
    /// King moving away from all four edges.
    pub king_activity: i32,
}

const OPENING_WEIGHTS: PhaseWeights = PhaseWeights {
    minor_centralization: 10,
    check_bonus: 0,
    mobility: 0,
    pawn_advance: 0,
    king_to_side_edge: 0,
    king_activity: 0,
};

const MIDDLEGAME_WEIGHTS: PhaseWeights = PhaseWeights {
    minor_centralization: 0,
    check_bonus: 5,
    mobility: 1,
    pawn_advance: 10,
    king_to_side_edge: 10,
    king_activity: 0,
};

const ENDGAME_WEIGHTS: PhaseWeights = PhaseWeights {
    minor_centralization: 0,
    check_bonus: 5,
    mobility: 0,
    pawn_advance: 0,
    king_to_side_edge: 0,
    king_activity: 25,
};

#[inline]
fn coords(square: Square) -> (i32, i32) {
    (
        square.get_file().to_index() as i32,
        square.get_rank().to_index() as i32,
    )
}

#[inline]
pub fn manhattan_distance(a: Square, b: Square) -> i32 {
    let (fa, ra) = coords(a);
    let (fb, rb) = coords(b);
    (fa - fb).abs() + (ra - rb).abs()
}

/// Distance to the nearest of d4, d5, e4, e5.
pub fn distance_to_center(square: Square) -> i32 {
    [Square::D4, Square::D5, Square::E4, Square::E5]
        .into_iter()
        .map(|center| manhattan_distance(square, center))
        .min()
        .unwrap_or(0)
}

/// Ranks left before a pawn of the given color reaches its last rank.
#[inline]
pub fn distance_to_promotion_rank(square: Square, color: chess::Color) -> i32 {
    let (_, rank) = coords(square);
    match color {
        chess::Color::White => 7 - rank,
        chess::Color::Black => rank,
    }
}

/// Distance to the nearer of the a- and h-files.
#[inline]
pub fn distance_to_side_edge(square: Square) -> i32 {
    let (file, _) = coords(square);
    file.min(7 - file)
}

/// Distance to the nearest of the four board edges.
#[inline]
pub fn distance_to_any_edge(square: Square) -> i32 {
    let (file, rank) = coords(square);
    file.min(7 - file).min(rank).min(7 - rank)
}
