//! Errors used throughout the search engine.
//!
//! `EngineError` is the single error type returned by the board adapter, the
//! search, the engine facade and the UCI front-end. Variants fall in three
//! groups:
//! - input errors (`InvalidFen`, `InvalidMoveText`, `InvalidOption`) that a
//!   host can report back to the user;
//! - rules-engine failures (`IllegalMove`, `NothingToUndo`) that abort the
//!   current decision, since continuing would corrupt the material accounting
//!   of the search tree;
//! - invariant violations (`NoLegalMoves`, `EvaluationAlreadySet`) that point
//!   at a bug and are never recovered from.

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The rules engine refused a move for the given position.
    ///
    /// Payload: move text and FEN of the position it was applied to.
    #[error("illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },

    /// `undo_move` was called with an empty undo stack.
    #[error("no move left to undo")]
    NothingToUndo,

    /// FEN text could not be parsed.
    #[error("invalid FEN '{0}'")]
    InvalidFen(String),

    /// A move in coordinate notation (`e2e4`, `e7e8q`) could not be parsed or
    /// does not match any legal move.
    #[error("invalid move text '{0}'")]
    InvalidMoveText(String),

    /// A non-terminal position produced no legal moves.
    #[error("no legal moves in non-terminal position {0}")]
    NoLegalMoves(String),

    /// `choose_move` was asked to move in a finished game.
    #[error("game is already over ({0})")]
    GameOver(&'static str),

    /// A node evaluation was assigned twice.
    #[error("evaluation of node {0} was already set")]
    EvaluationAlreadySet(usize),

    /// Option name/value rejected by `set_option`.
    #[error("invalid value '{value}' for option '{name}'")]
    InvalidOption { name: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::EngineError;

    #[test]
    fn display_carries_context() {
        let err = EngineError::IllegalMove {
            mv: "e2e5".to_owned(),
            fen: "8/8/8/8/8/8/8/8 w - - 0 1".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "illegal move e2e5 in position 8/8/8/8/8/8/8/8 w - - 0 1"
        );
        assert_eq!(
            EngineError::InvalidOption {
                name: "Depth".to_owned(),
                value: "x".to_owned()
            }
            .to_string(),
            "invalid value 'x' for option 'Depth'"
        );
    }
}
