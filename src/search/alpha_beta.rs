//! Minimax search with alpha-beta pruning and capture extension.
//!
//! White nodes maximise and Black nodes minimise a White-positive score.
//! Every explored move becomes a permanent child node, so after a search the
//! tree holds the explored lines with their backed-up evaluations. The
//! working board is advanced with `apply_move` and restored with `undo_move`
//! around each recursive call.

use chess::Color;
use rand::rngs::StdRng;

use crate::errors::{EngineError, EngineResult};
use crate::oracle::board_oracle::BoardOracle;
use crate::search::board_scoring::{Terminal, SEARCH_CEILING, SEARCH_FLOOR};
use crate::search::move_ordering::{order_moves, ScoredMove};
use crate::search::node::{NodeId, SearchTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffMode {
    /// Cut as soon as `beta <= alpha`.
    Standard,
    /// Cut only once `beta < alpha`, so siblings tying the bound are still
    /// searched and equal root replies keep exact scores.
    Diversity,
}

impl CutoffMode {
    #[inline]
    pub const fn is_cutoff(self, alpha: i32, beta: i32) -> bool {
        match self {
            CutoffMode::Standard => beta <= alpha,
            CutoffMode::Diversity => beta < alpha,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes visited by the search, root included.
    pub nodes: u64,
    /// Nodes expanded past the nominal depth because a recapture was pending.
    pub extended: u64,
    /// Deepest ply created.
    pub max_ply: u8,
}

pub struct AlphaBetaSearch<'r> {
    max_depth: u8,
    mode: CutoffMode,
    /// Shuffles equal-score move groups when present.
    rng: Option<&'r mut StdRng>,
    stats: SearchStats,
}

impl<'r> AlphaBetaSearch<'r> {
    pub fn new(max_depth: u8, mode: CutoffMode, rng: Option<&'r mut StdRng>) -> Self {
        Self {
            max_depth,
            mode,
            rng,
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Builds a tree rooted at `board` and searches it with open bounds.
    /// `board` is returned to its original position.
    pub fn run<B: BoardOracle>(&mut self, board: &mut B) -> EngineResult<SearchTree<B>> {
        let mut tree = SearchTree::new_root(board);
        let root = tree.root();
        self.search(&mut tree, root, board, SEARCH_FLOOR, SEARCH_CEILING)?;
        Ok(tree)
    }

    pub fn search<B: BoardOracle>(
        &mut self,
        tree: &mut SearchTree<B>,
        id: NodeId,
        board: &mut B,
        mut alpha: i32,
        mut beta: i32,
    ) -> EngineResult<()> {
        self.stats.nodes += 1;

        if tree[id].is_terminal() {
            return Ok(());
        }

        let ordered = order_moves(board, self.rng.as_deref_mut());
        let depth = tree[id].depth;
        if depth >= self.max_depth {
            if !ordered.has_capture {
                return Ok(());
            }
            self.stats.extended += 1;
        }

        if ordered.moves.is_empty() {
            return Err(EngineError::NoLegalMoves(board.fen()));
        }

        let white = board.side_to_move() == Color::White;
        let material = tree[id].material;
        let mut running = if white { SEARCH_FLOOR } else { SEARCH_CEILING };

        for ScoredMove { mv, score_change } in ordered.moves {
            board.apply_move(mv)?;
            let child_material = if white {
                material + score_change
            } else {
                material - score_change
            };
            let child = tree.add_child(
                id,
                board.snapshot(),
                mv,
                child_material,
                Terminal::detect(board),
            );
            self.stats.max_ply = self.stats.max_ply.max(tree[child].depth);

            let outcome = self.search(tree, child, board, alpha, beta);
            board.undo_move()?;
            outcome?;

            let child_score = tree[child].score();
            if white {
                running = running.max(child_score);
                alpha = alpha.max(running);
            } else {
                running = running.min(child_score);
                beta = beta.min(running);
            }

            if self.mode.is_cutoff(alpha, beta) {
                break;
            }
        }

        tree.set_evaluation(id, running)
    }
}
