//! Cross-turn reuse of a searched subtree.
//!
//! When the decision leads into a forced mate, the subtree after the
//! opponent's predicted reply already contains the rest of the mating line.
//! It is kept and reused on the next turn, but only if the position actually
//! reached matches the predicted one.

use chess::ChessMove;

use crate::oracle::board_oracle::BoardOracle;
use crate::search::board_scoring::is_mate_score;
use crate::search::node::{NodeId, SearchTree};

#[derive(Debug)]
pub struct TreeCache<B> {
    root: Option<SearchTree<B>>,
}

impl<B> Default for TreeCache<B> {
    fn default() -> Self {
        Self { root: None }
    }
}

impl<B: BoardOracle> TreeCache<B> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.root = None;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Opponent move the cached subtree was built for.
    pub fn predicted_reply(&self) -> Option<ChessMove> {
        let tree = self.root.as_ref()?;
        tree[tree.root()].mv
    }

    pub fn predicted_position_key(&self) -> Option<u64> {
        let tree = self.root.as_ref()?;
        Some(tree[tree.root()].position.position_key())
    }

    /// Keeps the grandchild that carries the mate score through `chosen`, or
    /// empties the cache when the decision is not a forced mate line.
    /// Returns the predicted opponent reply.
    pub fn retain_after_decision(
        &mut self,
        tree: SearchTree<B>,
        chosen: NodeId,
    ) -> Option<ChessMove> {
        let root_score = tree[tree.root()].score();
        let keep = if is_mate_score(root_score) {
            tree[chosen]
                .children
                .iter()
                .copied()
                .find(|&reply| tree[reply].score() == root_score)
        } else {
            None
        };

        match keep {
            Some(reply) => {
                let predicted = tree[reply].mv;
                self.root = Some(tree.into_subtree(reply));
                predicted
            }
            None => {
                self.root = None;
                None
            }
        }
    }

    /// Hands out the cached tree if its root is the position on `board` and
    /// it still holds a decision. The cache is empty afterwards either way.
    pub fn take_matching(&mut self, board: &B) -> Option<SearchTree<B>> {
        let tree = self.root.take()?;
        let root = tree.root();

        if tree[root].position.position_key() != board.position_key() {
            log::debug!(
                "discarding cached tree: opponent deviated from predicted {:?}",
                tree[root].mv.map(|mv| mv.to_string())
            );
            return None;
        }
        if tree.best_children(root).is_empty() {
            log::debug!("discarding cached tree: no expanded reply");
            return None;
        }

        Some(tree)
    }
}
