//! Search tree of position snapshots.
//!
//! Nodes live in an arena owned by `SearchTree`; a node owns its children
//! through their ids and refers to its parent by a non-owning id. Dropping
//! the tree, or re-rooting it with `into_subtree`, releases every node that is
//! no longer reachable from the kept root.

use std::cell::OnceCell;
use std::ops::Index;

use chess::ChessMove;

use crate::errors::{EngineError, EngineResult};
use crate::oracle::board_oracle::BoardOracle;
use crate::search::board_scoring::{material_balance, Terminal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct Node<B> {
    pub position: B,
    /// Move that produced this node; `None` for the root.
    pub mv: Option<ChessMove>,
    /// Cumulative material and positional estimate along the line from the
    /// root, White positive.
    pub material: i32,
    pub terminal: Option<Terminal>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub depth: u8,
    evaluation: OnceCell<i32>,
}

impl<B> Node<B> {
    /// Terminal score if the game is over here, else the backed-up
    /// evaluation, else the cumulative material estimate.
    #[inline]
    pub fn score(&self) -> i32 {
        match self.terminal {
            Some(terminal) => terminal.score(),
            None => self.evaluation().unwrap_or(self.material),
        }
    }

    #[inline]
    pub fn evaluation(&self) -> Option<i32> {
        self.evaluation.get().copied()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }
}

#[derive(Debug)]
pub struct SearchTree<B> {
    nodes: Vec<Node<B>>,
}

impl<B: BoardOracle> SearchTree<B> {
    /// Builds a one-node tree for `board`, counting its material from scratch.
    pub fn new_root(board: &B) -> Self {
        let root = Node {
            position: board.snapshot(),
            mv: None,
            material: material_balance(board),
            terminal: Terminal::detect(board),
            parent: None,
            children: Vec::new(),
            depth: 0,
            evaluation: OnceCell::new(),
        };
        Self { nodes: vec![root] }
    }

    pub fn add_child(
        &mut self,
        parent: NodeId,
        position: B,
        mv: ChessMove,
        material: i32,
        terminal: Option<Terminal>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let depth = self.nodes[parent.0].depth.saturating_add(1);
        self.nodes.push(Node {
            position,
            mv: Some(mv),
            material,
            terminal,
            parent: Some(parent),
            children: Vec::new(),
            depth,
            evaluation: OnceCell::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

impl<B> SearchTree<B> {
    #[inline]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn set_evaluation(&mut self, id: NodeId, score: i32) -> EngineResult<()> {
        self.nodes[id.0]
            .evaluation
            .set(score)
            .map_err(|_| EngineError::EvaluationAlreadySet(id.0))
    }

    /// Children whose score equals the node's own score, in expansion order.
    pub fn best_children(&self, id: NodeId) -> Vec<NodeId> {
        let target = self[id].score();
        self[id]
            .children
            .iter()
            .copied()
            .filter(|&child| self[child].score() == target)
            .collect()
    }

    /// Line obtained by always following the first best child.
    pub fn principal_variation(&self, from: NodeId) -> Vec<ChessMove> {
        let mut line = Vec::new();
        let mut current = from;
        while let Some(&next) = self.best_children(current).first() {
            if let Some(mv) = self[next].mv {
                line.push(mv);
            }
            current = next;
        }
        line
    }

    /// Moves from the root down to `id`, recovered through parent links.
    pub fn line_to(&self, id: NodeId) -> Vec<ChessMove> {
        let mut line = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self[node_id];
            if let Some(mv) = node.mv {
                line.push(mv);
            }
            current = node.parent;
        }
        line.reverse();
        line
    }

    /// Keeps only the subtree under `new_root`, which becomes the root of the
    /// returned tree with depth 0. Every other node is dropped.
    pub fn into_subtree(self, new_root: NodeId) -> Self {
        let mut order = vec![new_root];
        let mut cursor = 0;
        while cursor < order.len() {
            order.extend(self.nodes[order[cursor].0].children.iter().copied());
            cursor += 1;
        }

        let mut remap = vec![None; self.nodes.len()];
        for (new_index, old) in order.iter().enumerate() {
            remap[old.0] = Some(NodeId(new_index));
        }

        let base_depth = self.nodes[new_root.0].depth;
        let mut slots: Vec<Option<Node<B>>> = self.nodes.into_iter().map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());
        for old in order {
            let Some(mut node) = slots[old.0].take() else {
                continue;
            };
            node.parent = if old == new_root {
                None
            } else {
                node.parent.and_then(|parent| remap[parent.0])
            };
            node.children = node
                .children
                .iter()
                .filter_map(|child| remap[child.0])
                .collect();
            node.depth -= base_depth;
            nodes.push(node);
        }

        Self { nodes }
    }
}

impl<B> Index<NodeId> for SearchTree<B> {
    type Output = Node<B>;

    #[inline]
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::chess_board::ChessBoard;
    use crate::search::board_scoring::WHITE_WIN_SCORE;

    fn child(tree: &mut SearchTree<ChessBoard>, parent: NodeId, text: &str, material: i32) -> NodeId {
        let mut board = tree[parent].position.clone();
        let mv = board.parse_move(text).expect("test move is legal");
        board.apply_move(mv).expect("test move applies");
        let terminal = Terminal::detect(&board);
        tree.add_child(parent, board.snapshot(), mv, material, terminal)
    }

    #[test]
    fn root_counts_material_and_depths_increase() {
        let board =
            ChessBoard::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 40").expect("FEN should parse");
        let mut tree = SearchTree::new_root(&board);
        let root = tree.root();
        assert_eq!(tree[root].material, 500);
        assert_eq!(tree[root].score(), 500);
        assert_eq!(tree[root].depth, 0);

        let a = child(&mut tree, root, "a1a7", 510);
        let b = child(&mut tree, a, "e8f8", 505);
        assert_eq!(tree[a].depth, 1);
        assert_eq!(tree[b].depth, 2);
        assert_eq!(tree[b].parent, Some(a));
        assert_eq!(tree[root].children, vec![a]);
        assert_eq!(tree.line_to(b).len(), 2);
    }

    #[test]
    fn evaluation_is_single_assignment() {
        let mut tree = SearchTree::new_root(&ChessBoard::new_game());
        let root = tree.root();
        assert_eq!(tree[root].evaluation(), None);

        tree.set_evaluation(root, 42).expect("first assignment succeeds");
        assert_eq!(tree[root].score(), 42);

        let err = tree
            .set_evaluation(root, 7)
            .expect_err("second assignment must fail");
        assert_eq!(err, EngineError::EvaluationAlreadySet(0));
        assert_eq!(tree[root].score(), 42);
    }

    #[test]
    fn terminal_overrides_material_and_evaluation() {
        let board =
            ChessBoard::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 30").expect("FEN should parse");
        let mut tree = SearchTree::new_root(&board);
        let root = tree.root();
        let mate = child(&mut tree, root, "a1a8", 0);
        assert!(tree[mate].is_terminal());
        assert_eq!(tree[mate].score(), WHITE_WIN_SCORE);
    }

    #[test]
    fn subtree_keeps_only_reachable_nodes() {
        let mut tree = SearchTree::new_root(&ChessBoard::new_game());
        let root = tree.root();
        let e4 = child(&mut tree, root, "e2e4", 20);
        let d4 = child(&mut tree, root, "d2d4", 20);
        let e5 = child(&mut tree, e4, "e7e5", 0);
        let _c5 = child(&mut tree, e4, "c7c5", 10);
        let _nf3 = child(&mut tree, e5, "g1f3", 30);
        let _d5 = child(&mut tree, d4, "d7d5", 0);
        assert_eq!(tree.len(), 7);

        let expected_key = tree[e4].position.position_key();
        let sub = tree.into_subtree(e4);
        let new_root = sub.root();
        assert_eq!(sub.len(), 4);
        assert_eq!(sub[new_root].parent, None);
        assert_eq!(sub[new_root].depth, 0);
        assert_eq!(sub[new_root].position.position_key(), expected_key);
        assert_eq!(sub[new_root].children.len(), 2);

        let first = sub[new_root].children[0];
        assert_eq!(sub[first].parent, Some(new_root));
        assert_eq!(sub[first].depth, 1);
        assert_eq!(sub[sub[first].children[0]].depth, 2);
    }
}
