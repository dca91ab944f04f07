//! Alpha-beta engine facade.
//!
//! Per move: adapt the depth to the clock, reuse the cached mating subtree
//! when the opponent played the predicted reply, otherwise search a fresh
//! tree, pick among the equally scored root moves and keep the subtree that
//! continues a forced mate.

use std::time::Instant;

use chess::{ChessMove, Color};
use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engines::conversation::{LogSink, MessageSink};
use crate::engines::engine_trait::{ClockState, Engine, EngineConfig, EngineOutput};
use crate::engines::time_management::DepthController;
use crate::errors::{EngineError, EngineResult};
use crate::oracle::board_oracle::BoardOracle;
use crate::search::alpha_beta::{AlphaBetaSearch, CutoffMode};
use crate::search::board_scoring::{is_mate_score, Terminal};
use crate::search::node::{NodeId, SearchTree};
use crate::search::tree_cache::TreeCache;

const ENGINE_NAME: &str = "Arbor Chess";
const ENGINE_AUTHOR: &str = "arbor_chess developers";

pub struct AlphaBetaEngine<B, S = LogSink> {
    config: EngineConfig,
    controller: DepthController,
    cache: TreeCache<B>,
    rng: StdRng,
    sink: S,
}

impl<B: BoardOracle> AlphaBetaEngine<B, LogSink> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_sink(config, LogSink)
    }
}

impl<B: BoardOracle> Default for AlphaBetaEngine<B, LogSink> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<B: BoardOracle, S: MessageSink> AlphaBetaEngine<B, S> {
    pub fn with_sink(config: EngineConfig, sink: S) -> Self {
        Self {
            controller: DepthController::new(&config),
            cache: TreeCache::new(),
            rng: build_rng(config.seed),
            config,
            sink,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn max_depth(&self) -> u8 {
        self.controller.max_depth()
    }

    /// Opponent reply the cached subtree expects, if a mate line is cached.
    pub fn predicted_reply(&self) -> Option<ChessMove> {
        self.cache.predicted_reply()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn rebuild_controller(&mut self) {
        let spent = self.controller.time_spent();
        self.controller = DepthController::new(&self.config);
        self.controller.record(spent, std::time::Duration::ZERO);
    }

    fn fresh_search(
        &mut self,
        board: &B,
        diversity: bool,
    ) -> EngineResult<(SearchTree<B>, u64)> {
        let depth = self.controller.max_depth();
        let (mode, rng) = if diversity {
            (CutoffMode::Diversity, Some(&mut self.rng))
        } else {
            (CutoffMode::Standard, None)
        };

        let mut working = board.snapshot();
        let mut search = AlphaBetaSearch::new(depth, mode, rng);
        let tree = search.run(&mut working)?;
        let stats = search.stats();
        log::debug!(
            "searched depth {depth} ({mode:?}): {} nodes, {} extended, deepest ply {}",
            stats.nodes,
            stats.extended,
            stats.max_ply
        );
        Ok((tree, stats.nodes))
    }
}

impl<B: BoardOracle, S: MessageSink> Engine<B> for AlphaBetaEngine<B, S> {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn author(&self) -> &str {
        ENGINE_AUTHOR
    }

    fn new_game(&mut self) {
        self.cache.clear();
        self.controller.reset();
    }

    fn set_option(&mut self, name: &str, value: &str) -> EngineResult<()> {
        let invalid = || EngineError::InvalidOption {
            name: name.to_owned(),
            value: value.to_owned(),
        };

        if name.eq_ignore_ascii_case("Depth") {
            let depth = value.trim().parse::<u8>().map_err(|_| invalid())?;
            if depth == 0 {
                return Err(invalid());
            }
            self.config.initial_depth = depth;
            self.rebuild_controller();
        } else if name.eq_ignore_ascii_case("OpeningPlies") {
            self.config.opening_plies = value.trim().parse::<u32>().map_err(|_| invalid())?;
            self.rebuild_controller();
        } else if name.eq_ignore_ascii_case("Diversity") {
            self.config.diversity = parse_flag(value).ok_or_else(invalid)?;
        } else if name.eq_ignore_ascii_case("Seed") {
            let seed = value.trim().parse::<u64>().map_err(|_| invalid())?;
            self.config.seed = Some(seed);
            self.rng = StdRng::seed_from_u64(seed);
        } else {
            log::debug!("ignoring unknown option '{name}'");
        }
        Ok(())
    }

    fn choose_move(&mut self, board: &B, clock: &ClockState) -> EngineResult<EngineOutput> {
        let started = Instant::now();

        match Terminal::detect(board) {
            Some(Terminal::Checkmate { .. }) => return Err(EngineError::GameOver("checkmate")),
            Some(Terminal::Stalemate) => return Err(EngineError::GameOver("stalemate")),
            None => {}
        }

        let ply = board.ply();
        if let Some(change) = self.controller.prepare(ply, clock) {
            let text = change.message();
            log::info!("depth {} -> {} at ply {ply}", change.from, change.to);
            self.sink.broadcast(&text);
        }
        let depth = self.controller.max_depth();
        let diversity = self.config.diversity && self.controller.is_opening(ply);

        let (tree, nodes, reused_cache) = match self.cache.take_matching(board) {
            Some(tree) => {
                log::info!("reusing cached mate line ({} nodes)", tree.len());
                (tree, 0, true)
            }
            None => {
                let (tree, nodes) = self.fresh_search(board, diversity)?;
                (tree, nodes, false)
            }
        };

        let side = board.side_to_move();
        let rng = if diversity { Some(&mut self.rng) } else { None };
        let chosen = pick_root_child(&tree, side, rng)
            .ok_or_else(|| EngineError::NoLegalMoves(board.fen()))?;
        let best_move = tree[chosen]
            .mv
            .ok_or_else(|| EngineError::NoLegalMoves(board.fen()))?;

        let score = tree[tree.root()].score();
        let mut principal_variation = vec![best_move];
        principal_variation.extend(tree.principal_variation(chosen));

        if is_mate_score(score) && !reused_cache {
            let moves = principal_variation.len().div_ceil(2);
            if wins_for(score, side) {
                log::info!("forced mate in {moves} found");
                self.sink
                    .broadcast(&format!("I see a forced mate in {moves}."));
            } else {
                log::info!("facing a forced mate in {moves}");
            }
        }

        let predicted = self.cache.retain_after_decision(tree, chosen);
        if let Some(reply) = predicted {
            log::debug!("caching mate line, expecting {reply}");
        }

        let elapsed = started.elapsed();
        self.controller.record(elapsed, clock.increment);

        let pv_text = principal_variation
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let info_lines = vec![
            format!(
                "info depth {depth} score {} nodes {nodes} time {} pv {pv_text}",
                uci_score(score, side, principal_variation.len()),
                elapsed.as_millis()
            ),
            format!(
                "info string alpha_beta reused_cache {reused_cache} diversity {diversity} time_spent_ms {}",
                self.controller.time_spent().as_millis()
            ),
        ];

        Ok(EngineOutput {
            best_move,
            score,
            depth,
            nodes,
            reused_cache,
            principal_variation,
            info_lines,
        })
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[inline]
fn wins_for(score: i32, side: Color) -> bool {
    (score > 0) == (side == Color::White)
}

/// Picks the move to play among the root children tied with the root score.
///
/// Without `rng` the search ran with standard cutoffs, and only the first
/// tied child carries an exact score; later ties may be bounds left by a
/// cutoff, so the first one is played. With `rng` every tie is exact: under a
/// mate score the winner keeps the shortest line and the loser the longest,
/// then one is drawn at random.
fn pick_root_child<B>(
    tree: &SearchTree<B>,
    side: Color,
    rng: Option<&mut StdRng>,
) -> Option<NodeId> {
    let root = tree.root();
    let candidates = tree.best_children(root);
    let Some(rng) = rng else {
        return candidates.first().copied();
    };

    let score = tree[root].score();
    if !is_mate_score(score) || candidates.len() < 2 {
        return candidates.choose(rng).copied();
    }

    let lengths: Vec<usize> = candidates
        .iter()
        .map(|&child| tree.principal_variation(child).len())
        .collect();
    let target = if wins_for(score, side) {
        lengths.iter().min().copied()
    } else {
        lengths.iter().max().copied()
    };
    let shortlist: Vec<NodeId> = candidates
        .into_iter()
        .zip(lengths)
        .filter(|&(_, len)| Some(len) == target)
        .map(|(child, _)| child)
        .collect();
    shortlist.choose(rng).copied()
}

fn uci_score(score: i32, side: Color, pv_len: usize) -> String {
    let relative = if side == Color::White { score } else { -score };
    if is_mate_score(score) {
        let moves = pv_len.div_ceil(2);
        if relative > 0 {
            format!("mate {moves}")
        } else {
            format!("mate -{moves}")
        }
    } else {
        format!("cp {relative}")
    }
}
