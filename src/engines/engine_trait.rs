//! Engine abstraction layer used by the host front-end.
//!
//! Defines the clock and configuration inputs and the output payload so a
//! host can drive any engine behind one trait, one game per engine instance.

use std::time::Duration;

use chess::ChessMove;

use crate::errors::EngineResult;
use crate::oracle::board_oracle::BoardOracle;

/// Clock settings of the game the engine is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockState {
    /// Total thinking time granted at the start of the game.
    pub initial: Duration,
    /// Time added back after each move.
    pub increment: Duration,
}

impl ClockState {
    pub const fn new(initial: Duration, increment: Duration) -> Self {
        Self { initial, increment }
    }

    pub const fn from_millis(initial_ms: u64, increment_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(initial_ms),
            Duration::from_millis(increment_ms),
        )
    }
}

impl Default for ClockState {
    fn default() -> Self {
        Self::new(Duration::from_secs(300), Duration::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Search depth used with a comfortable clock outside the opening.
    pub initial_depth: u8,
    /// Depth cap while the game is in its opening plies.
    pub opening_depth: u8,
    /// Game plies counted as the opening.
    pub opening_plies: u32,
    /// Below this much time left, search one ply.
    pub critical_time: Duration,
    /// At or below this much time left, search two plies.
    pub low_time: Duration,
    /// Shuffle equal moves and keep tied replies during the opening.
    pub diversity: bool,
    /// Fixed seed for reproducible games; OS entropy otherwise.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_depth: 3,
            opening_depth: 2,
            opening_plies: 20,
            critical_time: Duration::from_secs(5),
            low_time: Duration::from_secs(10),
            diversity: true,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    pub best_move: ChessMove,
    /// Backed-up root score, White positive.
    pub score: i32,
    pub depth: u8,
    pub nodes: u64,
    /// The decision came from the subtree kept after the previous move.
    pub reused_cache: bool,
    pub principal_variation: Vec<ChessMove>,
    pub info_lines: Vec<String>,
}

pub trait Engine<B: BoardOracle> {
    fn name(&self) -> &str;

    fn author(&self) -> &str;

    fn new_game(&mut self) {}

    fn set_option(&mut self, _name: &str, _value: &str) -> EngineResult<()> {
        Ok(())
    }

    fn choose_move(&mut self, board: &B, clock: &ClockState) -> EngineResult<EngineOutput>;
}
