//! UCI protocol front-end and command loop.
//!
//! Parses UCI commands, keeps the current position, hands `go` requests to
//! the alpha-beta engine and prints protocol output. Advisory chat messages
//! go to the log.

use std::io::{self, BufRead, Write};

use crate::engines::engine_alpha_beta::AlphaBetaEngine;
use crate::engines::engine_trait::{ClockState, Engine, EngineConfig, EngineOutput};
use crate::errors::{EngineError, EngineResult};
use crate::oracle::board_oracle::BoardOracle;
use crate::oracle::chess_board::ChessBoard;

pub fn run_stdio_loop() -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut uci = UciState::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let should_quit = uci.handle_command(&line, &mut stdout)?;
        stdout.flush()?;
        if should_quit {
            break;
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct GoParams {
    depth: Option<u8>,
    movetime_ms: Option<u64>,
    wtime_ms: Option<u64>,
    btime_ms: Option<u64>,
    winc_ms: Option<u64>,
    binc_ms: Option<u64>,
}

struct UciState {
    board: ChessBoard,
    engine: AlphaBetaEngine<ChessBoard>,
    /// Fixed by the first `go` of a game.
    game_clock: Option<ClockState>,
    clock_initial_override_ms: Option<u64>,
    debug_mode: bool,
}

impl UciState {
    fn new() -> Self {
        Self {
            board: ChessBoard::new_game(),
            engine: AlphaBetaEngine::new(EngineConfig::default()),
            game_clock: None,
            clock_initial_override_ms: None,
            debug_mode: false,
        }
    }

    fn handle_command(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or_default();

        match cmd {
            "uci" => {
                writeln!(out, "id name {}", self.engine.name())?;
                writeln!(out, "id author {}", self.engine.author())?;
                writeln!(out, "option name Depth type spin default 3 min 1 max 8")?;
                writeln!(
                    out,
                    "option name OpeningPlies type spin default 20 min 0 max 200"
                )?;
                writeln!(out, "option name Diversity type check default true")?;
                writeln!(out, "option name Seed type string default <empty>")?;
                writeln!(
                    out,
                    "option name ClockInitialMs type spin default 0 min 0 max 86400000"
                )?;
                writeln!(out, "uciok")?;
            }
            "isready" => {
                writeln!(out, "readyok")?;
            }
            "setoption" => {
                if let Err(err) = self.handle_setoption(trimmed) {
                    writeln!(out, "info string setoption error: {}", err)?;
                }
            }
            "ucinewgame" => self.start_new_game(),
            "position" => {
                if let Err(err) = self.handle_position(trimmed) {
                    writeln!(out, "info string position error: {}", err)?;
                }
            }
            "go" => match self.handle_go(trimmed) {
                Ok(result) => self.write_go_result(&result, out)?,
                Err(err) => {
                    writeln!(out, "info string go error: {}", err)?;
                    writeln!(out, "bestmove 0000")?;
                }
            },
            "stop" | "ponderhit" | "register" => {
                // Search is synchronous; nothing to interrupt.
            }
            "debug" => {
                let mode = parts.next().unwrap_or_default();
                self.debug_mode = mode.eq_ignore_ascii_case("on");
            }
            "quit" => {
                return Ok(true);
            }
            _ => {
                log::debug!("ignoring unknown UCI command '{cmd}'");
            }
        }

        Ok(false)
    }

    fn handle_setoption(&mut self, line: &str) -> EngineResult<()> {
        let mut tokens = line.split_whitespace();
        let _ = tokens.next(); // setoption

        let mut name_tokens = Vec::<&str>::new();
        let mut value_tokens = Vec::<&str>::new();
        let mut mode = "";

        for tok in tokens {
            match tok {
                "name" => mode = "name",
                "value" => mode = "value",
                _ if mode == "name" => name_tokens.push(tok),
                _ if mode == "value" => value_tokens.push(tok),
                _ => {}
            }
        }

        let name = name_tokens.join(" ");
        let value = value_tokens.join(" ");

        if name.eq_ignore_ascii_case("ClockInitialMs") {
            let parsed = value
                .parse::<u64>()
                .map_err(|_| EngineError::InvalidOption {
                    name: name.clone(),
                    value: value.clone(),
                })?;
            self.clock_initial_override_ms = if parsed == 0 { None } else { Some(parsed) };
            Ok(())
        } else {
            self.engine.set_option(&name, &value)
        }
    }

    fn handle_position(&mut self, line: &str) -> EngineResult<()> {
        let mut tokens = line.split_whitespace().peekable();
        let _ = tokens.next(); // "position"

        let mut board = match tokens.next() {
            Some("startpos") => ChessBoard::new_game(),
            Some("fen") => {
                let mut fen_parts = Vec::<&str>::new();
                while let Some(&next) = tokens.peek() {
                    if next == "moves" {
                        break;
                    }
                    fen_parts.push(next);
                    tokens.next();
                }
                ChessBoard::from_fen(&fen_parts.join(" "))?
            }
            other => {
                return Err(EngineError::InvalidFen(other.unwrap_or_default().to_owned()));
            }
        };

        let fresh_start = line.split_whitespace().nth(1) == Some("startpos");
        let mut played = 0usize;
        if tokens.peek().copied() == Some("moves") {
            let _ = tokens.next();
            for text in tokens {
                let mv = board.parse_move(text)?;
                board.apply_move(mv)?;
                played += 1;
            }
        }

        // A bare start position opens a new game even without `ucinewgame`.
        if fresh_start && played == 0 {
            self.start_new_game();
        }
        self.board = board;
        Ok(())
    }

    fn start_new_game(&mut self) {
        self.board = ChessBoard::new_game();
        self.game_clock = None;
        self.engine.new_game();
    }

    /// The first clock reported in a game becomes its clock for every later
    /// move; the engine keeps its own account of time spent.
    fn resolve_clock(&mut self, params: &GoParams) -> ClockState {
        if let Some(clock) = self.game_clock {
            return clock;
        }
        let white = self.board.side_to_move() == chess::Color::White;
        let (time_ms, inc_ms) = if white {
            (params.wtime_ms, params.winc_ms)
        } else {
            (params.btime_ms, params.binc_ms)
        };
        let default = ClockState::default();
        let clock = ClockState::from_millis(
            self.clock_initial_override_ms
                .or(time_ms)
                .or(params.movetime_ms)
                .unwrap_or(default.initial.as_millis() as u64),
            inc_ms.unwrap_or(0),
        );
        log::info!(
            "game clock {} ms + {} ms",
            clock.initial.as_millis(),
            clock.increment.as_millis()
        );
        self.game_clock = Some(clock);
        clock
    }

    fn handle_go(&mut self, line: &str) -> EngineResult<EngineOutput> {
        let params = parse_go_params(line);
        if let Some(depth) = params.depth {
            self.engine.set_option("Depth", &depth.to_string())?;
        }
        let clock = self.resolve_clock(&params);
        self.engine.choose_move(&self.board, &clock)
    }

    fn write_go_result(&self, result: &EngineOutput, out: &mut impl Write) -> io::Result<()> {
        for info in &result.info_lines {
            writeln!(out, "{}", info)?;
        }
        if self.debug_mode {
            writeln!(out, "info string fen {}", self.board.fen())?;
        }
        match result.principal_variation.get(1) {
            Some(ponder) => writeln!(out, "bestmove {} ponder {}", result.best_move, ponder),
            None => writeln!(out, "bestmove {}", result.best_move),
        }
    }
}

fn parse_go_params(line: &str) -> GoParams {
    let mut params = GoParams::default();
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    let mut i = 0usize;
    while i < tokens.len() {
        let value = tokens.get(i + 1);
        match tokens[i] {
            "depth" => params.depth = value.and_then(|x| x.parse::<u8>().ok()),
            "movetime" => params.movetime_ms = value.and_then(|x| x.parse::<u64>().ok()),
            "wtime" => params.wtime_ms = value.and_then(|x| x.parse::<u64>().ok()),
            "btime" => params.btime_ms = value.and_then(|x| x.parse::<u64>().ok()),
            "winc" => params.winc_ms = value.and_then(|x| x.parse::<u64>().ok()),
            "binc" => params.binc_ms = value.and_then(|x| x.parse::<u64>().ok()),
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    params
}
