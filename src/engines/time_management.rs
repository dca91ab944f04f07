//! Adaptive search depth driven by the remaining clock and the game phase.
//!
//! The host only reports the game's clock settings. The engine keeps its own
//! account of time spent and picks the depth before every move: one ply when
//! nearly out of time, two when low or still in the opening, the configured
//! depth otherwise.

use std::time::Duration;

use crate::engines::engine_trait::{ClockState, EngineConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthReason {
    Opening,
    CriticalTime,
    LowTime,
    AmpleTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthChange {
    pub from: u8,
    pub to: u8,
    pub reason: DepthReason,
}

impl DepthChange {
    pub fn message(&self) -> String {
        let why = match self.reason {
            DepthReason::Opening => "still in the opening",
            DepthReason::CriticalTime => "about to run out of time",
            DepthReason::LowTime => "running low on time",
            DepthReason::AmpleTime => "enough time left",
        };
        let plies = if self.to == 1 { "move" } else { "moves" };
        format!(
            "Switching to depth {} ({why}), searching {} {plies} ahead.",
            self.to, self.to
        )
    }
}

#[derive(Debug, Clone)]
pub struct DepthController {
    max_depth: u8,
    time_spent: Duration,
    initial_depth: u8,
    opening_depth: u8,
    opening_plies: u32,
    critical_time: Duration,
    low_time: Duration,
}

impl DepthController {
    pub fn new(config: &EngineConfig) -> Self {
        let initial_depth = config.initial_depth.max(1);
        Self {
            max_depth: initial_depth,
            time_spent: Duration::ZERO,
            initial_depth,
            opening_depth: config.opening_depth.clamp(1, initial_depth),
            opening_plies: config.opening_plies,
            critical_time: config.critical_time,
            low_time: config.low_time,
        }
    }

    #[inline]
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    #[inline]
    pub fn time_spent(&self) -> Duration {
        self.time_spent
    }

    #[inline]
    pub fn is_opening(&self, ply: u32) -> bool {
        ply < self.opening_plies
    }

    /// Time left on the engine's own account; `None` once overspent.
    pub fn time_left(&self, clock: &ClockState) -> Option<Duration> {
        clock.initial.checked_sub(self.time_spent)
    }

    fn target(&self, ply: u32, clock: &ClockState) -> (u8, DepthReason) {
        match self.time_left(clock) {
            None => (1, DepthReason::CriticalTime),
            Some(left) if left < self.critical_time => (1, DepthReason::CriticalTime),
            Some(left) if left <= self.low_time => (2.min(self.initial_depth), DepthReason::LowTime),
            Some(_) if self.is_opening(ply) => (self.opening_depth, DepthReason::Opening),
            Some(_) => (self.initial_depth, DepthReason::AmpleTime),
        }
    }

    /// Sets the depth for the coming search. Returns the transition only when
    /// the depth actually changes.
    pub fn prepare(&mut self, ply: u32, clock: &ClockState) -> Option<DepthChange> {
        let (to, reason) = self.target(ply, clock);
        if to == self.max_depth {
            return None;
        }
        let change = DepthChange {
            from: self.max_depth,
            to,
            reason,
        };
        self.max_depth = to;
        Some(change)
    }

    /// Books one move: wall-clock time minus the increment, never below zero.
    pub fn record(&mut self, elapsed: Duration, increment: Duration) {
        self.time_spent = (self.time_spent + elapsed).saturating_sub(increment);
    }

    pub fn reset(&mut self) {
        self.max_depth = self.initial_depth;
        self.time_spent = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIDGAME_PLY: u32 = 40;

    fn controller_with_spent(spent: Duration) -> DepthController {
        let mut controller = DepthController::new(&EngineConfig::default());
        controller.record(spent, Duration::ZERO);
        controller
    }

    #[test]
    fn four_seconds_left_forces_depth_one() {
        let clock = ClockState::from_millis(8_000, 0);
        let mut controller = controller_with_spent(Duration::from_secs(4));
        assert_eq!(controller.time_left(&clock), Some(Duration::from_secs(4)));

        let change = controller
            .prepare(MIDGAME_PLY, &clock)
            .expect("depth must change");
        assert_eq!(change.from, 3);
        assert_eq!(change.to, 1);
        assert_eq!(change.reason, DepthReason::CriticalTime);
        assert_eq!(controller.max_depth(), 1);
    }

    #[test]
    fn seven_seconds_left_forces_depth_two() {
        let clock = ClockState::from_millis(8_000, 0);
        let mut controller = controller_with_spent(Duration::from_secs(1));
        controller.prepare(MIDGAME_PLY, &clock);
        assert_eq!(controller.max_depth(), 2);
    }

    #[test]
    fn fifteen_seconds_left_outside_opening_allows_depth_three() {
        let clock = ClockState::from_millis(20_000, 0);
        let mut controller = controller_with_spent(Duration::from_secs(5));
        assert_eq!(controller.prepare(MIDGAME_PLY, &clock), None);
        assert_eq!(controller.max_depth(), 3);
    }

    #[test]
    fn ten_seconds_left_is_still_low_time() {
        let clock = ClockState::from_millis(20_000, 0);
        let mut controller = controller_with_spent(Duration::from_secs(10));
        controller.prepare(MIDGAME_PLY, &clock);
        assert_eq!(controller.max_depth(), 2);
    }

    #[test]
    fn opening_caps_depth_at_two() {
        let clock = ClockState::from_millis(300_000, 0);
        let mut controller = DepthController::new(&EngineConfig::default());
        let change = controller.prepare(4, &clock).expect("opening lowers depth");
        assert_eq!((change.to, change.reason), (2, DepthReason::Opening));

        let change = controller
            .prepare(MIDGAME_PLY, &clock)
            .expect("middlegame restores depth");
        assert_eq!((change.to, change.reason), (3, DepthReason::AmpleTime));
    }

    #[test]
    fn transitions_are_reported_once() {
        let clock = ClockState::from_millis(4_000, 0);
        let mut controller = DepthController::new(&EngineConfig::default());
        assert!(controller.prepare(MIDGAME_PLY, &clock).is_some());
        assert!(controller.prepare(MIDGAME_PLY, &clock).is_none());
        assert!(controller.prepare(MIDGAME_PLY + 2, &clock).is_none());
    }

    #[test]
    fn overspent_or_empty_clock_degrades_to_depth_one() {
        let clock = ClockState::from_millis(2_000, 0);
        let mut controller = controller_with_spent(Duration::from_secs(3));
        assert_eq!(controller.time_left(&clock), None);
        controller.prepare(MIDGAME_PLY, &clock);
        assert_eq!(controller.max_depth(), 1);

        let mut controller = DepthController::new(&EngineConfig::default());
        controller.prepare(MIDGAME_PLY, &ClockState::from_millis(0, 0));
        assert_eq!(controller.max_depth(), 1);
    }

    #[test]
    fn increment_is_credited_and_spending_never_goes_negative() {
        let mut controller = DepthController::new(&EngineConfig::default());
        controller.record(Duration::from_millis(300), Duration::from_secs(2));
        assert_eq!(controller.time_spent(), Duration::ZERO);

        controller.record(Duration::from_secs(3), Duration::from_secs(1));
        assert_eq!(controller.time_spent(), Duration::from_secs(2));

        controller.reset();
        assert_eq!(controller.time_spent(), Duration::ZERO);
        assert_eq!(controller.max_depth(), 3);
    }

    #[test]
    fn messages_name_the_new_depth() {
        let change = DepthChange {
            from: 3,
            to: 1,
            reason: DepthReason::CriticalTime,
        };
        assert_eq!(
            change.message(),
            "Switching to depth 1 (about to run out of time), searching 1 move ahead."
        );
    }
}
