//! The fixed-step tick clock.
//!
//! Wall time arrives in arbitrary increments; the clock converts it into
//! discrete ticks of [`TICK_INTERVAL`]. At most one tick fires per
//! `advance` call and the remainder is retained, so a stalled caller
//! falls behind real time but never skips simulation steps.

use crate::fixed::{Fixed64, Ticks, from_millis};

/// The canonical tick interval: 0.1 simulated seconds.
pub const TICK_INTERVAL: Fixed64 = from_millis(100);

/// Accumulator-based tick scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickClock {
    interval: Fixed64,
    accumulator: Fixed64,
    tick: Ticks,
}

impl TickClock {
    pub fn new() -> Self {
        Self::with_interval(TICK_INTERVAL)
    }

    pub fn with_interval(interval: Fixed64) -> Self {
        Self {
            interval,
            accumulator: Fixed64::ZERO,
            tick: 0,
        }
    }

    /// Accumulate elapsed time and fire at most one tick. Returns true
    /// when a tick fired; any backlog stays in the accumulator for the
    /// next call.
    pub fn advance(&mut self, elapsed: Fixed64) -> bool {
        self.accumulator += elapsed;
        if self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            self.tick += 1;
            true
        } else {
            false
        }
    }

    /// Fire a tick unconditionally, leaving the accumulator alone. Used
    /// when stepping the simulation directly rather than from wall time.
    pub fn fire(&mut self) {
        self.tick += 1;
    }

    pub fn interval(&self) -> Fixed64 {
        self.interval
    }

    /// Ticks fired since construction.
    pub fn tick(&self) -> Ticks {
        self.tick
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}
