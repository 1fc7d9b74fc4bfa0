//! Wall-clock pacing for the simulator's control loop.

use std::time::Duration as StdDuration;

use embassy_time::{Duration, Instant};
use iaq_core::LoopTimer;

/// Drives the sample loop on a virtual clock, sleeping between ticks.
///
/// Each tick advances the virtual clock by `virtual_tick` while only
/// `real_tick` passes on the wall clock, so hours of sensor time can be
/// replayed in seconds.
pub struct SimTimer {
    ticks: u64,
    max_ticks: Option<u64>,
    virtual_tick: Duration,
    real_tick: StdDuration,
}

impl SimTimer {
    pub fn new(virtual_tick: Duration, real_tick: StdDuration) -> Self {
        Self {
            ticks: 0,
            max_ticks: None,
            virtual_tick,
            real_tick,
        }
    }

    /// Stop after `max_ticks` ticks instead of running forever.
    pub fn with_limit(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Virtual time of the current tick
    pub fn virtual_now(&self) -> Instant {
        Instant::from_ticks(self.virtual_tick.as_ticks().saturating_mul(self.ticks))
    }

    /// Advance one tick without sleeping
    pub fn advance(&mut self) {
        self.ticks += 1;
    }
}

impl LoopTimer for SimTimer {
    fn now(&mut self) -> Instant {
        self.virtual_now()
    }

    fn wait_next_tick(&mut self) -> bool {
        std::thread::sleep(self.real_tick);
        self.advance();
        self.max_ticks.is_none_or(|max| self.ticks < max)
    }
}
