//! Simulated progress estimate shown while a generation is in flight
//!
//! The provider exposes no progress telemetry. The page advances a bar on
//! a fixed timer and counts down from an assumed duration; none of it is a
//! measurement.

use std::time::Duration;

/// Parameters of the cosmetic progress bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedProgress {
    /// Interval between bar updates
    pub tick: Duration,
    /// Percentage added per tick
    pub step: u8,
    /// The bar never passes this value before the response arrives
    pub cap: u8,
    /// Duration the countdown starts from
    pub assumed_duration: Duration,
}

impl Default for SimulatedProgress {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(500),
            step: 2,
            cap: 99,
            assumed_duration: Duration::from_secs(30),
        }
    }
}

impl SimulatedProgress {
    /// Percentage after one more tick
    pub fn advance(&self, percent: u8) -> u8 {
        percent.saturating_add(self.step).min(self.cap)
    }

    /// Estimated seconds left after `elapsed`, never negative
    pub fn remaining_secs(&self, elapsed: Duration) -> f64 {
        self.assumed_duration
            .saturating_sub(elapsed)
            .as_secs_f64()
    }
}
