//! Fixed-interval tick accumulator
//!
//! Frame deltas arrive as `f32` seconds and are accumulated as `f64`, where
//! every `f32` is exact. A tick fires once the accumulator is within a small
//! fraction of the interval, which absorbs the rounding of a long frame delta
//! (e.g. `interval * 3.0` in `f32`) so that the tick count depends only on the
//! total time fed in, not on how it was chunked.

use tracing::warn;

/// Default tick interval in seconds (20 Hz).
pub const DEFAULT_TICK_INTERVAL: f32 = 0.05;

/// Fraction of the tick interval treated as `f32` rounding noise.
const TICK_TOLERANCE: f64 = 1e-4;

/// Tick cadence tracker owned by the simulation.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    tick_interval: f64,
    passed_time: f64,
    tick_count: u64,
    frame_count: u64,
}

impl TickScheduler {
    /// Create a scheduler ticking every `interval` seconds.
    ///
    /// Returns `None` unless `interval` is positive and finite.
    pub fn new(interval: f32) -> Option<Self> {
        if !(interval.is_finite() && interval > 0.0) {
            return None;
        }
        Some(Self::with_interval(interval))
    }

    fn with_interval(interval: f32) -> Self {
        Self {
            tick_interval: f64::from(interval),
            passed_time: 0.0,
            tick_count: 0,
            frame_count: 0,
        }
    }

    /// Add a frame's worth of time to the accumulator.
    ///
    /// Negative or non-finite deltas are ignored.
    pub fn accumulate(&mut self, delta_time: f32) {
        self.frame_count += 1;
        if delta_time.is_finite() && delta_time >= 0.0 {
            self.passed_time += f64::from(delta_time);
        } else {
            warn!(delta_time, "ignoring invalid frame delta");
        }
    }

    /// Consume one tick if enough time has accumulated.
    ///
    /// Call in a loop: missed ticks are caught up rather than dropped.
    pub fn consume_tick(&mut self) -> bool {
        let threshold = self.tick_interval * (1.0 - TICK_TOLERANCE);
        if self.passed_time < threshold {
            return false;
        }
        self.passed_time -= self.tick_interval;
        self.tick_count += 1;
        true
    }

    /// The fixed delta handed to the tick pass.
    pub fn tick_interval(&self) -> f32 {
        self.tick_interval as f32
    }

    /// Time accumulated towards the next tick.
    pub fn passed_time(&self) -> f32 {
        self.passed_time.max(0.0) as f32
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::with_interval(DEFAULT_TICK_INTERVAL)
    }
}
