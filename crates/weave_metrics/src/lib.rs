//! Weave Metrics - counters and pass timing for the spell simulation
//!
//! Provides zero-cost abstractions for metrics collection that completely
//! vanish in production builds via feature flags.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use weave_metrics::{Counter, SystemProfiler};
//!
//! let mut counter = Counter::new();
//! counter.increment("cast.ok", 1);
//!
//! let mut profiler = SystemProfiler::new();
//! profiler.time_system("tick", || run_tick());
//! println!("ticks: {}", profiler.get_timing("tick").calls);
//! ```
//!
//! Without the `metrics` feature both types are empty stubs with the same
//! surface, so callers never need their own `cfg` gates.

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod system_profiler;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use system_profiler::{PassTiming, SystemProfiler};

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassTiming {
    pub calls: u64,
    pub total: std::time::Duration,
}

#[cfg(not(feature = "metrics"))]
impl PassTiming {
    pub fn average(&self) -> std::time::Duration { std::time::Duration::ZERO }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone, Default)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&mut self, _name: &str, _value: u64) {}
    pub fn get(&self, _name: &str) -> u64 { 0 }
    pub fn total(&self, _prefix: &str) -> u64 { 0 }
    pub fn reset_all(&mut self) {}
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> { std::iter::empty() }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone, Default)]
pub struct SystemProfiler;

#[cfg(not(feature = "metrics"))]
impl SystemProfiler {
    pub fn new() -> Self { Self }
    pub fn time_system<F, R>(&mut self, _name: &'static str, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn get_timing(&self, _name: &str) -> PassTiming { PassTiming::default() }
    pub fn reset(&mut self) {}
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, PassTiming)> + '_ { std::iter::empty() }
}
