//! Wall-clock timing of named simulation passes

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Accumulated timing for one named pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassTiming {
    pub calls: u64,
    pub total: Duration,
}

impl PassTiming {
    pub fn average(&self) -> Duration {
        match u32::try_from(self.calls) {
            Ok(0) => Duration::ZERO,
            Ok(calls) => self.total / calls,
            Err(_) => Duration::from_secs_f64(self.total.as_secs_f64() / self.calls as f64),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemProfiler {
    timings: BTreeMap<&'static str, PassTiming>,
}

impl SystemProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f`, charging its wall-clock time to `name`.
    pub fn time_system<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        let timing = self.timings.entry(name).or_default();
        timing.calls += 1;
        timing.total += elapsed;
        result
    }

    pub fn get_timing(&self, name: &str) -> PassTiming {
        self.timings.get(name).copied().unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.timings.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, PassTiming)> + '_ {
        self.timings.iter().map(|(name, timing)| (*name, *timing))
    }
}
