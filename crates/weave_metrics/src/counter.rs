//! Named event counters

use std::collections::BTreeMap;

/// Monotonic counters keyed by a dotted event name (e.g. `cast.ok`).
///
/// Keys iterate in lexical order so reports are stable between runs.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    counters: BTreeMap<String, u64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, name: &str, value: u64) {
        match self.counters.get_mut(name) {
            Some(count) => *count += value,
            None => {
                self.counters.insert(name.to_owned(), value);
            }
        }
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Sum of every counter under `prefix` (e.g. `cast.`).
    pub fn total(&self, prefix: &str) -> u64 {
        self.counters
            .range(prefix.to_owned()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(_, count)| *count)
            .sum()
    }

    pub fn reset_all(&mut self) {
        self.counters.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters.iter().map(|(name, count)| (name.as_str(), *count))
    }
}
