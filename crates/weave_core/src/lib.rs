//! Weave Core
//!
//! Contains the spell simulation systems:
//! - Entity stores and type-erased aspect stamping
//! - Spell instantiation and target rewiring
//! - Fixed-rate tick scheduling
//! - The simulation facade and standard game-state transforms

pub mod ecs;
pub mod sim;
pub mod spell;
pub mod time;

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
