//! Entity handle with generational index
//!
//! Entities are lightweight handles (8 bytes) that key into the aspect
//! columns of the store that created them. The generation counter prevents
//! use-after-free: once a store destroys an entity, every copy of the old
//! handle is rejected by that store.

use serde::{Deserialize, Serialize};

/// Entity handle (generation-indexed for safety)
///
/// Format: [32-bit index | 32-bit generation]
/// - Index: Position in the store's slot array
/// - Generation: Incremented on entity destruction (prevents use-after-free)
///
/// Example:
/// ```ignore
/// let entity = store.create();
/// store.destroy(entity);
/// assert!(!store.is_alive(entity)); // generation mismatch
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Serialize to 64-bit integer (for save files and host linkage)
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Deserialize from 64-bit integer
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl From<u64> for Entity {
    fn from(bits: u64) -> Self {
        Self::from_bits(bits)
    }
}

impl From<Entity> for u64 {
    fn from(entity: Entity) -> Self {
        entity.to_bits()
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_round_trip() {
        let entity = Entity::new(7, 3);
        assert_eq!(entity.to_bits(), (3u64 << 32) | 7);
        assert_eq!(Entity::from_bits(entity.to_bits()), entity);
    }

    #[test]
    fn serializes_as_bits() {
        let entity = Entity::new(2, 1);
        let json = serde_json::to_string(&entity).unwrap();
        assert_eq!(json, ((1u64 << 32) | 2).to_string());
        let back: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entity);
    }
}
