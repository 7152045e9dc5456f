use crate::ecs::{AspectId, Entity};
use thiserror::Error;

/// Errors raised by typed access to an entity store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("entity {0} is not alive in this store")]
    StaleEntity(Entity),

    #[error("entity {entity} has no '{aspect}' aspect")]
    AspectNotPresent { entity: Entity, aspect: &'static str },

    #[error("entity {0} is already alive and cannot be restored")]
    AlreadyAlive(Entity),

    #[error("aspect id {id} is claimed by both '{existing}' and '{requested}'")]
    AspectIdCollision {
        id: AspectId,
        existing: &'static str,
        requested: &'static str,
    },
}

/// Errors describing an aspect schema that cannot be instantiated safely.
///
/// These are configuration faults and are expected to abort start-up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("aspect '{name}' (id {id}) has no stamp function registered")]
    MissingStamp { id: AspectId, name: &'static str },

    #[error("aspect id {id} is already registered by '{existing}', cannot register '{requested}'")]
    DuplicateAspect {
        id: AspectId,
        existing: &'static str,
        requested: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
