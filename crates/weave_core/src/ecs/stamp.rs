// stamp.rs - Type-erased cross-store aspect copy
//
// The registry maps an AspectId to a stamp function monomorphized for exactly
// one aspect type. Callers that only know "which ids are present" (via
// `Store::visit`) can then clone an arbitrary subset of aspects from one store
// into another without naming any concrete type.

use crate::ecs::{Aspect, AspectId, Entity, SchemaError, Store, StoreError};
use std::collections::HashMap;

/// Copy one aspect of a bound type from `source`/`source_entity` onto
/// `dest`/`dest_entity`, overwriting whatever was there.
pub type StampFn = fn(&Store, Entity, &mut Store, Entity) -> Result<(), StoreError>;

/// Stamp function for aspect type `T`.
pub fn stamp<T: Aspect>(
    source: &Store,
    source_entity: Entity,
    dest: &mut Store,
    dest_entity: Entity,
) -> Result<(), StoreError> {
    let value = source.get::<T>(source_entity)?.clone();
    dest.emplace(dest_entity, value)
}

#[derive(Clone, Copy)]
struct StampEntry {
    name: &'static str,
    stamp: StampFn,
}

/// Dispatch table from aspect id to stamp function.
///
/// Populated once at start-up from the aspect schema and never changed after.
#[derive(Clone, Default)]
pub struct StampRegistry {
    entries: HashMap<AspectId, StampEntry>,
}

impl StampRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the stamp function for `T`.
    pub fn register<T: Aspect>(&mut self) -> Result<(), SchemaError> {
        if let Some(existing) = self.entries.get(&T::ID) {
            return Err(SchemaError::DuplicateAspect {
                id: T::ID,
                existing: existing.name,
                requested: T::NAME,
            });
        }

        self.entries.insert(
            T::ID,
            StampEntry {
                name: T::NAME,
                stamp: stamp::<T>,
            },
        );
        Ok(())
    }

    pub fn get(&self, id: AspectId) -> Option<StampFn> {
        self.entries.get(&id).map(|entry| entry.stamp)
    }

    pub fn contains(&self, id: AspectId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn name_of(&self, id: AspectId) -> Option<&'static str> {
        self.entries.get(&id).map(|entry| entry.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy every aspect present on `source_entity` onto `dest_entity`.
    ///
    /// Returns the number of aspects stamped. An aspect without a registered
    /// stamp is a schema fault, never a silent skip.
    pub fn stamp_all(
        &self,
        source: &Store,
        source_entity: Entity,
        dest: &mut Store,
        dest_entity: Entity,
    ) -> Result<usize, SchemaError> {
        let ids = source.aspect_ids(source_entity);
        for &id in &ids {
            let stamp = self.get(id).ok_or_else(|| SchemaError::MissingStamp {
                id,
                name: source.aspect_name(id).unwrap_or("<unknown>"),
            })?;
            stamp(source, source_entity, dest, dest_entity)?;
        }
        Ok(ids.len())
    }

    /// Fail if any aspect carried by `store` lacks a stamp function.
    pub fn verify(&self, store: &Store) -> Result<(), SchemaError> {
        match store
            .present_aspects()
            .find(|(id, _)| !self.contains(*id))
        {
            Some((id, name)) => Err(SchemaError::MissingStamp { id, name }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for StampRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.entries.values().map(|entry| entry.name).collect();
        names.sort_unstable();
        f.debug_struct("StampRegistry").field("aspects", &names).finish()
    }
}
