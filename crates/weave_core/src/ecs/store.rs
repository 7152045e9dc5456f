// store.rs - Entity store with one column per aspect type
//
// Each aspect type owns a column: a slot vector indexed by entity index.
// Columns live in a BTreeMap keyed by AspectId, which gives `visit` its
// consistent ascending-id order. Destroying an entity clears its row in every
// column and bumps the slot generation, so stale handles never observe data.

use crate::ecs::{Aspect, AspectId, Entity, StoreError};
use std::any::Any;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Type-erased view of a column, enough to clear rows and answer presence.
trait ErasedColumn: Send + Sync {
    fn name(&self) -> &'static str;
    fn contains(&self, index: u32) -> bool;
    fn remove_row(&mut self, index: u32);
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Column<T> {
    rows: Vec<Option<T>>,
    len: usize,
}

impl<T: Aspect> Column<T> {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            len: 0,
        }
    }

    fn get(&self, index: u32) -> Option<&T> {
        self.rows.get(index as usize)?.as_ref()
    }

    fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.rows.get_mut(index as usize)?.as_mut()
    }

    fn insert(&mut self, index: u32, value: T) {
        let index = index as usize;
        if index >= self.rows.len() {
            self.rows.resize_with(index + 1, || None);
        }
        if self.rows[index].replace(value).is_none() {
            self.len += 1;
        }
    }

    fn take(&mut self, index: u32) -> Option<T> {
        let taken = self.rows.get_mut(index as usize)?.take();
        if taken.is_some() {
            self.len -= 1;
        }
        taken
    }
}

impl<T: Aspect> ErasedColumn for Column<T> {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn contains(&self, index: u32) -> bool {
        self.get(index).is_some()
    }

    fn remove_row(&mut self, index: u32) {
        self.take(index);
    }

    fn len(&self) -> usize {
        self.len
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A container of entities and their heterogeneous aspects.
///
/// The simulation keeps three of these: prototypes, spellcast instances and
/// actors. Stores never share aspects; moving data between them goes through
/// the stamp registry.
#[derive(Default)]
pub struct Store {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    columns: BTreeMap<AspectId, Box<dyn ErasedColumn>>,
}

impl Store {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new entity. Destroyed slots are reused with a bumped generation.
    pub fn create(&mut self) -> Entity {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            return Entity::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            alive: true,
        });
        Entity::new(index, 0)
    }

    /// Destroy an entity and every aspect attached to it.
    ///
    /// Returns false if the handle was already stale.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        for column in self.columns.values_mut() {
            column.remove_row(entity.index());
        }

        let slot = &mut self.slots[entity.index() as usize];
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(entity.index());
        self.live -= 1;
        true
    }

    /// Bring a specific handle to life, as recorded in a snapshot.
    ///
    /// Slots skipped over while growing the store become free slots.
    pub fn restore(&mut self, entity: Entity) -> Result<(), StoreError> {
        let index = entity.index() as usize;
        while self.slots.len() <= index {
            let gap = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                alive: false,
            });
            self.free.push(gap);
        }

        let slot = &mut self.slots[index];
        if slot.alive {
            return Err(StoreError::AlreadyAlive(entity));
        }
        slot.generation = entity.generation();
        slot.alive = true;
        self.free.retain(|&free| free != entity.index());
        self.live += 1;
        Ok(())
    }

    /// Whether the handle refers to a live entity of this store.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.index() as usize)
            .is_some_and(|slot| slot.alive && slot.generation == entity.generation())
    }

    fn ensure_alive(&self, entity: Entity) -> Result<(), StoreError> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            Err(StoreError::StaleEntity(entity))
        }
    }

    fn column<T: Aspect>(&self) -> Option<&Column<T>> {
        self.columns.get(&T::ID)?.as_any().downcast_ref::<Column<T>>()
    }

    fn column_mut<T: Aspect>(&mut self) -> Option<&mut Column<T>> {
        self.columns
            .get_mut(&T::ID)?
            .as_any_mut()
            .downcast_mut::<Column<T>>()
    }

    /// Whether the entity carries an aspect of type `T`.
    pub fn has<T: Aspect>(&self, entity: Entity) -> bool {
        self.try_get::<T>(entity).is_some()
    }

    /// Get an aspect, or `None` if the entity is stale or lacks it.
    pub fn try_get<T: Aspect>(&self, entity: Entity) -> Option<&T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.column::<T>()?.get(entity.index())
    }

    /// Get a mutable aspect, or `None` if the entity is stale or lacks it.
    pub fn try_get_mut<T: Aspect>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.column_mut::<T>()?.get_mut(entity.index())
    }

    /// Get an aspect that the caller expects to be present.
    pub fn get<T: Aspect>(&self, entity: Entity) -> Result<&T, StoreError> {
        self.ensure_alive(entity)?;
        self.column::<T>()
            .and_then(|column| column.get(entity.index()))
            .ok_or(StoreError::AspectNotPresent {
                entity,
                aspect: T::NAME,
            })
    }

    /// Mutable counterpart of [`Store::get`].
    pub fn get_mut<T: Aspect>(&mut self, entity: Entity) -> Result<&mut T, StoreError> {
        self.ensure_alive(entity)?;
        self.column_mut::<T>()
            .and_then(|column| column.get_mut(entity.index()))
            .ok_or(StoreError::AspectNotPresent {
                entity,
                aspect: T::NAME,
            })
    }

    /// Attach an aspect, overwriting any existing aspect of the same type.
    pub fn emplace<T: Aspect>(&mut self, entity: Entity, value: T) -> Result<(), StoreError> {
        self.ensure_alive(entity)?;
        let column = self
            .columns
            .entry(T::ID)
            .or_insert_with(|| Box::new(Column::<T>::new()));
        let existing = column.name();
        let column = column
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .ok_or(StoreError::AspectIdCollision {
                id: T::ID,
                existing,
                requested: T::NAME,
            })?;
        column.insert(entity.index(), value);
        Ok(())
    }

    /// Detach an aspect, returning it if it was present.
    pub fn remove<T: Aspect>(&mut self, entity: Entity) -> Option<T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.column_mut::<T>()?.take(entity.index())
    }

    /// Call `f` once for every aspect type present on `entity`, in ascending id order.
    ///
    /// Stale handles visit nothing.
    pub fn visit<F>(&self, entity: Entity, mut f: F)
    where
        F: FnMut(AspectId),
    {
        if !self.is_alive(entity) {
            return;
        }
        for (&id, column) in &self.columns {
            if column.contains(entity.index()) {
                f(id);
            }
        }
    }

    /// Collect the aspect ids present on `entity`.
    pub fn aspect_ids(&self, entity: Entity) -> Vec<AspectId> {
        let mut ids = Vec::new();
        self.visit(entity, |id| ids.push(id));
        ids
    }

    /// Name of the aspect type backing a column, if the store has seen it.
    pub fn aspect_name(&self, id: AspectId) -> Option<&'static str> {
        self.columns.get(&id).map(|column| column.name())
    }

    /// Aspect types carried by at least one live entity.
    pub fn present_aspects(&self) -> impl Iterator<Item = (AspectId, &'static str)> + '_ {
        self.columns
            .iter()
            .filter(|(_, column)| column.len() > 0)
            .map(|(&id, column)| (id, column.name()))
    }

    /// Iterate live entities in ascending index order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.alive)
            .map(|(index, slot)| Entity::new(index as u32, slot.generation))
    }

    /// Iterate every entity carrying `T` together with the aspect.
    pub fn each<T: Aspect>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        let slots = &self.slots;
        self.column::<T>().into_iter().flat_map(move |column| {
            column.rows.iter().enumerate().filter_map(move |(index, row)| {
                let value = row.as_ref()?;
                Some((Entity::new(index as u32, slots[index].generation), value))
            })
        })
    }

    /// Mutable counterpart of [`Store::each`].
    pub fn each_mut<T: Aspect>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        let slots = &self.slots;
        let column = self
            .columns
            .get_mut(&T::ID)
            .and_then(|column| column.as_any_mut().downcast_mut::<Column<T>>());
        column.into_iter().flat_map(move |column| {
            column
                .rows
                .iter_mut()
                .enumerate()
                .filter_map(move |(index, row)| {
                    let value = row.as_mut()?;
                    Some((Entity::new(index as u32, slots[index].generation), value))
                })
        })
    }

    /// Snapshot the entities carrying `T`, for callers that mutate while walking.
    pub fn entities_with<T: Aspect>(&self) -> Vec<Entity> {
        self.each::<T>().map(|(entity, _)| entity).collect()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Drop every entity and aspect. Generations restart, so handles from
    /// before the clear must not be reused.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("live", &self.live)
            .field(
                "aspects",
                &self.present_aspects().map(|(_, name)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
