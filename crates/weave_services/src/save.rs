//! Entity-store snapshots
//!
//! A snapshot is a JSON document with a header listing the aspect names the
//! writer knew about, in schema order, followed by every live entity and its
//! aspects keyed by name. A loader only accepts a snapshot whose header is
//! exactly its own aspect list.
//!
//! ```json
//! {
//!   "aspects": ["Name", "Prototype", "Health"],
//!   "entities": [
//!     { "entity": 0, "aspects": { "Name": { "name": "Hero" } } }
//!   ]
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use weave_core::ecs::{Aspect, AspectId, Entity, Store, StoreError};
use weave_core::spell::schema::{visit_actor_aspects, visit_definition_aspects, AspectVisitor};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot aspect list {found:?} does not match {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("entity {entity} carries aspect '{aspect}' outside the snapshot schema")]
    UnlistedAspect { entity: Entity, aspect: &'static str },

    #[error("snapshot entity {entity} has index above the limit of {limit} for this file")]
    EntityOutOfRange { entity: Entity, limit: u32 },

    #[error("snapshot entity {entity} has unknown aspect '{aspect}'")]
    UnknownAspect { entity: Entity, aspect: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Destroyed slots a snapshot may skip over, beyond one slot per record.
const MAX_INDEX_SLACK: u32 = 4096;

type SaveFn = fn(&Store, Entity) -> Result<Option<Value>, serde_json::Error>;
type LoadFn = fn(&mut Store, Entity, Value) -> Result<(), PersistenceError>;

fn save_aspect<T: Aspect + Serialize>(
    store: &Store,
    entity: Entity,
) -> Result<Option<Value>, serde_json::Error> {
    store.try_get::<T>(entity).map(serde_json::to_value).transpose()
}

fn load_aspect<T: Aspect + DeserializeOwned>(
    store: &mut Store,
    entity: Entity,
    value: Value,
) -> Result<(), PersistenceError> {
    let aspect: T = serde_json::from_value(value)?;
    store.emplace(entity, aspect)?;
    Ok(())
}

struct SchemaEntry {
    id: AspectId,
    name: &'static str,
    save: SaveFn,
    load: LoadFn,
}

/// An ordered list of persistable aspects with their (de)serializers.
pub struct SnapshotSchema {
    entries: Vec<SchemaEntry>,
}

#[derive(Default)]
struct EntryCollector(Vec<SchemaEntry>);

impl AspectVisitor for EntryCollector {
    fn visit<T>(&mut self)
    where
        T: Aspect + Serialize + DeserializeOwned,
    {
        self.0.push(SchemaEntry {
            id: T::ID,
            name: T::NAME,
            save: save_aspect::<T>,
            load: load_aspect::<T>,
        });
    }
}

/// Schema for spell and fragment prototypes.
pub fn definition_schema() -> SnapshotSchema {
    let mut collector = EntryCollector::default();
    visit_definition_aspects(&mut collector);
    SnapshotSchema {
        entries: collector.0,
    }
}

/// Schema for actors.
pub fn actor_schema() -> SnapshotSchema {
    let mut collector = EntryCollector::default();
    visit_actor_aspects(&mut collector);
    SnapshotSchema {
        entries: collector.0,
    }
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    aspects: Vec<String>,
    entities: Vec<EntityRecord>,
}

#[derive(Serialize, Deserialize)]
struct EntityRecord {
    entity: Entity,
    aspects: Map<String, Value>,
}

impl SnapshotSchema {
    /// Aspect names in schema order; this is the snapshot header.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn by_id(&self, id: AspectId) -> Option<&SchemaEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn by_name(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Serialize every live entity of `store`.
    pub fn encode(&self, store: &Store) -> Result<String, PersistenceError> {
        let mut entities = Vec::with_capacity(store.len());

        for entity in store.entities() {
            let mut aspects = Map::new();
            for id in store.aspect_ids(entity) {
                let Some(entry) = self.by_id(id) else {
                    return Err(PersistenceError::UnlistedAspect {
                        entity,
                        aspect: store.aspect_name(id).unwrap_or("<unnamed>"),
                    });
                };
                if let Some(value) = (entry.save)(store, entity)? {
                    aspects.insert(entry.name.to_owned(), value);
                }
            }
            entities.push(EntityRecord { entity, aspects });
        }

        let file = SnapshotFile {
            aspects: self.names().into_iter().map(str::to_owned).collect(),
            entities,
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Build a fresh store from a snapshot, keeping every recorded handle.
    pub fn decode(&self, json: &str) -> Result<Store, PersistenceError> {
        let file: SnapshotFile = serde_json::from_str(json)?;

        let expected = self.names();
        if file.aspects.len() != expected.len()
            || file.aspects.iter().zip(&expected).any(|(found, want)| found != want)
        {
            return Err(PersistenceError::SchemaMismatch {
                expected: expected.into_iter().map(str::to_owned).collect(),
                found: file.aspects,
            });
        }

        // Restoring an index allocates every slot below it, so bound it by
        // what the file could legitimately need.
        let limit = u32::try_from(file.entities.len())
            .unwrap_or(u32::MAX)
            .saturating_add(MAX_INDEX_SLACK);

        let mut store = Store::new();
        for record in file.entities {
            let entity = record.entity;
            if entity.index() >= limit {
                return Err(PersistenceError::EntityOutOfRange { entity, limit });
            }
            store.restore(entity)?;
            for (name, value) in record.aspects {
                let Some(entry) = self.by_name(&name) else {
                    return Err(PersistenceError::UnknownAspect {
                        entity,
                        aspect: name,
                    });
                };
                (entry.load)(&mut store, entity, value)?;
            }
        }
        Ok(store)
    }

    pub fn save(&self, store: &Store, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        let json = self.encode(store)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), entities = store.len(), "snapshot saved");
        Ok(())
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<Store, PersistenceError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = self.decode(&json)?;
        info!(path = %path.display(), entities = store.len(), "snapshot loaded");
        Ok(store)
    }
}

pub fn save_definitions(store: &Store, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
    definition_schema().save(store, path)
}

pub fn load_definitions(path: impl AsRef<Path>) -> Result<Store, PersistenceError> {
    definition_schema().load(path)
}

pub fn save_actors(store: &Store, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
    actor_schema().save(store, path)
}

pub fn load_actors(path: impl AsRef<Path>) -> Result<Store, PersistenceError> {
    actor_schema().load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use weave_core::glam::Vec3;
    use weave_core::spell::aspects::{
        Health, Name, RenderLight, SourceEntity, Spell, SpellTargetType, TargetType,
    };
    use weave_core::spell::catalog::{self, BURN, FIREBALL, HERO};
    use weave_core::spell::{find_by_name, find_spell};

    /// Attaches a non-default value of every visited aspect.
    struct Populate<'a> {
        store: &'a mut Store,
        entity: Entity,
    }

    impl AspectVisitor for Populate<'_> {
        fn visit<T>(&mut self)
        where
            T: Aspect + Serialize + DeserializeOwned,
        {
            let value: T = serde_json::from_value(sample(T::NAME, self.entity)).unwrap();
            self.store.emplace(self.entity, value).unwrap();
        }
    }

    /// Checks every visited aspect serializes identically in both stores.
    struct Compare<'a> {
        before: &'a Store,
        after: &'a Store,
        entity: Entity,
        checked: usize,
    }

    impl AspectVisitor for Compare<'_> {
        fn visit<T>(&mut self)
        where
            T: Aspect + Serialize + DeserializeOwned,
        {
            let before = serde_json::to_value(self.before.get::<T>(self.entity).unwrap()).unwrap();
            let after = serde_json::to_value(self.after.get::<T>(self.entity).unwrap()).unwrap();
            assert_eq!(before, after, "{} changed across a reload", T::NAME);
            self.checked += 1;
        }
    }

    fn sample(name: &str, entity: Entity) -> Value {
        match name {
            "Name" => json!({ "name": "Everything" }),
            "Prototype" => json!({ "prototype": entity.to_bits() }),
            "Health" => json!({ "current": 1.0, "max": 2.0, "is_dead": true }),
            "Damage" | "Heal" | "UtiliseQi" | "ReplenishQi" => {
                json!({ "quantity": 3.0, "over_time": true })
            }
            "Qi" => json!({ "current": 1.0, "max": 5.0 }),
            "Spell" => json!({ "fragments": [entity.to_bits()] }),
            "SpellTargetType" => json!({ "target_type": "self" }),
            "SpellTargetAggressionType" => json!({ "aggression": "hostile" }),
            "RenderLight" => json!({ "color": [0.25, 0.5, 1.0], "radius": 3.0, "intensity": 0.75 }),
            "Timer" => json!({ "elapsed": 0.5 }),
            "Duration" | "Delay" | "Cooldown" => json!({ "total": 2.0, "remaining": 1.5 }),
            "Range" => json!({ "min": 1.0, "max": 10.0 }),
            "TickEachInterval" => json!({ "interval": 0.5 }),
            "MovementFactor" => json!({ "factor": 0.5 }),
            "AreaOfEffect" => json!({ "radius": 4.0, "offset": [1.0, 2.0, 3.0] }),
            "AnimationFragmentSpellCast" | "AnimationFragmentEmote" => {
                json!({ "fragment": "anim" })
            }
            "AnimationTag" => json!({ "tag": "tag" }),
            _ => Value::Null,
        }
    }

    #[test]
    fn header_follows_schema_order() {
        let names = actor_schema().names();
        assert_eq!(names[0], "Name");
        assert_eq!(names[1], "Prototype");
        assert_eq!(names.len(), 11);
        assert_eq!(definition_schema().names()[0], "Name");
    }

    #[test]
    fn fragment_handles_survive_a_reload() {
        let mut definitions = catalog::starter_definitions().unwrap();
        // Bump a generation so restored handles differ from freshly created ones.
        let scratch = definitions.create();
        definitions.destroy(scratch);
        let spare = definitions.create();
        definitions.emplace(spare, Name::new("Spare")).unwrap();

        let schema = definition_schema();
        let json = schema.encode(&definitions).unwrap();
        let loaded = schema.decode(&json).unwrap();

        assert_eq!(loaded.len(), definitions.len());
        let fireball = find_spell(&loaded, FIREBALL).unwrap();
        let burn = find_by_name(&loaded, BURN).unwrap();
        assert_eq!(loaded.get::<Spell>(fireball).unwrap().fragments, vec![burn]);
        assert_eq!(find_by_name(&loaded, "Spare"), Some(spare));
        assert!(loaded.is_alive(spare));
        assert!(!loaded.is_alive(scratch));
    }

    #[test]
    fn every_definition_aspect_survives_a_reload() {
        let mut definitions = Store::new();
        let everything = definitions.create();
        visit_definition_aspects(&mut Populate {
            store: &mut definitions,
            entity: everything,
        });

        let schema = definition_schema();
        let json = schema.encode(&definitions).unwrap();
        assert!(json.contains("\"self\""));
        let loaded = schema.decode(&json).unwrap();

        let mut compare = Compare {
            before: &definitions,
            after: &loaded,
            entity: everything,
            checked: 0,
        };
        visit_definition_aspects(&mut compare);
        assert_eq!(compare.checked, schema.len());
        assert_eq!(loaded.aspect_ids(everything), definitions.aspect_ids(everything));

        assert_eq!(
            loaded.get::<SpellTargetType>(everything).unwrap().target_type,
            TargetType::Caster
        );
        assert_eq!(
            loaded.get::<RenderLight>(everything).unwrap().color,
            Vec3::new(0.25, 0.5, 1.0)
        );
        assert_eq!(loaded.get::<Spell>(everything).unwrap().fragments, vec![everything]);
    }

    #[test]
    fn foreign_header_is_rejected() {
        let actors = catalog::starter_actors().unwrap();
        let json = actor_schema().encode(&actors).unwrap();

        let err = definition_schema().decode(&json).err().unwrap();
        assert!(matches!(err, PersistenceError::SchemaMismatch { .. }));
    }

    #[test]
    fn aspects_outside_the_schema_are_not_saved() {
        let mut actors = catalog::starter_actors().unwrap();
        let hero = find_by_name(&actors, HERO).unwrap();
        actors.emplace(hero, SourceEntity::default()).unwrap();

        let err = actor_schema().encode(&actors).err().unwrap();
        assert!(matches!(
            err,
            PersistenceError::UnlistedAspect {
                aspect: "SourceEntity",
                ..
            }
        ));
    }

    #[test]
    fn unknown_aspect_names_are_rejected() {
        let schema = actor_schema();
        let mut actors = Store::new();
        let hero = actors.create();
        actors.emplace(hero, Health::new(10.0)).unwrap();

        let json = schema.encode(&actors).unwrap();
        let tampered = json.replace("\"Health\": {", "\"Stamina\": {");
        assert_ne!(json, tampered);

        let err = schema.decode(&tampered).err().unwrap();
        assert!(matches!(err, PersistenceError::UnknownAspect { aspect, .. } if aspect == "Stamina"));
    }

    #[test]
    fn far_out_entity_indices_are_rejected() {
        let schema = actor_schema();
        let header = serde_json::to_string(&schema.names()).unwrap();
        let json = format!(
            r#"{{ "aspects": {header}, "entities": [
                {{ "entity": 200000000, "aspects": {{}} }}
            ] }}"#
        );

        let err = schema.decode(&json).err().unwrap();
        assert!(matches!(
            err,
            PersistenceError::EntityOutOfRange { limit, .. } if limit == 1 + MAX_INDEX_SLACK
        ));

        // Gaps left by destroyed entities stay loadable.
        let json = format!(
            r#"{{ "aspects": {header}, "entities": [
                {{ "entity": 4000, "aspects": {{}} }}
            ] }}"#
        );
        assert_eq!(schema.decode(&json).unwrap().len(), 1);
    }

    #[test]
    fn duplicate_entities_are_rejected() {
        let schema = actor_schema();
        let header = serde_json::to_string(&schema.names()).unwrap();
        let json = format!(
            r#"{{ "aspects": {header}, "entities": [
                {{ "entity": 3, "aspects": {{}} }},
                {{ "entity": 3, "aspects": {{}} }}
            ] }}"#
        );

        let err = schema.decode(&json).err().unwrap();
        assert!(matches!(
            err,
            PersistenceError::Store(StoreError::AlreadyAlive(_))
        ));
    }
}
