//! Weave Services Layer
//!
//! File-backed services around the simulation: JSON settings and
//! entity-store snapshots.

pub mod save;
pub mod settings;

pub use save::{
    actor_schema, definition_schema, load_actors, load_definitions, save_actors,
    save_definitions, PersistenceError, SnapshotSchema,
};
pub use settings::{Settings, SettingsError};
