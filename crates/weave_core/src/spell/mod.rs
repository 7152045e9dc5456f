//! Spell data and the instantiation protocol.
//!
//! - [`aspects`]: the closed set of aspect types spells and actors carry
//! - [`schema`]: the ordered aspect lists and the process-wide stamp registry
//! - [`rewire`]: target resolution from a spell's targeting mode
//! - [`cast`]: prototype lookup and instance creation
//! - [`catalog`]: starter spells and actors

pub mod aspects;
pub mod cast;
pub mod catalog;
pub mod rewire;
pub mod schema;

pub use aspects::{ActorRef, ExternalId, TargetType};
pub use cast::{cast_by_name, find_by_name, find_spell, CastOutcome, Spellcast};
pub use rewire::{rewire, Rewired};
pub use schema::{stamps, AspectVisitor};
