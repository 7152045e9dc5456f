//! Entity stores and type-erased aspect copying.
//!
//! Not a general ECS. A [`Store`] holds entities with at most one aspect of
//! each type, [`Store::visit`] reports which aspect types an entity carries,
//! and the [`StampRegistry`] turns those ids back into typed copies between
//! stores. That is enough to instantiate prototypes whose aspect set is only
//! known at run time.

mod aspect;
mod entity;
mod error;
mod stamp;
mod store;

pub use aspect::{Aspect, AspectId};
pub use entity::Entity;
pub use error::{SchemaError, StoreError};
pub use stamp::{stamp, StampFn, StampRegistry};
pub use store::Store;
