// aspect.rs - Aspect (component) identity
//
// Aspects are identified by stable u32 IDs, not Rust TypeIds, so the same
// identifier can key the stamp registry, the store columns and the snapshot
// schema without depending on compiler-assigned values.

pub type AspectId = u32;

/// Trait for plain-data aspects attached to store entities.
///
/// Implementors must:
/// - Be plain data: cloning produces an independent copy with no shared state
/// - Carry an ID that is unique across the whole aspect universe
/// - Be Send + Sync so stores can move between threads between frames
pub trait Aspect: 'static + Clone + Send + Sync {
    /// Globally unique aspect ID.
    const ID: AspectId;

    /// Human-readable name, used by snapshots and diagnostics.
    const NAME: &'static str;
}

/// Helper macro to implement the Aspect trait.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Debug)]
/// struct Health { current: f32, max: f32 }
///
/// define_aspect!(Health, 3, "Health");
/// ```
#[macro_export]
macro_rules! define_aspect {
    ($ty:ty, $id:expr, $name:expr) => {
        impl $crate::ecs::Aspect for $ty {
            const ID: $crate::ecs::AspectId = $id;
            const NAME: &'static str = $name;
        }
    };
}
