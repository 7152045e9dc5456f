use crate::ecs::{SchemaError, StoreError};
use thiserror::Error;

/// Errors surfaced by the simulation facade.
///
/// Everything here is a configuration or schema fault; recoverable per-cast
/// misses are reported through `CastOutcome` instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("tick interval must be positive and finite, got {0}")]
    InvalidTickInterval(f32),

    #[error("prototype schema is incomplete: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
