//! The closed aspect schema.
//!
//! Every aspect type that may appear on a prototype or an actor is listed
//! exactly once below. The stamp registry and the snapshot aspect lists are
//! both generated from these lists through [`AspectVisitor`], so adding an
//! aspect to a list registers it everywhere at once.

use crate::ecs::{Aspect, SchemaError, StampRegistry};
use crate::spell::aspects::*;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Receives each aspect type of a schema list, in list order.
pub trait AspectVisitor {
    fn visit<T>(&mut self)
    where
        T: Aspect + Serialize + DeserializeOwned;
}

macro_rules! aspect_list {
    ($(#[$meta:meta])* $fn_name:ident: [$($ty:ty),+ $(,)?]) => {
        $(#[$meta])*
        pub fn $fn_name<V: AspectVisitor>(visitor: &mut V) {
            $(visitor.visit::<$ty>();)+
        }
    };
}

aspect_list! {
    /// Aspects that can be authored on spell and fragment prototypes.
    ///
    /// The order is the on-disk order of definition snapshots.
    visit_definition_aspects: [
        Name, Prototype,
        Health, Damage, Heal,
        Qi, UtiliseQi, ReplenishQi,
        Spell, SpellFragment, SpellTargetType, SpellTargetAggressionType,
        SpellActionSchematyc, SpellActionDRS,
        SpellActionInspect, SpellActionExamine,
        SpellActionTake, SpellActionDrop, SpellActionThrow,
        SpellActionSwitch,
        SpellActionOpen, SpellActionClose,
        SpellActionUnlock, SpellActionLock,
        RenderLight,
        Timer, Duration, Delay,
        Range, TickEachInterval,
        Aura, Buff, Debuff, Cooldown,
        Channelled,
        AnimationFragmentSpellCast, AnimationFragmentEmote, AnimationTag,
        MovementFactor, CancelOnMovement, AreaOfEffect,
        CrowdControlBlind, CrowdControlDisarm, CrowdControlMovementRestricted,
        CrowdControlRotationRestricted, CrowdControlFlee, CrowdControlMindControl,
        CrowdControlPull, CrowdControlTaunt, CrowdControlThrow, CrowdControlKnockback,
        CrowdControlKnockdown, CrowdControlPolymorph, CrowdControlSilence,
    ]
}

aspect_list! {
    /// Aspects persisted for actors, in on-disk order.
    visit_actor_aspects: [
        Name, Prototype,
        Health, Damage, Heal,
        Qi, UtiliseQi, ReplenishQi,
        SpellFragment, ItemClass, RenderLight,
    ]
}

struct StampCollector {
    registry: StampRegistry,
    error: Option<SchemaError>,
}

impl AspectVisitor for StampCollector {
    fn visit<T>(&mut self)
    where
        T: Aspect + Serialize + DeserializeOwned,
    {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.registry.register::<T>() {
            self.error = Some(err);
        }
    }
}

/// Build a stamp registry covering every definition aspect.
pub fn build_stamp_registry() -> Result<StampRegistry, SchemaError> {
    let mut collector = StampCollector {
        registry: StampRegistry::new(),
        error: None,
    };
    visit_definition_aspects(&mut collector);
    match collector.error {
        Some(err) => Err(err),
        None => Ok(collector.registry),
    }
}

static STAMPS: Lazy<Result<StampRegistry, SchemaError>> = Lazy::new(build_stamp_registry);

/// The process-wide stamp registry, built on first use and fixed afterwards.
pub fn stamps() -> Result<&'static StampRegistry, SchemaError> {
    STAMPS.as_ref().map_err(Clone::clone)
}
