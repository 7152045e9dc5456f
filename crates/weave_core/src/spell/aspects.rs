//! The aspect universe shared by prototypes, spellcast instances and actors.
//!
//! IDs are grouped by concern:
//! - 1..20   common actor/spell data
//! - 20..50  spell structure, targeting and actions
//! - 50..70  timing and shape
//! - 70..80  animation
//! - 80..100 crowd control
//! - 100..   runtime-only aspects attached by the instantiation protocol

use crate::define_aspect;
use crate::ecs::Entity;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifier the host engine uses for its own world objects.
///
/// Opaque to the simulation: it is carried alongside actor handles and
/// handed back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(pub u32);

impl ExternalId {
    pub const INVALID: Self = Self(0);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// An actor-store handle paired with the host's id for the same actor.
///
/// `entity == None` is the null handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActorRef {
    pub entity: Option<Entity>,
    pub external_id: ExternalId,
}

impl ActorRef {
    pub const NULL: Self = Self {
        entity: None,
        external_id: ExternalId::INVALID,
    };

    pub fn new(entity: Entity, external_id: ExternalId) -> Self {
        Self {
            entity: Some(entity),
            external_id,
        }
    }

    pub fn is_null(&self) -> bool {
        self.entity.is_none()
    }
}

// ============================================================================
// Common
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub name: String,
}

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
define_aspect!(Name, 1, "Name");

/// Marks an entity as derived from a prototype in the prototype store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prototype {
    pub prototype: Entity,
}
define_aspect!(Prototype, 2, "Prototype");

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    #[serde(default)]
    pub is_dead: bool,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            is_dead: false,
        }
    }
}
define_aspect!(Health, 3, "Health");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DamageType {
    #[default]
    Physical,
    Fire,
    Frost,
    Poison,
    Arcane,
    Holy,
}

/// Damage dealt to the target actor. Direct damage applies once; over-time
/// damage applies `quantity` per second while the instance's duration runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Damage {
    pub quantity: f32,
    #[serde(default)]
    pub damage_type: DamageType,
    #[serde(default)]
    pub over_time: bool,
}
define_aspect!(Damage, 4, "Damage");

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heal {
    pub quantity: f32,
    #[serde(default)]
    pub over_time: bool,
}
define_aspect!(Heal, 5, "Heal");

/// The actor resource pool spells draw on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Qi {
    pub current: f32,
    pub max: f32,
    /// Passive regeneration per second.
    #[serde(default)]
    pub regen: f32,
    #[serde(default)]
    pub time_since_last_spellcast: f32,
}

impl Qi {
    pub fn new(max: f32, regen: f32) -> Self {
        Self {
            current: max,
            max,
            regen,
            time_since_last_spellcast: 0.0,
        }
    }
}
define_aspect!(Qi, 6, "Qi");

/// Qi spent by the caster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtiliseQi {
    pub quantity: f32,
    #[serde(default)]
    pub over_time: bool,
}
define_aspect!(UtiliseQi, 7, "UtiliseQi");

/// Qi restored to the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplenishQi {
    pub quantity: f32,
    #[serde(default)]
    pub over_time: bool,
}
define_aspect!(ReplenishQi, 8, "ReplenishQi");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemClass {
    pub class: String,
}
define_aspect!(ItemClass, 9, "ItemClass");

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderLight {
    pub color: Vec3,
    pub radius: f32,
    pub intensity: f32,
}
define_aspect!(RenderLight, 10, "RenderLight");

// ============================================================================
// Spell structure and targeting
// ============================================================================

/// A whole spell: the fragment prototypes instantiated alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Spell {
    #[serde(default)]
    pub fragments: Vec<Entity>,
}
define_aspect!(Spell, 20, "Spell");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetType {
    None,
    #[serde(rename = "self")]
    Caster,
    SingleTarget,
    Cone,
    Column,
    SourceBasedAoe,
    GroundTargetedAoe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellTargetType {
    pub target_type: TargetType,
}
define_aspect!(SpellTargetType, 22, "SpellTargetType");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetAggression {
    Friendly,
    Hostile,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellTargetAggressionType {
    pub aggression: TargetAggression,
}
define_aspect!(SpellTargetAggressionType, 23, "SpellTargetAggressionType");

/// Declare data-less marker aspects.
macro_rules! marker_aspects {
    ($($(#[$meta:meta])* $ty:ident = $id:expr;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
            pub struct $ty;
            define_aspect!($ty, $id, stringify!($ty));
        )+
    };
}

marker_aspects! {
    /// Reusable bundle of aspects referenced from a `Spell`.
    SpellFragment = 21;
    SpellActionSchematyc = 30;
    SpellActionDRS = 31;
    SpellActionInspect = 32;
    SpellActionExamine = 33;
    SpellActionTake = 34;
    SpellActionDrop = 35;
    SpellActionThrow = 36;
    SpellActionSwitch = 37;
    SpellActionOpen = 38;
    SpellActionClose = 39;
    SpellActionUnlock = 40;
    SpellActionLock = 41;
}

// ============================================================================
// Timing and shape
// ============================================================================

/// Counts up for as long as the instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Timer {
    pub elapsed: f32,
}
define_aspect!(Timer, 50, "Timer");

/// Declare countdown aspects: a total and the time still remaining.
macro_rules! countdown_aspects {
    ($($(#[$meta:meta])* $ty:ident = $id:expr;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
            pub struct $ty {
                pub total: f32,
                pub remaining: f32,
            }

            impl $ty {
                pub fn new(seconds: f32) -> Self {
                    Self { total: seconds, remaining: seconds }
                }

                pub fn is_expired(&self) -> bool {
                    self.remaining <= 0.0
                }

                /// Count down by `dt`, stopping at zero.
                pub fn advance(&mut self, dt: f32) {
                    self.remaining = (self.remaining - dt).max(0.0);
                }
            }

            define_aspect!($ty, $id, stringify!($ty));
        )+
    };
}

countdown_aspects! {
    /// How long over-time effects keep applying.
    Duration = 51;
    /// Time before any effect of the instance applies.
    Delay = 52;
    Cooldown = 53;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}
define_aspect!(Range, 54, "Range");

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickEachInterval {
    pub interval: f32,
}
define_aspect!(TickEachInterval, 55, "TickEachInterval");

marker_aspects! {
    Aura = 56;
    Buff = 57;
    Debuff = 58;
    Channelled = 59;
    CancelOnMovement = 61;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementFactor {
    pub factor: f32,
}
define_aspect!(MovementFactor, 60, "MovementFactor");

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaOfEffect {
    pub radius: f32,
    #[serde(default)]
    pub offset: Vec3,
}
define_aspect!(AreaOfEffect, 62, "AreaOfEffect");

// ============================================================================
// Animation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationFragmentSpellCast {
    pub fragment: String,
}
define_aspect!(AnimationFragmentSpellCast, 70, "AnimationFragmentSpellCast");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationFragmentEmote {
    pub fragment: String,
}
define_aspect!(AnimationFragmentEmote, 71, "AnimationFragmentEmote");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationTag {
    pub tag: String,
}
define_aspect!(AnimationTag, 72, "AnimationTag");

// ============================================================================
// Crowd control
// ============================================================================

marker_aspects! {
    CrowdControlBlind = 80;
    CrowdControlDisarm = 81;
    CrowdControlMovementRestricted = 82;
    CrowdControlRotationRestricted = 83;
    CrowdControlFlee = 84;
    CrowdControlMindControl = 85;
    CrowdControlPull = 86;
    CrowdControlTaunt = 87;
    CrowdControlThrow = 88;
    CrowdControlKnockback = 89;
    CrowdControlKnockdown = 90;
    CrowdControlPolymorph = 91;
    CrowdControlSilence = 92;
}

// ============================================================================
// Runtime only
// ============================================================================

/// Resolved caster of a spellcast instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceEntity {
    pub entity: Option<Entity>,
    pub external_id: ExternalId,
}
define_aspect!(SourceEntity, 100, "SourceEntity");

/// Resolved target of a spellcast instance; `entity == None` for area spells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetEntity {
    pub entity: Option<Entity>,
    pub external_id: ExternalId,
}
define_aspect!(TargetEntity, 101, "TargetEntity");

impl From<ActorRef> for SourceEntity {
    fn from(actor: ActorRef) -> Self {
        Self {
            entity: actor.entity,
            external_id: actor.external_id,
        }
    }
}

impl From<ActorRef> for TargetEntity {
    fn from(actor: ActorRef) -> Self {
        Self {
            entity: actor.entity,
            external_id: actor.external_id,
        }
    }
}

/// Marks an instance as actively simulating.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpellcastExecution {
    pub elapsed: f32,
}
define_aspect!(SpellcastExecution, 102, "SpellcastExecution");
