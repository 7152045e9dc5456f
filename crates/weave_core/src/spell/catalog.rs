//! Built-in starter content used when no authored data is on disk.

use crate::ecs::{Store, StoreError};
use crate::spell::aspects::*;
use glam::Vec3;

pub const FIREBALL: &str = "Fireball";
pub const BURN: &str = "Burn";
pub const HEAL_SELF: &str = "Heal Self";
pub const FROST_NOVA: &str = "Frost Nova";

pub const HERO: &str = "Hero";
pub const VILLAIN: &str = "Villain";

/// Spell prototypes: a single-target nuke with a burning fragment, a
/// self-heal and an untargeted nova.
pub fn starter_definitions() -> Result<Store, StoreError> {
    let mut store = Store::new();

    let burn = store.create();
    store.emplace(burn, Name::new(BURN))?;
    store.emplace(burn, SpellFragment)?;
    store.emplace(
        burn,
        Damage {
            quantity: 4.0,
            damage_type: DamageType::Fire,
            over_time: true,
        },
    )?;
    store.emplace(burn, Duration::new(2.0))?;
    store.emplace(burn, TickEachInterval { interval: 0.5 })?;
    store.emplace(burn, Debuff)?;

    let fireball = store.create();
    store.emplace(fireball, Name::new(FIREBALL))?;
    store.emplace(
        fireball,
        Spell {
            fragments: vec![burn],
        },
    )?;
    store.emplace(
        fireball,
        SpellTargetType {
            target_type: TargetType::SingleTarget,
        },
    )?;
    store.emplace(
        fireball,
        SpellTargetAggressionType {
            aggression: TargetAggression::Hostile,
        },
    )?;
    store.emplace(
        fireball,
        Damage {
            quantity: 20.0,
            damage_type: DamageType::Fire,
            over_time: false,
        },
    )?;
    store.emplace(
        fireball,
        UtiliseQi {
            quantity: 10.0,
            over_time: false,
        },
    )?;
    store.emplace(fireball, Range { min: 0.0, max: 30.0 })?;
    store.emplace(fireball, Cooldown::new(1.5))?;
    store.emplace(
        fireball,
        AnimationFragmentSpellCast {
            fragment: "Cast_Fireball".into(),
        },
    )?;

    let heal = store.create();
    store.emplace(heal, Name::new(HEAL_SELF))?;
    store.emplace(heal, Spell::default())?;
    store.emplace(
        heal,
        SpellTargetType {
            target_type: TargetType::Caster,
        },
    )?;
    store.emplace(
        heal,
        Heal {
            quantity: 15.0,
            over_time: false,
        },
    )?;
    store.emplace(
        heal,
        UtiliseQi {
            quantity: 5.0,
            over_time: false,
        },
    )?;
    store.emplace(heal, Buff)?;
    store.emplace(heal, AnimationTag { tag: "heal".into() })?;

    let nova = store.create();
    store.emplace(nova, Name::new(FROST_NOVA))?;
    store.emplace(nova, Spell::default())?;
    store.emplace(
        nova,
        SpellTargetType {
            target_type: TargetType::SourceBasedAoe,
        },
    )?;
    store.emplace(
        nova,
        AreaOfEffect {
            radius: 8.0,
            offset: Vec3::ZERO,
        },
    )?;
    store.emplace(nova, CrowdControlMovementRestricted)?;
    store.emplace(nova, Duration::new(3.0))?;
    store.emplace(nova, Debuff)?;

    Ok(store)
}

/// Two opposing actors.
pub fn starter_actors() -> Result<Store, StoreError> {
    let mut store = Store::new();

    let hero = store.create();
    store.emplace(hero, Name::new(HERO))?;
    store.emplace(hero, Health::new(100.0))?;
    store.emplace(hero, Qi::new(60.0, 2.0))?;
    store.emplace(
        hero,
        RenderLight {
            color: Vec3::new(1.0, 0.85, 0.6),
            radius: 4.0,
            intensity: 1.0,
        },
    )?;

    let villain = store.create();
    store.emplace(villain, Name::new(VILLAIN))?;
    store.emplace(villain, Health::new(120.0))?;
    store.emplace(villain, Qi::new(40.0, 1.0))?;
    store.emplace(
        villain,
        ItemClass {
            class: "staff".into(),
        },
    )?;

    Ok(store)
}
