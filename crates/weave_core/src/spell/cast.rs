//! Spell instantiation: turn a named prototype into spellcast instances.

use crate::ecs::{Entity, SchemaError, StampRegistry, Store};
use crate::spell::aspects::{
    ActorRef, Name, Qi, SourceEntity, Spell, SpellTargetType, SpellcastExecution, TargetEntity,
};
use crate::spell::rewire::{rewire, Rewired};
use tracing::debug;

/// Instances created by one successful cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spellcast {
    pub spell: Entity,
    pub fragments: Vec<Entity>,
    pub source: ActorRef,
    pub target: ActorRef,
}

impl Spellcast {
    /// The spell instance followed by its fragment instances.
    pub fn instances(&self) -> impl Iterator<Item = Entity> + '_ {
        std::iter::once(self.spell).chain(self.fragments.iter().copied())
    }
}

/// What a cast request turned into. Only `Cast` touches the instance store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastOutcome {
    Cast(Spellcast),
    /// No prototype carries both `Name == name` and `Spell`.
    UnknownSpell,
    /// The caster handle is null or no longer alive in the actor store.
    UnknownCaster,
    /// The spell lists a fragment prototype that no longer exists.
    MissingFragment { fragment: Entity },
}

/// Find the first entity whose `Name` matches. Linear scan.
pub fn find_by_name(store: &Store, name: &str) -> Option<Entity> {
    store
        .each::<Name>()
        .find(|(_, candidate)| candidate.name == name)
        .map(|(entity, _)| entity)
}

/// Find a spell prototype (an entity with both `Name` and `Spell`) by name.
pub fn find_spell(prototypes: &Store, name: &str) -> Option<Entity> {
    prototypes
        .each::<Name>()
        .filter(|(entity, _)| prototypes.has::<Spell>(*entity))
        .find(|(_, candidate)| candidate.name == name)
        .map(|(entity, _)| entity)
}

/// Create one instance of `prototype`, stamped and wired to `rewired`.
///
/// On failure the half-built instance is destroyed before returning.
fn instantiate(
    stamps: &StampRegistry,
    prototypes: &Store,
    instances: &mut Store,
    prototype: Entity,
    rewired: Rewired,
) -> Result<Entity, SchemaError> {
    let instance = instances.create();
    let result = stamps
        .stamp_all(prototypes, prototype, instances, instance)
        .and_then(|_| {
            instances.emplace(instance, SourceEntity::from(rewired.source))?;
            instances.emplace(instance, TargetEntity::from(rewired.target))?;
            instances.emplace(instance, SpellcastExecution::default())?;
            Ok(())
        });

    match result {
        Ok(()) => Ok(instance),
        Err(err) => {
            instances.destroy(instance);
            Err(err)
        }
    }
}

/// Cast the spell prototype called `name` from `caster` at `raw_target`.
///
/// The spell and each fragment become instance entities sharing the source
/// and target resolved from the spell's targeting mode. The cast is atomic:
/// either every instance is created or none is.
pub fn cast_by_name(
    stamps: &StampRegistry,
    prototypes: &Store,
    instances: &mut Store,
    actors: &mut Store,
    name: &str,
    caster: ActorRef,
    raw_target: ActorRef,
) -> Result<CastOutcome, SchemaError> {
    let Some(prototype) = find_spell(prototypes, name) else {
        return Ok(CastOutcome::UnknownSpell);
    };

    let Some(caster_entity) = caster.entity.filter(|&entity| actors.is_alive(entity)) else {
        return Ok(CastOutcome::UnknownCaster);
    };

    let fragments = prototypes.get::<Spell>(prototype)?.fragments.clone();
    if let Some(&fragment) = fragments.iter().find(|&&f| !prototypes.is_alive(f)) {
        return Ok(CastOutcome::MissingFragment { fragment });
    }

    let mode = prototypes
        .try_get::<SpellTargetType>(prototype)
        .map(|targeting| targeting.target_type);
    let rewired = rewire(mode, caster, raw_target);

    let spell = instantiate(stamps, prototypes, instances, prototype, rewired)?;
    let mut created = Vec::with_capacity(fragments.len());
    for &fragment in &fragments {
        match instantiate(stamps, prototypes, instances, fragment, rewired) {
            Ok(instance) => created.push(instance),
            Err(err) => {
                for instance in std::iter::once(spell).chain(created) {
                    instances.destroy(instance);
                }
                return Err(err);
            }
        }
    }

    match actors.try_get_mut::<Qi>(caster_entity) {
        Some(qi) => qi.time_since_last_spellcast = 0.0,
        None => debug!(caster = %caster_entity, "caster has no qi pool to reset"),
    }

    debug!(
        spell = name,
        instance = %spell,
        fragments = created.len(),
        target = ?rewired.target.entity,
        "spell instantiated"
    );

    Ok(CastOutcome::Cast(Spellcast {
        spell,
        fragments: created,
        source: rewired.source,
        target: rewired.target,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Aspect, AspectId};
    use crate::spell::aspects::*;
    use crate::spell::catalog::{self, FIREBALL, HEAL_SELF, HERO, VILLAIN};
    use crate::spell::schema::{self, AspectVisitor};
    use serde::de::DeserializeOwned;
    use serde::Serialize;

    struct Fixture {
        prototypes: Store,
        instances: Store,
        actors: Store,
        hero: ActorRef,
        villain: ActorRef,
    }

    fn fixture() -> Fixture {
        let prototypes = catalog::starter_definitions().unwrap();
        let actors = catalog::starter_actors().unwrap();
        let hero = ActorRef::new(find_by_name(&actors, HERO).unwrap(), ExternalId(1));
        let villain = ActorRef::new(find_by_name(&actors, VILLAIN).unwrap(), ExternalId(2));
        Fixture {
            prototypes,
            instances: Store::new(),
            actors,
            hero,
            villain,
        }
    }

    fn cast_spell(
        fx: &mut Fixture,
        name: &str,
        caster: ActorRef,
        target: ActorRef,
    ) -> CastOutcome {
        cast_by_name(
            schema::stamps().unwrap(),
            &fx.prototypes,
            &mut fx.instances,
            &mut fx.actors,
            name,
            caster,
            target,
        )
        .unwrap()
    }

    #[test]
    fn fireball_creates_spell_and_fragment_instances() {
        let mut fx = fixture();
        let (hero, villain) = (fx.hero, fx.villain);
        let hero_entity = hero.entity.unwrap();
        fx.actors
            .get_mut::<Qi>(hero_entity)
            .unwrap()
            .time_since_last_spellcast = 12.0;

        let CastOutcome::Cast(cast) = cast_spell(&mut fx, FIREBALL, hero, villain) else {
            panic!("fireball should cast");
        };

        assert_eq!(fx.instances.len(), 2);
        assert_eq!(cast.fragments.len(), 1);
        for instance in cast.instances() {
            let source = fx.instances.get::<SourceEntity>(instance).unwrap();
            let target = fx.instances.get::<TargetEntity>(instance).unwrap();
            assert_eq!(source.entity, fx.hero.entity);
            assert_eq!(source.external_id, ExternalId(1));
            assert_eq!(target.entity, fx.villain.entity);
            assert_eq!(target.external_id, ExternalId(2));
            assert!(fx.instances.has::<SpellcastExecution>(instance));
        }

        let burn = cast.fragments[0];
        assert_eq!(fx.instances.get::<Name>(burn).unwrap().name, catalog::BURN);
        assert!(fx.instances.get::<Damage>(burn).unwrap().over_time);
        assert_eq!(
            fx.actors.get::<Qi>(hero_entity).unwrap().time_since_last_spellcast,
            0.0
        );
    }

    #[test]
    fn heal_self_ignores_the_raw_target() {
        let mut fx = fixture();
        let (hero, villain) = (fx.hero, fx.villain);
        let CastOutcome::Cast(cast) = cast_spell(&mut fx, HEAL_SELF, hero, villain) else {
            panic!("heal should cast");
        };

        assert_eq!(fx.instances.len(), 1);
        assert!(cast.fragments.is_empty());
        let target = fx.instances.get::<TargetEntity>(cast.spell).unwrap();
        assert_eq!(target.entity, fx.hero.entity);
        assert_eq!(target.external_id, fx.hero.external_id);
    }

    #[test]
    fn area_spell_has_a_null_target() {
        let mut fx = fixture();
        let (hero, villain) = (fx.hero, fx.villain);
        let CastOutcome::Cast(cast) = cast_spell(&mut fx, catalog::FROST_NOVA, hero, villain)
        else {
            panic!("nova should cast");
        };
        let target = fx.instances.get::<TargetEntity>(cast.spell).unwrap();
        assert_eq!(target.entity, None);
        assert_eq!(target.external_id, ExternalId::INVALID);
    }

    #[test]
    fn unknown_names_and_fragments_are_no_ops() {
        let mut fx = fixture();
        let (hero, villain) = (fx.hero, fx.villain);
        assert_eq!(
            cast_spell(&mut fx, "Meteor", hero, villain),
            CastOutcome::UnknownSpell
        );
        // Fragments are not castable on their own.
        assert_eq!(
            cast_spell(&mut fx, catalog::BURN, hero, villain),
            CastOutcome::UnknownSpell
        );
        assert_eq!(
            cast_spell(&mut fx, FIREBALL, ActorRef::NULL, villain),
            CastOutcome::UnknownCaster
        );
        assert!(fx.instances.is_empty());
    }

    #[test]
    fn missing_fragment_aborts_the_whole_cast() {
        let mut fx = fixture();
        let (hero, villain) = (fx.hero, fx.villain);
        let burn = find_by_name(&fx.prototypes, catalog::BURN).unwrap();
        fx.prototypes.destroy(burn);

        assert_eq!(
            cast_spell(&mut fx, FIREBALL, hero, villain),
            CastOutcome::MissingFragment { fragment: burn }
        );
        assert!(fx.instances.is_empty());
    }

    #[test]
    fn fragments_share_the_parent_targeting() {
        let mut fx = fixture();
        let (hero, villain) = (fx.hero, fx.villain);
        // A self-targeted spell whose fragment declares no targeting of its own.
        let ward = fx.prototypes.create();
        fx.prototypes.emplace(ward, Name::new("Ward")).unwrap();
        fx.prototypes.emplace(ward, SpellFragment).unwrap();
        let shield = fx.prototypes.create();
        fx.prototypes.emplace(shield, Name::new("Shield")).unwrap();
        fx.prototypes
            .emplace(shield, Spell { fragments: vec![ward, ward] })
            .unwrap();
        fx.prototypes
            .emplace(
                shield,
                SpellTargetType {
                    target_type: TargetType::Caster,
                },
            )
            .unwrap();

        let CastOutcome::Cast(cast) = cast_spell(&mut fx, "Shield", hero, villain) else {
            panic!("shield should cast");
        };
        assert_eq!(fx.instances.len(), 3);
        for instance in cast.instances() {
            let target = fx.instances.get::<TargetEntity>(instance).unwrap();
            assert_eq!(target.entity, fx.hero.entity);
        }
    }

    /// Attaches one default-ish value of every definition aspect.
    struct EveryAspect<'a> {
        store: &'a mut Store,
        entity: Entity,
        ids: Vec<AspectId>,
    }

    impl AspectVisitor for EveryAspect<'_> {
        fn visit<T>(&mut self)
        where
            T: Aspect + Serialize + DeserializeOwned,
        {
            self.ids.push(T::ID);
            let value: T = serde_json::from_value(sample_json(T::NAME, self.entity)).unwrap();
            self.store.emplace(self.entity, value).unwrap();
        }
    }

    fn sample_json(name: &str, entity: Entity) -> serde_json::Value {
        use serde_json::json;
        match name {
            "Name" => json!({ "name": "Everything" }),
            "Prototype" => json!({ "prototype": entity.to_bits() }),
            "Health" => json!({ "current": 1.0, "max": 2.0 }),
            "Damage" | "Heal" | "UtiliseQi" | "ReplenishQi" => json!({ "quantity": 3.0 }),
            "Qi" => json!({ "current": 1.0, "max": 5.0 }),
            "Spell" => json!({ "fragments": [] }),
            "SpellTargetType" => json!({ "target_type": "singleTarget" }),
            "SpellTargetAggressionType" => json!({ "aggression": "hostile" }),
            "RenderLight" => json!({ "color": [1.0, 0.0, 0.0], "radius": 1.0, "intensity": 1.0 }),
            "Timer" => json!({ "elapsed": 0.0 }),
            "Duration" | "Delay" | "Cooldown" => json!({ "total": 1.0, "remaining": 1.0 }),
            "Range" => json!({ "min": 0.0, "max": 10.0 }),
            "TickEachInterval" => json!({ "interval": 0.5 }),
            "MovementFactor" => json!({ "factor": 0.5 }),
            "AreaOfEffect" => json!({ "radius": 4.0 }),
            "AnimationFragmentSpellCast" | "AnimationFragmentEmote" => {
                json!({ "fragment": "anim" })
            }
            "AnimationTag" => json!({ "tag": "tag" }),
            _ => serde_json::Value::Null,
        }
    }

    #[test]
    fn instance_carries_exactly_the_prototype_aspects() {
        let mut fx = fixture();
        let (hero, villain) = (fx.hero, fx.villain);
        let everything = fx.prototypes.create();
        let mut every = EveryAspect {
            store: &mut fx.prototypes,
            entity: everything,
            ids: Vec::new(),
        };
        schema::visit_definition_aspects(&mut every);
        let mut expected = every.ids;
        expected.extend([SourceEntity::ID, TargetEntity::ID, SpellcastExecution::ID]);
        expected.sort_unstable();

        let CastOutcome::Cast(cast) = cast_spell(&mut fx, "Everything", hero, villain) else {
            panic!("everything should cast");
        };
        assert_eq!(fx.instances.aspect_ids(cast.spell), expected);
        assert_eq!(
            fx.instances.get::<Range>(cast.spell).unwrap(),
            fx.prototypes.get::<Range>(everything).unwrap()
        );
    }
}
