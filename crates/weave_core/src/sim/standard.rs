//! Reference transforms: simple health and qi rules plus instance eviction.

use crate::ecs::{Aspect, Entity, Store};
use crate::sim::Transforms;
use crate::spell::aspects::{
    Cooldown, Damage, Delay, Duration, Heal, Health, Qi, ReplenishQi, SourceEntity,
    SpellcastExecution, TargetEntity, Timer, UtiliseQi,
};
use tracing::{debug, info};

/// Quantity-bearing effect aspects.
trait Effect: Aspect + Copy {
    fn quantity(&self) -> f32;
    fn over_time(&self) -> bool;
}

macro_rules! impl_effect {
    ($($ty:ty),+) => {
        $(
            impl Effect for $ty {
                fn quantity(&self) -> f32 {
                    self.quantity
                }

                fn over_time(&self) -> bool {
                    self.over_time
                }
            }
        )+
    };
}

impl_effect!(Damage, Heal, UtiliseQi, ReplenishQi);

fn is_delayed(instances: &Store, instance: Entity) -> bool {
    instances
        .try_get::<Delay>(instance)
        .is_some_and(|delay| !delay.is_expired())
}

fn duration_running(instances: &Store, instance: Entity) -> bool {
    instances
        .try_get::<Duration>(instance)
        .is_some_and(|duration| !duration.is_expired())
}

fn source_of(instances: &Store, instance: Entity) -> Option<Entity> {
    instances.try_get::<SourceEntity>(instance)?.entity
}

fn target_of(instances: &Store, instance: Entity) -> Option<Entity> {
    instances.try_get::<TargetEntity>(instance)?.entity
}

/// Effects of type `T` ready to apply this step.
///
/// Direct effects are ready once any delay has passed; over-time effects
/// additionally need a running duration.
fn ready<T: Effect>(instances: &Store, over_time: bool) -> Vec<(Entity, T)> {
    instances
        .each::<T>()
        .filter(|(instance, effect)| {
            effect.over_time() == over_time
                && !is_delayed(instances, *instance)
                && (!over_time || duration_running(instances, *instance))
        })
        .map(|(instance, effect)| (instance, *effect))
        .collect()
}

fn has_direct<T: Effect>(instances: &Store, instance: Entity) -> bool {
    instances
        .try_get::<T>(instance)
        .is_some_and(|effect| !effect.over_time())
}

/// Whether an instance has nothing left to do.
fn is_finished(instances: &Store, instance: Entity) -> bool {
    let cooling_down = instances
        .try_get::<Cooldown>(instance)
        .is_some_and(|cooldown| !cooldown.is_expired());

    !is_delayed(instances, instance)
        && !duration_running(instances, instance)
        && !cooling_down
        && !has_direct::<Damage>(instances, instance)
        && !has_direct::<Heal>(instances, instance)
        && !has_direct::<UtiliseQi>(instances, instance)
        && !has_direct::<ReplenishQi>(instances, instance)
}

fn adjust_health(actors: &mut Store, actor: Option<Entity>, delta: f32) {
    let health = match actor {
        Some(actor) => actors.try_get_mut::<Health>(actor),
        None => None,
    };
    let Some(health) = health else {
        debug!(?actor, "health target missing, effect dropped");
        return;
    };
    if !health.is_dead {
        health.current += delta;
    }
}

fn adjust_qi(actors: &mut Store, actor: Option<Entity>, delta: f32) {
    let qi = match actor {
        Some(actor) => actors.try_get_mut::<Qi>(actor),
        None => None,
    };
    let Some(qi) = qi else {
        debug!(?actor, "qi target missing, effect dropped");
        return;
    };
    qi.current = (qi.current + delta).clamp(0.0, qi.max);
}

/// Straightforward health/qi rules.
///
/// - Timers count up, delays count down, durations count down once the
///   delay has passed, cooldowns count down.
/// - Direct effects apply once and are then removed from the instance.
/// - Over-time effects apply `quantity * dt` while the duration runs.
/// - Damage and heal land on the target, qi utilisation on the source and
///   qi replenishment on the target.
/// - Finished instances are evicted during the world spellcast pass.
#[derive(Debug, Clone, Default)]
pub struct StandardTransforms {
    evicted: u64,
}

impl StandardTransforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instances evicted so far.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

impl Transforms for StandardTransforms {
    fn update_timers(&mut self, dt: f32, instances: &mut Store) {
        for (_, timer) in instances.each_mut::<Timer>() {
            timer.elapsed += dt;
        }
        for (_, execution) in instances.each_mut::<SpellcastExecution>() {
            execution.elapsed += dt;
        }
        for (_, cooldown) in instances.each_mut::<Cooldown>() {
            cooldown.advance(dt);
        }

        let running: Vec<Entity> = instances
            .entities_with::<Duration>()
            .into_iter()
            .filter(|&instance| !is_delayed(instances, instance))
            .collect();
        for instance in running {
            if let Some(duration) = instances.try_get_mut::<Duration>(instance) {
                duration.advance(dt);
            }
        }

        for (_, delay) in instances.each_mut::<Delay>() {
            delay.advance(dt);
        }
    }

    fn apply_damage(&mut self, instances: &mut Store, actors: &mut Store) {
        for (instance, damage) in ready::<Damage>(instances, false) {
            adjust_health(actors, target_of(instances, instance), -damage.quantity());
            instances.remove::<Damage>(instance);
        }
    }

    fn apply_heal(&mut self, instances: &mut Store, actors: &mut Store) {
        for (instance, heal) in ready::<Heal>(instances, false) {
            adjust_health(actors, target_of(instances, instance), heal.quantity());
            instances.remove::<Heal>(instance);
        }
    }

    fn health_check(&mut self, _instances: &mut Store, actors: &mut Store) {
        for (actor, health) in actors.each_mut::<Health>() {
            if health.current <= 0.0 {
                health.current = 0.0;
                if !health.is_dead {
                    health.is_dead = true;
                    info!(%actor, "actor died");
                }
            } else if health.current > health.max {
                health.current = health.max;
            }
        }
    }

    fn apply_qi_utilisation(&mut self, instances: &mut Store, actors: &mut Store) {
        for (instance, use_qi) in ready::<UtiliseQi>(instances, false) {
            adjust_qi(actors, source_of(instances, instance), -use_qi.quantity());
            instances.remove::<UtiliseQi>(instance);
        }
    }

    fn apply_qi_replenishment(&mut self, instances: &mut Store, actors: &mut Store) {
        for (instance, replenish) in ready::<ReplenishQi>(instances, false) {
            adjust_qi(actors, target_of(instances, instance), replenish.quantity());
            instances.remove::<ReplenishQi>(instance);
        }
    }

    fn apply_damage_over_time(&mut self, dt: f32, instances: &mut Store, actors: &mut Store) {
        for (instance, damage) in ready::<Damage>(instances, true) {
            adjust_health(actors, target_of(instances, instance), -damage.quantity() * dt);
        }
    }

    fn apply_heal_over_time(&mut self, dt: f32, instances: &mut Store, actors: &mut Store) {
        for (instance, heal) in ready::<Heal>(instances, true) {
            adjust_health(actors, target_of(instances, instance), heal.quantity() * dt);
        }
    }

    fn apply_qi_utilisation_over_time(
        &mut self,
        dt: f32,
        instances: &mut Store,
        actors: &mut Store,
    ) {
        for (instance, use_qi) in ready::<UtiliseQi>(instances, true) {
            adjust_qi(actors, source_of(instances, instance), -use_qi.quantity() * dt);
        }
    }

    fn apply_qi_replenishment_over_time(
        &mut self,
        dt: f32,
        instances: &mut Store,
        actors: &mut Store,
    ) {
        for (instance, replenish) in ready::<ReplenishQi>(instances, true) {
            adjust_qi(actors, target_of(instances, instance), replenish.quantity() * dt);
        }
    }

    fn update_actors(&mut self, dt: f32, actors: &mut Store) {
        let dead: Vec<Entity> = actors
            .each::<Health>()
            .filter(|(_, health)| health.is_dead)
            .map(|(actor, _)| actor)
            .collect();

        for (actor, qi) in actors.each_mut::<Qi>() {
            qi.time_since_last_spellcast += dt;
            if !dead.contains(&actor) {
                qi.current = (qi.current + qi.regen * dt).min(qi.max);
            }
        }
    }

    fn world_spellcasts(&mut self, _dt: f32, instances: &mut Store, _actors: &mut Store) {
        let finished: Vec<Entity> = instances
            .entities_with::<SpellcastExecution>()
            .into_iter()
            .filter(|&instance| is_finished(instances, instance))
            .collect();

        for instance in &finished {
            instances.destroy(*instance);
        }
        if !finished.is_empty() {
            self.evicted += finished.len() as u64;
            debug!(count = finished.len(), "evicted finished spellcasts");
        }
    }
}
