use crate::ecs::Store;

/// The per-step game-state transforms the simulation drives each frame.
///
/// The simulation fixes which step runs, with which delta and in what order;
/// what each step does is up to the implementation. Every step defaults to a
/// no-op so implementations only override what they simulate.
///
/// Immediate pass, every frame:
/// `update_timers`, `apply_damage`, `apply_heal`, `health_check`,
/// `apply_qi_utilisation`, `apply_qi_replenishment`.
///
/// Tick pass, once per elapsed tick interval:
/// `apply_damage_over_time`, `apply_heal_over_time`, `health_check`,
/// `apply_qi_utilisation_over_time`, `apply_qi_replenishment_over_time`,
/// `update_actors`.
///
/// Then `world_spellcasts`, every frame.
pub trait Transforms {
    fn update_timers(&mut self, _dt: f32, _instances: &mut Store) {}

    fn apply_damage(&mut self, _instances: &mut Store, _actors: &mut Store) {}

    fn apply_heal(&mut self, _instances: &mut Store, _actors: &mut Store) {}

    fn health_check(&mut self, _instances: &mut Store, _actors: &mut Store) {}

    fn apply_qi_utilisation(&mut self, _instances: &mut Store, _actors: &mut Store) {}

    fn apply_qi_replenishment(&mut self, _instances: &mut Store, _actors: &mut Store) {}

    fn apply_damage_over_time(&mut self, _dt: f32, _instances: &mut Store, _actors: &mut Store) {}

    fn apply_heal_over_time(&mut self, _dt: f32, _instances: &mut Store, _actors: &mut Store) {}

    fn apply_qi_utilisation_over_time(
        &mut self,
        _dt: f32,
        _instances: &mut Store,
        _actors: &mut Store,
    ) {
    }

    fn apply_qi_replenishment_over_time(
        &mut self,
        _dt: f32,
        _instances: &mut Store,
        _actors: &mut Store,
    ) {
    }

    fn update_actors(&mut self, _dt: f32, _actors: &mut Store) {}

    fn world_spellcasts(&mut self, _dt: f32, _instances: &mut Store, _actors: &mut Store) {}
}

/// Transforms that leave both stores untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransforms;

impl Transforms for NoTransforms {}
