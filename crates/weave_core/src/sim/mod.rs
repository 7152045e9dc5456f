//! The simulation facade: three stores, the stamp registry and the dual-rate
//! update scheduler.
//!
//! Each [`Simulation::update`] runs, in order:
//! 1. the immediate pass with the frame delta,
//! 2. zero or more tick passes with the fixed tick interval (catching up on
//!    missed ticks),
//! 3. the world spellcast pass with the frame delta.

mod error;
mod standard;
mod transforms;

pub use error::SimulationError;
pub use standard::StandardTransforms;
pub use transforms::{NoTransforms, Transforms};

use crate::ecs::{Entity, StampRegistry, Store};
use crate::spell::{self, schema, ActorRef, CastOutcome};
use crate::time::TickScheduler;
use tracing::{debug, info, warn};
use weave_metrics::{Counter, SystemProfiler};

/// Running totals of cast outcomes, for gameplay diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CastStats {
    pub cast: u64,
    pub unknown_spell: u64,
    pub unknown_caster: u64,
    pub missing_fragment: u64,
}

pub struct Simulation<X: Transforms = StandardTransforms> {
    stamps: &'static StampRegistry,
    prototypes: Store,
    instances: Store,
    actors: Store,
    scheduler: TickScheduler,
    transforms: X,
    stats: CastStats,
    counter: Counter,
    profiler: SystemProfiler,
}

impl<X: Transforms> Simulation<X> {
    /// Create a simulation over the given prototype and actor stores using
    /// the process-wide stamp registry.
    ///
    /// Fails if any prototype carries an aspect without a stamp function.
    pub fn new(prototypes: Store, actors: Store, transforms: X) -> Result<Self, SimulationError> {
        Self::with_registry(schema::stamps()?, prototypes, actors, transforms)
    }

    /// Create a simulation with an explicit stamp registry.
    pub fn with_registry(
        stamps: &'static StampRegistry,
        prototypes: Store,
        actors: Store,
        transforms: X,
    ) -> Result<Self, SimulationError> {
        stamps.verify(&prototypes)?;
        info!(
            prototypes = prototypes.len(),
            actors = actors.len(),
            aspects = stamps.len(),
            "simulation initialised"
        );

        Ok(Self {
            stamps,
            prototypes,
            instances: Store::new(),
            actors,
            scheduler: TickScheduler::default(),
            transforms,
            stats: CastStats::default(),
            counter: Counter::default(),
            profiler: SystemProfiler::default(),
        })
    }

    /// Replace the tick interval. Resets the accumulator.
    pub fn with_tick_interval(mut self, interval: f32) -> Result<Self, SimulationError> {
        self.scheduler =
            TickScheduler::new(interval).ok_or(SimulationError::InvalidTickInterval(interval))?;
        Ok(self)
    }

    /// Swap in a freshly loaded prototype store.
    ///
    /// Live spellcast instances keep the aspects they were stamped with.
    pub fn reload_definitions(&mut self, prototypes: Store) -> Result<(), SimulationError> {
        self.stamps.verify(&prototypes)?;
        info!(prototypes = prototypes.len(), "definitions reloaded");
        self.prototypes = prototypes;
        Ok(())
    }

    /// Instantiate the spell called `name` from `caster` at `raw_target`.
    ///
    /// Lookup misses are logged, counted and returned; they never error.
    pub fn cast_by_name(
        &mut self,
        name: &str,
        caster: ActorRef,
        raw_target: ActorRef,
    ) -> Result<CastOutcome, SimulationError> {
        let outcome = spell::cast_by_name(
            self.stamps,
            &self.prototypes,
            &mut self.instances,
            &mut self.actors,
            name,
            caster,
            raw_target,
        )?;

        match &outcome {
            CastOutcome::Cast(cast) => {
                self.stats.cast += 1;
                self.counter.increment("cast.ok", 1);
                debug!(spell = name, instances = cast.fragments.len() + 1, "cast accepted");
            }
            CastOutcome::UnknownSpell => {
                self.stats.unknown_spell += 1;
                self.counter.increment("cast.unknown_spell", 1);
                warn!(spell = name, "cast ignored: no spell prototype with that name");
            }
            CastOutcome::UnknownCaster => {
                self.stats.unknown_caster += 1;
                self.counter.increment("cast.unknown_caster", 1);
                warn!(spell = name, caster = ?caster.entity, "cast ignored: caster is not alive");
            }
            CastOutcome::MissingFragment { fragment } => {
                self.stats.missing_fragment += 1;
                self.counter.increment("cast.missing_fragment", 1);
                warn!(spell = name, %fragment, "cast ignored: fragment prototype missing");
            }
        }

        Ok(outcome)
    }

    /// Advance the simulation by one host frame.
    pub fn update(&mut self, delta_time: f32) {
        let Self {
            instances,
            actors,
            scheduler,
            transforms,
            profiler,
            ..
        } = self;

        profiler.time_system("immediate", || {
            run_immediate(transforms, delta_time, instances, actors)
        });

        scheduler.accumulate(delta_time);
        let interval = scheduler.tick_interval();
        while scheduler.consume_tick() {
            profiler.time_system("tick", || run_tick(transforms, interval, instances, actors));
        }

        profiler.time_system("world_spellcasts", || {
            transforms.world_spellcasts(delta_time, instances, actors)
        });
    }

    pub fn find_spell(&self, name: &str) -> Option<Entity> {
        spell::find_spell(&self.prototypes, name)
    }

    /// Look up an actor by its `Name` aspect (e.g. "Hero").
    pub fn find_actor_by_name(&self, name: &str) -> Option<Entity> {
        spell::find_by_name(&self.actors, name)
    }

    pub fn prototypes(&self) -> &Store {
        &self.prototypes
    }

    pub fn instances(&self) -> &Store {
        &self.instances
    }

    /// Mutable instance access, e.g. to cancel a spellcast between frames.
    pub fn instances_mut(&mut self) -> &mut Store {
        &mut self.instances
    }

    pub fn actors(&self) -> &Store {
        &self.actors
    }

    pub fn actors_mut(&mut self) -> &mut Store {
        &mut self.actors
    }

    pub fn transforms(&self) -> &X {
        &self.transforms
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn stats(&self) -> CastStats {
        self.stats
    }

    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    pub fn profiler(&self) -> &SystemProfiler {
        &self.profiler
    }
}

fn run_immediate<X: Transforms>(
    transforms: &mut X,
    dt: f32,
    instances: &mut Store,
    actors: &mut Store,
) {
    transforms.update_timers(dt, instances);

    transforms.apply_damage(instances, actors);
    transforms.apply_heal(instances, actors);
    transforms.health_check(instances, actors);

    transforms.apply_qi_utilisation(instances, actors);
    transforms.apply_qi_replenishment(instances, actors);
}

fn run_tick<X: Transforms>(
    transforms: &mut X,
    interval: f32,
    instances: &mut Store,
    actors: &mut Store,
) {
    transforms.apply_damage_over_time(interval, instances, actors);
    transforms.apply_heal_over_time(interval, instances, actors);
    transforms.health_check(instances, actors);

    transforms.apply_qi_utilisation_over_time(interval, instances, actors);
    transforms.apply_qi_replenishment_over_time(interval, instances, actors);

    transforms.update_actors(interval, actors);
}
