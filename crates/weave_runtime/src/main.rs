//! Weave Runtime
//!
//! Headless binary that loads the spell world and drives a scripted
//! simulation.
//!
//! Usage: `weave [settings.json]`

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use weave_core::ecs::{Store, StoreError};
use weave_core::sim::{Simulation, StandardTransforms};
use weave_core::spell::aspects::{ExternalId, Health, Name, Qi};
use weave_core::spell::{catalog, ActorRef, CastOutcome};
use weave_services::settings::ScriptedCast;
use weave_services::{actor_schema, definition_schema, save_actors, Settings, SnapshotSchema};

const DEFAULT_SETTINGS: &str = "weave.json";

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Weave v{}", weave_core::VERSION);

    let settings_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS));
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;

    let definitions = load_or_seed(
        &settings.paths.definitions,
        &definition_schema(),
        catalog::starter_definitions,
    )?;
    let actors = load_or_seed(&settings.paths.actors, &actor_schema(), catalog::starter_actors)?;

    let mut sim = Simulation::new(definitions, actors, StandardTransforms::new())
        .context("building simulation")?
        .with_tick_interval(settings.simulation.tick_interval)?;

    let frame_delta = settings.simulation.frame_delta;
    for frame in 0..settings.simulation.frames {
        for cast in settings.casts.iter().filter(|cast| cast.frame == frame) {
            issue(&mut sim, cast)?;
        }
        sim.update(frame_delta);
    }

    report(&sim);

    save_actors(sim.actors(), &settings.paths.actor_snapshot).with_context(|| {
        format!(
            "saving actor snapshot to {}",
            settings.paths.actor_snapshot.display()
        )
    })?;

    Ok(())
}

/// Load a store from `path`, or write the starter content there first.
fn load_or_seed(
    path: &Path,
    schema: &SnapshotSchema,
    seed: fn() -> Result<Store, StoreError>,
) -> Result<Store> {
    if path.exists() {
        return schema
            .load(path)
            .with_context(|| format!("loading {}", path.display()));
    }

    let store = seed()?;
    schema
        .save(&store, path)
        .with_context(|| format!("seeding {}", path.display()))?;
    info!(path = %path.display(), "seeded starter content");
    Ok(store)
}

fn actor_ref(sim: &Simulation, name: &str) -> ActorRef {
    match sim.find_actor_by_name(name) {
        Some(entity) => ActorRef::new(entity, ExternalId(entity.index() + 1)),
        None => {
            warn!(actor = name, "no actor with that name");
            ActorRef::NULL
        }
    }
}

fn issue(sim: &mut Simulation, cast: &ScriptedCast) -> Result<()> {
    let caster = actor_ref(sim, &cast.caster);
    let target = actor_ref(sim, &cast.target);

    let outcome = sim
        .cast_by_name(&cast.spell, caster, target)
        .with_context(|| format!("casting {}", cast.spell))?;
    if let CastOutcome::Cast(spellcast) = outcome {
        info!(
            frame = cast.frame,
            spell = %cast.spell,
            caster = %cast.caster,
            source = ?spellcast.source.entity,
            target = ?spellcast.target.entity,
            "spell cast"
        );
    }
    Ok(())
}

fn report(sim: &Simulation) {
    let actors = sim.actors();
    for (actor, name) in actors.each::<Name>() {
        let health = actors.try_get::<Health>(actor);
        let qi = actors.try_get::<Qi>(actor);
        info!(
            actor = %name.name,
            health = health.map(|h| h.current),
            dead = health.is_some_and(|h| h.is_dead),
            qi = qi.map(|q| q.current),
            "actor state"
        );
    }

    let stats = sim.stats();
    info!(
        cast = stats.cast,
        unknown_spell = stats.unknown_spell,
        unknown_caster = stats.unknown_caster,
        missing_fragment = stats.missing_fragment,
        live_instances = sim.instances().len(),
        evicted = sim.transforms().evicted(),
        ticks = sim.scheduler().tick_count(),
        "simulation finished"
    );

    for (pass, timing) in sim.profiler().iter() {
        info!(
            pass,
            calls = timing.calls,
            avg_us = timing.average().as_micros() as u64,
            "pass timing"
        );
    }
    for (event, count) in sim.counter().iter() {
        info!(event, count, "counter");
    }
}
