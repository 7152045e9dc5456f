use weave_core::sim::{Simulation, StandardTransforms};
use weave_core::spell::aspects::{ExternalId, Health};
use weave_core::spell::catalog::{self, FIREBALL, HERO, VILLAIN};
use weave_core::spell::{ActorRef, CastOutcome};
use weave_services::{load_actors, load_definitions, save_actors, save_definitions, PersistenceError};

#[test]
fn saved_world_casts_like_the_seeded_one() {
    let tmp = tempfile::TempDir::new().unwrap();
    let definitions_path = tmp.path().join("data").join("definitions.json");
    let actors_path = tmp.path().join("data").join("actors.json");

    save_definitions(&catalog::starter_definitions().unwrap(), &definitions_path).unwrap();
    save_actors(&catalog::starter_actors().unwrap(), &actors_path).unwrap();

    let mut sim = Simulation::new(
        load_definitions(&definitions_path).unwrap(),
        load_actors(&actors_path).unwrap(),
        StandardTransforms::new(),
    )
    .unwrap();

    let hero = sim.find_actor_by_name(HERO).unwrap();
    let villain = sim.find_actor_by_name(VILLAIN).unwrap();
    let outcome = sim
        .cast_by_name(
            FIREBALL,
            ActorRef::new(hero, ExternalId(1)),
            ActorRef::new(villain, ExternalId(2)),
        )
        .unwrap();

    let CastOutcome::Cast(cast) = outcome else {
        panic!("expected a cast, got {outcome:?}");
    };
    assert_eq!(cast.fragments.len(), 1);

    sim.update(1.0 / 60.0);
    assert_eq!(sim.actors().get::<Health>(villain).unwrap().current, 100.0);
}

#[test]
fn actor_snapshot_round_trips_state() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("actors.snapshot.json");

    let mut actors = catalog::starter_actors().unwrap();
    let villain = weave_core::spell::find_by_name(&actors, VILLAIN).unwrap();
    actors.get_mut::<Health>(villain).unwrap().current = 42.0;
    save_actors(&actors, &path).unwrap();

    let loaded = load_actors(&path).unwrap();
    assert_eq!(loaded.len(), actors.len());
    assert_eq!(loaded.get::<Health>(villain).unwrap().current, 42.0);
}

#[test]
fn definitions_are_not_actors() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("definitions.json");
    save_definitions(&catalog::starter_definitions().unwrap(), &path).unwrap();

    assert!(matches!(
        load_actors(&path),
        Err(PersistenceError::SchemaMismatch { .. })
    ));
}

#[test]
fn missing_snapshot_reports_its_path() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("nope.json");

    match load_definitions(&path) {
        Err(PersistenceError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an io error, got {:?}", other.map(|store| store.len())),
    }
}
