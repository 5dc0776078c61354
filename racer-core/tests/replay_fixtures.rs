use std::fs;

use racer_core::{
    verify_replay, ArtifactStore, CarSpec, InputSnapshot, MemoryRecords, PhysicsConfig,
    RaceSession, Replay, ReplaySlot, SessionOptions, Track, VerifyError,
};

const MAX_TICKS: u32 = 36_000;

fn load(path: &str) -> String {
    let full = format!("../{path}");
    fs::read_to_string(&full).unwrap_or_else(|err| panic!("failed reading {full}: {err}"))
}

fn corridor() -> Track {
    Track::from_json(&load("test-fixtures/corridor.json")).expect("corridor fixture should load")
}

fn replay(path: &str) -> Replay {
    Replay::from_json(&load(path)).expect("replay fixture should parse")
}

#[test]
fn verifies_corridor_fixture() {
    let run = verify_replay(
        &corridor(),
        &PhysicsConfig::default(),
        CarSpec::default(),
        &replay("test-fixtures/corridor-60.replay.json"),
        MAX_TICKS,
    )
    .expect("corridor fixture must verify");

    assert_eq!(run.ticks, 60);
    assert_eq!(run.elapsed_ms, 999);
    assert_eq!(run.collisions, 0);
    assert_eq!(run.car.x, 261.5);
    assert_eq!(run.car.y, 48.0);
}

#[test]
fn legacy_fixture_loads_but_never_verifies() {
    let legacy = replay("test-fixtures/corridor-legacy.replay.json");
    assert_eq!(legacy.len(), 60);
    assert!(legacy.meta.is_empty());
    assert_eq!(
        verify_replay(
            &corridor(),
            &PhysicsConfig::default(),
            CarSpec::default(),
            &legacy,
            MAX_TICKS
        ),
        Err(VerifyError::MissingMeta)
    );
}

#[test]
fn rotated_fixture_is_rejected_on_start_angle() {
    assert_eq!(
        verify_replay(
            &corridor(),
            &PhysicsConfig::default(),
            CarSpec::default(),
            &replay("test-fixtures/corridor-rotated.replay.json"),
            MAX_TICKS
        ),
        Err(VerifyError::MetaMismatch {
            field: "start_angle"
        })
    );
}

#[test]
fn rotated_fixture_never_arms_a_ghost() {
    let mut store = MemoryRecords::new();
    store
        .save_replay(
            "corridor",
            ReplaySlot::Last,
            &replay("test-fixtures/corridor-rotated.replay.json"),
        )
        .unwrap();

    let options = SessionOptions {
        countdown_secs: 0.0,
        ..SessionOptions::default()
    };
    let mut session = RaceSession::race(store, corridor(), "corridor", options);
    for _ in 0..30 {
        session.frame(options.physics.fixed_timestep, InputSnapshot::ACCELERATE);
        assert!(session.ghost().car().is_none());
    }
}

#[test]
fn fixture_replay_drives_a_ghost_alongside_the_player() {
    let mut store = MemoryRecords::new();
    store
        .save_replay(
            "corridor",
            ReplaySlot::Last,
            &replay("test-fixtures/corridor-60.replay.json"),
        )
        .unwrap();

    let options = SessionOptions {
        countdown_secs: 0.0,
        ..SessionOptions::default()
    };
    let mut session = RaceSession::race(store, corridor(), "corridor", options);
    for _ in 0..30 {
        session.frame(options.physics.fixed_timestep, InputSnapshot::ACCELERATE);
    }
    let ghost = session.ghost().car().expect("ghost should be playing");
    assert_eq!(ghost, session.car());
}
