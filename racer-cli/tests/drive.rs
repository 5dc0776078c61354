use std::path::{Path, PathBuf};

use racer_cli::{drive_session, load_replay, load_track, summarize_track, track_id_for};
use racer_core::{
    verify_replay, ArtifactStore, InputSnapshot, Ledger, Phase, RaceSession, ReplaySlot,
    SessionOptions, TrackDraft,
};
use racer_store::{DiskRecords, StoreConfig};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new("..").join("test-fixtures").join(name)
}

fn open_store(dir: &TempDir) -> DiskRecords {
    DiskRecords::open(&StoreConfig::rooted_at(dir.path())).expect("store should open")
}

fn fixture_inputs() -> Vec<InputSnapshot> {
    load_replay(&fixture("corridor-60.replay.json"))
        .expect("fixture replay should load")
        .inputs
}

#[test]
fn summarizes_fixture_tracks() {
    let corridor = summarize_track(&load_track(&fixture("corridor.json")).unwrap());
    assert_eq!((corridor.width, corridor.height), (10, 3));
    assert_eq!(corridor.start, (1, 1));
    assert_eq!(corridor.finish, (8, 1));
    assert_eq!(corridor.checkpoints, 0);

    let mud_loop = summarize_track(&load_track(&fixture("mud-loop.json")).unwrap());
    assert_eq!(mud_loop.checkpoints, 2);
    assert_eq!(mud_loop.mud_tiles, 3);
}

#[test]
fn missing_files_carry_their_path() {
    let err = load_track(&fixture("no-such-track.json")).unwrap_err();
    assert!(format!("{err:#}").contains("no-such-track.json"));
}

#[test]
fn driving_a_recorded_run_sets_the_best_time() {
    let dir = TempDir::new().unwrap();
    let track_path = fixture("corridor.json");
    let track_id = track_id_for(&track_path).unwrap();
    let track = load_track(&track_path).unwrap();

    let mut session = RaceSession::race(
        open_store(&dir),
        track.clone(),
        track_id.clone(),
        SessionOptions::default(),
    );
    let summary = drive_session(&mut session, &fixture_inputs());

    let outcome = summary.outcome.expect("fixture run should finish");
    assert_eq!(summary.frames, 61);
    assert_eq!(summary.ticks, 60);
    assert_eq!(summary.unused_inputs, 0);
    assert_eq!(outcome.elapsed_ms, 999);
    assert!(outcome.new_best);
    assert!(outcome.persisted);
    assert_eq!(session.phase(), Phase::Finished);

    let store = session.abandon();
    assert_eq!(store.best_time(&track_id).unwrap(), Some(999));
    let saved = store
        .load_replay(&track_id, ReplaySlot::Last)
        .unwrap()
        .expect("last replay should be saved");
    let options = SessionOptions::default();
    let run = verify_replay(&track, &options.physics, options.car, &saved, 36_000).unwrap();
    assert_eq!(run.ticks, 60);
}

#[test]
fn slower_run_races_the_stored_ghost() {
    let dir = TempDir::new().unwrap();
    let track = load_track(&fixture("corridor.json")).unwrap();

    let mut first = RaceSession::race(
        open_store(&dir),
        track.clone(),
        "corridor",
        SessionOptions::default(),
    );
    drive_session(&mut first, &fixture_inputs());
    let store = first.abandon();

    let mut slow = vec![InputSnapshot::IDLE; 10];
    slow.extend(fixture_inputs());
    let mut second = RaceSession::race(store, track, "corridor", SessionOptions::default());
    let summary = drive_session(&mut second, &slow);

    let outcome = summary.outcome.expect("slow run should finish");
    assert_eq!(outcome.ticks, 70);
    assert_eq!(outcome.elapsed_ms, 1_166);
    assert!(!outcome.new_best);
    assert_eq!(summary.records.best_time_ms, Some(999));
    assert!(second.ghost().is_exhausted());

    let store = second.abandon();
    let last = store
        .load_replay("corridor", ReplaySlot::Last)
        .unwrap()
        .unwrap();
    assert_eq!(last.len(), 70);
}

#[test]
fn unfinished_drive_persists_nothing() {
    let dir = TempDir::new().unwrap();
    let track = load_track(&fixture("corridor.json")).unwrap();
    let mut session = RaceSession::race(
        open_store(&dir),
        track,
        "corridor",
        SessionOptions::default(),
    );

    let summary = drive_session(&mut session, &fixture_inputs()[..30]);
    assert_eq!(summary.outcome, None);
    assert_eq!(summary.ticks, 30);
    assert_eq!(session.phase(), Phase::Active);

    let store = session.abandon();
    assert_eq!(store.best_time("corridor").unwrap(), None);
    assert!(!store.replay_exists("corridor", ReplaySlot::Last));
}

#[test]
fn creator_run_then_matching_race_unlocks_creator_ghost() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::rooted_at(dir.path());
    let corridor = load_track(&fixture("corridor.json")).unwrap();

    let mut editor = RaceSession::editor_test(
        open_store(&dir),
        &TrackDraft::from_track(&corridor),
        "custom",
        SessionOptions::default(),
    )
    .unwrap();
    let summary = drive_session(&mut editor, &fixture_inputs());
    assert_eq!(summary.outcome.map(|o| o.elapsed_ms), Some(999));
    let store = editor.abandon();
    assert_eq!(store.creator_time("custom").unwrap(), Some(999));
    assert!(config.maps_dir.join("custom.json").is_file());

    let track = store.artifacts().load_track("custom").unwrap();
    let mut race = RaceSession::race(store, track.clone(), "custom", SessionOptions::default());
    assert!(!race.creator_ghost_available());
    let outcome = drive_session(&mut race, &fixture_inputs())
        .outcome
        .expect("race should finish");
    assert!(outcome.new_best);
    assert!(outcome.creator_beaten);

    let store = race.abandon();
    let race = RaceSession::race(store, track, "custom", SessionOptions::default());
    assert!(race.creator_ghost_available());
    assert!(race.records().creator_time_beaten());
}
