use tracing::{debug, info, warn};

use crate::car::Car;
use crate::checkpoints::CheckpointTracker;
use crate::config::SessionOptions;
use crate::constants::MAX_FRAME_ACCUMULATOR_SECS;
use crate::error::{DraftError, StoreError};
use crate::input::InputSnapshot;
use crate::records::{ArtifactStore, Ledger, ReplaySlot};
use crate::replay::{Replay, ReplayMeta, ReplayRecorder};
use crate::sim::ghost::{GhostKind, GhostLane};
use crate::sim::{step_car, RunClock};
use crate::track::{tile_of, Track, TrackDraft};


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionMode {
    /// Timed race against stored records and ghosts.
    Race,
    /// Author test drive of a draft; a finish saves the track and creator run.
    EditorTest,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// World frozen while the countdown runs.
    Countdown { remaining: f64 },
    /// Car drives but nothing is timed or recorded.
    Idle,
    Active,
    /// Car frozen at the finish; ghosts keep playing.
    Finished,
}

/// Best-time ledger values for the session's track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackRecords {
    pub best_time_ms: Option<u64>,
    pub creator_time_ms: Option<u64>,
    pub creator_beaten: bool,
}

impl TrackRecords {
    /// Flag set, or a best time at or under the creator time.
    pub fn creator_time_beaten(&self) -> bool {
        if self.creator_beaten {
            return true;
        }
        match (self.best_time_ms, self.creator_time_ms) {
            (Some(best), Some(creator)) => best <= creator,
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    pub mode: SessionMode,
    pub ticks: u32,
    pub elapsed_ms: u64,
    pub new_best: bool,
    /// The creator time was beaten for the first time by this run.
    pub creator_beaten: bool,
    /// False when any write to the store failed.
    pub persisted: bool,
}

/// What one call to [`RaceSession::frame`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub ticks: u32,
    pub collisions: u32,
    pub run_started: bool,
    pub outcome: Option<RunOutcome>,
}

/// One visit to a track: the live car, its run state, both ghost lanes and
/// the store the results go to.
pub struct RaceSession<S> {
    store: S,
    track: Track,
    track_id: String,
    mode: SessionMode,
    options: SessionOptions,
    phase: Phase,
    car: Car,
    accumulator: f64,
    run_ticks: u32,
    clock: RunClock,
    checkpoints: CheckpointTracker,
    recorder: ReplayRecorder,
    ghost: GhostLane,
    creator_ghost: GhostLane,
    records: TrackRecords,
    pending_save: bool,
    last_outcome: Option<RunOutcome>,
}

impl<S> RaceSession<S>
where
    S: Ledger + ArtifactStore,
{
    pub fn race(
        store: S,
        track: Track,
        track_id: impl Into<String>,
        options: SessionOptions,
    ) -> Self {
        Self::enter(store, track, track_id.into(), SessionMode::Race, options)
    }

    /// Test drive of an editor draft. Both ghost lanes stay off.
    pub fn editor_test(
        store: S,
        draft: &TrackDraft,
        track_id: impl Into<String>,
        options: SessionOptions,
    ) -> Result<Self, DraftError> {
        let track = draft.build()?;
        let options = SessionOptions {
            ghost_enabled: false,
            creator_ghost_enabled: false,
            ..options
        };
        Ok(Self::enter(
            store,
            track,
            track_id.into(),
            SessionMode::EditorTest,
            options,
        ))
    }

    fn enter(
        store: S,
        track: Track,
        track_id: String,
        mode: SessionMode,
        options: SessionOptions,
    ) -> Self {
        let car = Car::spawn(&track, options.car, options.physics.tile_size);
        let checkpoints = CheckpointTracker::new(track.checkpoints().len());
        let mut session = Self {
            store,
            car,
            checkpoints,
            track_id,
            mode,
            phase: Phase::Idle,
            accumulator: 0.0,
            run_ticks: 0,
            clock: RunClock::default(),
            recorder: ReplayRecorder::new(),
            ghost: GhostLane::new(GhostKind::Player, options.ghost_enabled),
            creator_ghost: GhostLane::new(GhostKind::Creator, options.creator_ghost_enabled),
            records: TrackRecords::default(),
            pending_save: mode == SessionMode::EditorTest,
            last_outcome: None,
            track,
            options,
        };
        session.load_records();
        session.reset_run();
        session
    }

    fn load_records(&mut self) {
        let id = self.track_id.as_str();
        let best_time_ms = self.store.best_time(id).unwrap_or_else(|err| {
            warn!(track = id, error = %err, "failed to load best time");
            None
        });
        let creator_time_ms = self.store.creator_time(id).unwrap_or_else(|err| {
            warn!(track = id, error = %err, "failed to load creator time");
            None
        });
        let creator_beaten = self.store.creator_beaten(id).unwrap_or_else(|err| {
            warn!(track = id, error = %err, "failed to load creator flag");
            false
        });
        self.records = TrackRecords {
            best_time_ms,
            creator_time_ms,
            creator_beaten,
        };

        if !creator_beaten && self.records.creator_time_beaten() {
            self.records.creator_beaten = true;
            if let Err(err) = self.store.set_creator_beaten(id) {
                warn!(track = id, error = %err, "failed to persist creator flag");
            }
        }
    }

    fn reset_run(&mut self) {
        self.car = Car::spawn(&self.track, self.options.car, self.options.physics.tile_size);
        self.accumulator = 0.0;
        self.run_ticks = 0;
        self.clock.reset();
        self.recorder.clear();
        self.checkpoints.reset();
        self.ghost.reset();
        self.creator_ghost.reset();
        self.phase = if self.options.countdown_secs > 0.0 {
            Phase::Countdown {
                remaining: self.options.countdown_secs,
            }
        } else {
            Phase::Idle
        };
    }

    /// Advances wall-clock time by `dt` seconds with `input` held.
    pub fn frame(&mut self, dt: f64, input: InputSnapshot) -> FrameReport {
        let mut report = FrameReport::default();

        if let Phase::Countdown { remaining } = self.phase {
            let remaining = (remaining - dt).max(0.0);
            if remaining > 0.0 {
                self.phase = Phase::Countdown { remaining };
            } else {
                self.start_run();
                report.run_started = true;
            }
            return report;
        }

        self.accumulator = (self.accumulator + dt).min(MAX_FRAME_ACCUMULATOR_SECS);
        if self.phase == Phase::Idle && input.any() {
            self.start_run();
            report.run_started = true;
        }

        let step = self.options.physics.fixed_timestep;
        while self.accumulator >= step {
            self.tick(input, &mut report);
            self.accumulator -= step;
        }
        report
    }

    fn start_run(&mut self) {
        self.phase = Phase::Active;
        self.run_ticks = 0;
        self.clock.reset();
        self.recorder.clear();
        self.checkpoints.reset();
        self.arm_ghosts();
        info!(track = %self.track_id, mode = ?self.mode, "run started");
    }

    fn arm_ghosts(&mut self) {
        let physics = self.options.physics;
        let spec = self.options.car;

        let last = self.load_replay(ReplaySlot::Last, self.ghost.is_enabled());
        self.ghost.arm(last.as_ref(), &self.track, &physics, spec);

        let creator_allowed =
            self.creator_ghost.is_enabled() && self.creator_ghost_available();
        let creator = self.load_replay(ReplaySlot::Creator, creator_allowed);
        self.creator_ghost
            .arm(creator.as_ref(), &self.track, &physics, spec);
    }

    fn load_replay(&self, slot: ReplaySlot, wanted: bool) -> Option<Replay> {
        if !wanted {
            return None;
        }
        match self.store.load_replay(&self.track_id, slot) {
            Ok(replay) => replay,
            Err(err) => {
                debug!(
                    track = %self.track_id,
                    slot = slot.as_str(),
                    error = %err,
                    "replay unreadable"
                );
                None
            }
        }
    }

    fn tick(&mut self, input: InputSnapshot, report: &mut FrameReport) {
        let physics = self.options.physics;

        if self.phase != Phase::Finished {
            let step = step_car(&mut self.car, input, &self.track, &physics);
            if step.collided {
                report.collisions += 1;
            }
        }

        if self.phase == Phase::Active {
            self.recorder.record(input);
            self.run_ticks += 1;
            self.clock.tick(physics.fixed_timestep);
            self.checkpoints.on_tick(
                tile_of(self.car.x, self.car.y, physics.tile_size),
                self.track.checkpoints(),
            );
            if self
                .track
                .is_finish_at(self.car.x, self.car.y, physics.tile_size)
                && self.checkpoints.is_complete()
            {
                let outcome = self.finish_run();
                report.outcome = Some(outcome);
            }
        }

        self.ghost.tick(&self.track, &physics);
        self.creator_ghost.tick(&self.track, &physics);
        report.ticks += 1;
    }

    fn finish_run(&mut self) -> RunOutcome {
        self.phase = Phase::Finished;
        self.car.speed = 0.0;

        let elapsed_ms = self.clock.elapsed_ms();
        let replay = self
            .recorder
            .to_replay(ReplayMeta::current(&self.options.physics, self.track.start_angle()));

        let mut outcome = RunOutcome {
            mode: self.mode,
            ticks: self.run_ticks,
            elapsed_ms,
            new_best: false,
            creator_beaten: false,
            persisted: true,
        };

        match self.mode {
            SessionMode::Race => self.record_race(elapsed_ms, &replay, &mut outcome),
            SessionMode::EditorTest => self.record_creator_run(elapsed_ms, &replay, &mut outcome),
        }

        info!(
            track = %self.track_id,
            mode = ?self.mode,
            ticks = outcome.ticks,
            elapsed_ms,
            new_best = outcome.new_best,
            "run finished"
        );
        self.last_outcome = Some(outcome);
        outcome
    }

    fn record_race(&mut self, elapsed_ms: u64, replay: &Replay, outcome: &mut RunOutcome) {
        let id = self.track_id.clone();

        if self.records.best_time_ms.map_or(true, |best| elapsed_ms < best) {
            self.records.best_time_ms = Some(elapsed_ms);
            outcome.new_best = true;
            info!(track = %id, elapsed_ms, "new best time");
            let result = self.store.set_best_time(&id, elapsed_ms);
            note_write(&mut outcome.persisted, &id, "best time", result);
        }

        if !self.records.creator_beaten
            && self
                .records
                .creator_time_ms
                .is_some_and(|creator| elapsed_ms <= creator)
        {
            self.records.creator_beaten = true;
            outcome.creator_beaten = true;
            info!(track = %id, elapsed_ms, "creator time beaten");
            let result = self.store.set_creator_beaten(&id);
            note_write(&mut outcome.persisted, &id, "creator flag", result);
        }

        let result = self.store.save_replay(&id, ReplaySlot::Last, replay);
        note_write(&mut outcome.persisted, &id, "last replay", result);
    }

    fn record_creator_run(&mut self, elapsed_ms: u64, replay: &Replay, outcome: &mut RunOutcome) {
        if !self.pending_save {
            return;
        }
        self.pending_save = false;
        let id = self.track_id.clone();

        let result = self.store.save_track(&id, &self.track.to_file());
        note_write(&mut outcome.persisted, &id, "track", result);

        // Records set on the previous layout no longer apply.
        self.records.best_time_ms = None;
        let result = self.store.clear_best_time(&id);
        note_write(&mut outcome.persisted, &id, "best time", result);
        let result = self.store.remove_replay(&id, ReplaySlot::Last);
        note_write(&mut outcome.persisted, &id, "last replay", result);
        let result = self.store.remove_replay(&id, ReplaySlot::Creator);
        note_write(&mut outcome.persisted, &id, "creator replay", result);

        self.records.creator_time_ms = Some(elapsed_ms);
        let result = self.store.set_creator_time(&id, elapsed_ms);
        note_write(&mut outcome.persisted, &id, "creator time", result);

        self.records.creator_beaten = false;
        let result = self.store.clear_creator_beaten(&id);
        note_write(&mut outcome.persisted, &id, "creator flag", result);

        let result = self.store.save_replay(&id, ReplaySlot::Creator, replay);
        note_write(&mut outcome.persisted, &id, "creator replay", result);

        info!(track = %id, elapsed_ms, "creator run saved");
    }

    /// Back to the countdown with a fresh car. Records are untouched.
    pub fn restart(&mut self) {
        debug!(track = %self.track_id, "restart");
        self.reset_run();
    }

    /// Leaves the track without persisting anything from the current run.
    pub fn abandon(self) -> S {
        debug!(track = %self.track_id, ticks = self.run_ticks, "session abandoned");
        self.store
    }

    /// Forgets the best time, the creator flag and the last replay, and drops
    /// the player ghost. Returns false when any store write failed.
    pub fn reset_best_time(&mut self) -> bool {
        let id = self.track_id.clone();
        let mut persisted = true;

        self.records.best_time_ms = None;
        self.records.creator_beaten = false;
        self.ghost.reset();

        let result = self.store.clear_best_time(&id);
        note_write(&mut persisted, &id, "best time", result);
        let result = self.store.clear_creator_beaten(&id);
        note_write(&mut persisted, &id, "creator flag", result);
        let result = self.store.remove_replay(&id, ReplaySlot::Last);
        note_write(&mut persisted, &id, "last replay", result);

        info!(track = %id, "best time reset");
        persisted
    }

    /// Flips the player ghost lane and returns its new state. Editor tests
    /// never show ghosts.
    pub fn toggle_ghost(&mut self) -> bool {
        if self.mode == SessionMode::EditorTest {
            return false;
        }
        let enabled = !self.ghost.is_enabled();
        self.ghost.set_enabled(enabled);
        enabled
    }

    /// Flips the creator ghost lane while the creator ghost is on offer.
    pub fn toggle_creator_ghost(&mut self) -> bool {
        if self.mode == SessionMode::EditorTest || !self.creator_ghost_available() {
            return self.creator_ghost.is_enabled();
        }
        let enabled = !self.creator_ghost.is_enabled();
        self.creator_ghost.set_enabled(enabled);
        enabled
    }

    pub fn creator_ghost_available(&self) -> bool {
        self.records.creator_time_beaten()
            && self.store.replay_exists(&self.track_id, ReplaySlot::Creator)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_frozen(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn car(&self) -> &Car {
        &self.car
    }

    pub fn ghost(&self) -> &GhostLane {
        &self.ghost
    }

    pub fn creator_ghost(&self) -> &GhostLane {
        &self.creator_ghost
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    pub fn records(&self) -> TrackRecords {
        self.records
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn run_ticks(&self) -> u32 {
        self.run_ticks
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.clock.elapsed_ms()
    }

    pub fn recorded_inputs(&self) -> &[InputSnapshot] {
        self.recorder.inputs()
    }

    pub fn checkpoint_status(&self) -> (usize, usize) {
        self.checkpoints.status()
    }

    pub fn last_outcome(&self) -> Option<RunOutcome> {
        self.last_outcome
    }

    /// Whole seconds left on the countdown, never below 1 while it runs.
    pub fn countdown_display(&self) -> Option<u32> {
        match self.phase {
            Phase::Countdown { remaining } => Some(((remaining + 0.9999) as u32).max(1)),
            _ => None,
        }
    }
}

fn note_write(persisted: &mut bool, track_id: &str, what: &str, result: Result<(), StoreError>) {
    if let Err(err) = result {
        warn!(track = track_id, error = %err, "failed to save {what}");
        *persisted = false;
    }
}
