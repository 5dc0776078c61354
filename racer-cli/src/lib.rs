use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use racer_core::{
    ArtifactStore, Car, InputSnapshot, Ledger, Phase, RaceSession, Replay, RunOutcome, TileKind,
    TilePos, TraceSample, Track, TrackRecords,
};
use serde::Serialize;

pub fn load_track(path: &Path) -> Result<Track> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read track: {}", path.display()))?;
    Track::from_json(&text).with_context(|| format!("invalid track: {}", path.display()))
}

pub fn load_replay(path: &Path) -> Result<Replay> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read replay: {}", path.display()))?;
    Replay::from_json(&text).with_context(|| format!("invalid replay: {}", path.display()))
}

/// Track id used for records when a track is given by path: its file stem.
pub fn track_id_for(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("cannot derive a track id from {}", path.display()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub width: usize,
    pub height: usize,
    pub start: (i32, i32),
    pub finish: (i32, i32),
    pub start_angle: f64,
    pub checkpoints: usize,
    pub mud_tiles: usize,
    pub wall_tiles: usize,
}

pub fn summarize_track(track: &Track) -> TrackSummary {
    let mut mud_tiles = 0;
    let mut wall_tiles = 0;
    for y in 0..track.height() as i32 {
        for x in 0..track.width() as i32 {
            match track.kind_at_tile(TilePos::new(x, y)) {
                TileKind::Mud => mud_tiles += 1,
                TileKind::Wall => wall_tiles += 1,
                _ => {}
            }
        }
    }

    let start = track.start();
    let finish = track.finish();
    TrackSummary {
        width: track.width(),
        height: track.height(),
        start: (start.x, start.y),
        finish: (finish.x, finish.y),
        start_angle: track.start_angle(),
        checkpoints: track.checkpoints().len(),
        mud_tiles,
        wall_tiles,
    }
}

/// One trace sample as written by `racer trace`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceRow {
    pub tick: u32,
    /// Packed input byte: accelerate, brake, left, right in the low bits.
    pub input: u8,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub speed: f64,
    pub mud_timer: f64,
    pub collided: bool,
}

impl From<&TraceSample> for TraceRow {
    fn from(sample: &TraceSample) -> Self {
        Self {
            tick: sample.tick,
            input: racer_core::input::encode_input_byte(sample.input),
            x: sample.x,
            y: sample.y,
            angle: sample.angle,
            speed: sample.speed,
            mud_timer: sample.mud_timer,
            collided: sample.collided,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveSummary {
    /// Frames fed to the session, the countdown frame included.
    pub frames: u32,
    pub ticks: u32,
    pub collisions: u32,
    /// Inputs left over after the run finished.
    pub unused_inputs: usize,
    pub outcome: Option<RunOutcome>,
    pub car: Car,
    pub records: TrackRecords,
}

/// Plays `inputs` through `session` one fixed step per frame, the way a
/// recorded run was captured: the countdown is skipped in a single frame so
/// the first input lands on the first run tick. Stops at the finish.
pub fn drive_session<S>(session: &mut RaceSession<S>, inputs: &[InputSnapshot]) -> DriveSummary
where
    S: Ledger + ArtifactStore,
{
    let step = session.options().physics.fixed_timestep;
    let mut summary = DriveSummary {
        frames: 0,
        ticks: 0,
        collisions: 0,
        unused_inputs: 0,
        outcome: None,
        car: *session.car(),
        records: session.records(),
    };

    if let Phase::Countdown { remaining } = session.phase() {
        session.frame(remaining, InputSnapshot::IDLE);
        summary.frames += 1;
    }

    let mut consumed = 0;
    for input in inputs {
        let report = session.frame(step, *input);
        consumed += 1;
        summary.frames += 1;
        summary.ticks += report.ticks;
        summary.collisions += report.collisions;
        if report.outcome.is_some() {
            summary.outcome = report.outcome;
            break;
        }
    }

    summary.unused_inputs = inputs.len() - consumed;
    summary.car = *session.car();
    summary.records = session.records();
    summary
}

pub fn format_ms(ms: Option<u64>) -> String {
    match ms {
        Some(ms) => format!("{}.{:03}s", ms / 1000, ms % 1000),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_id_is_the_file_stem() {
        assert_eq!(
            track_id_for(Path::new("assets/maps/track_01.json")).unwrap(),
            "track_01"
        );
        assert!(track_id_for(Path::new("/")).is_err());
    }

    #[test]
    fn times_print_as_seconds() {
        assert_eq!(format_ms(Some(61_234)), "61.234s");
        assert_eq!(format_ms(Some(5)), "0.005s");
        assert_eq!(format_ms(None), "-");
    }
}
