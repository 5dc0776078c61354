use crate::car::{Car, CarSpec};
use crate::checkpoints::CheckpointTracker;
use crate::config::PhysicsConfig;
use crate::error::VerifyError;
use crate::input::{encode_input_byte, InputSnapshot};
use crate::replay::Replay;
use crate::sim::{step_car, ticks_to_ms};
use crate::track::{tile_of, Track};

/// Headless rerun of an input buffer from the start tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReplayResult {
    /// Ticks simulated; stops early at the finish.
    pub ticks: u32,
    pub finish_tick: Option<u32>,
    pub car: Car,
    pub collisions: u32,
    pub checkpoints_visited: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerifiedRun {
    pub ticks: u32,
    pub elapsed_ms: u64,
    pub car: Car,
    pub collisions: u32,
}

/// Per-tick car state sampled by [`trace_replay`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceSample {
    pub tick: u32,
    pub input: InputSnapshot,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub speed: f64,
    pub mud_timer: f64,
    pub collided: bool,
}

impl TraceSample {
    fn new(tick: u32, input: InputSnapshot, car: &Car, collided: bool) -> Self {
        Self {
            tick,
            input,
            x: car.x,
            y: car.y,
            angle: car.angle,
            speed: car.speed,
            mud_timer: car.mud_timer,
            collided,
        }
    }
}

/// Drives a fresh car with `inputs` the way a timed run would: every tick
/// records checkpoints and the car stops at the first completed finish.
pub fn replay_inputs(
    track: &Track,
    config: &PhysicsConfig,
    spec: CarSpec,
    inputs: &[InputSnapshot],
) -> ReplayResult {
    let mut car = Car::spawn(track, spec, config.tile_size);
    let mut checkpoints = CheckpointTracker::new(track.checkpoints().len());
    let mut collisions = 0;
    let mut ticks = 0;
    let mut finish_tick = None;

    for input in inputs {
        if step_car(&mut car, *input, track, config).collided {
            collisions += 1;
        }
        ticks += 1;
        checkpoints.on_tick(tile_of(car.x, car.y, config.tile_size), track.checkpoints());
        if track.is_finish_at(car.x, car.y, config.tile_size) && checkpoints.is_complete() {
            car.speed = 0.0;
            finish_tick = Some(ticks);
            break;
        }
    }

    ReplayResult {
        ticks,
        finish_tick,
        car,
        collisions,
        checkpoints_visited: checkpoints.visited_count(),
    }
}

/// Checks that `replay` is a complete run of `track`: compatible constants,
/// a bounded length, and a finish on exactly the last recorded tick.
pub fn verify_replay(
    track: &Track,
    config: &PhysicsConfig,
    spec: CarSpec,
    replay: &Replay,
    max_ticks: u32,
) -> Result<VerifiedRun, VerifyError> {
    verify_replay_with(replay, max_ticks, config, track.start_angle(), |inputs| {
        replay_inputs(track, config, spec, inputs)
    })
}

fn verify_replay_with<F>(
    replay: &Replay,
    max_ticks: u32,
    config: &PhysicsConfig,
    start_angle: f64,
    replay_fn: F,
) -> Result<VerifiedRun, VerifyError>
where
    F: FnOnce(&[InputSnapshot]) -> ReplayResult,
{
    if replay.is_empty() {
        return Err(VerifyError::EmptyReplay);
    }
    if replay.len() > max_ticks as usize {
        return Err(VerifyError::TooManyTicks {
            ticks: replay.len(),
            max_ticks,
        });
    }
    replay.compatibility(config, start_angle)?;

    let result = replay_fn(&replay.inputs);
    let recorded = replay.len() as u32;
    match result.finish_tick {
        None => Err(VerifyError::NeverFinished {
            ticks: result.ticks,
        }),
        Some(finish_tick) if finish_tick != recorded => Err(VerifyError::FinishedEarly {
            finish_tick,
            ticks: recorded,
        }),
        Some(finish_tick) => Ok(VerifiedRun {
            ticks: finish_tick,
            elapsed_ms: ticks_to_ms(finish_tick, config.fixed_timestep),
            car: result.car,
            collisions: result.collisions,
        }),
    }
}

/// Samples the car every `sample_every` ticks plus the spawn and the final
/// tick. Unlike [`replay_inputs`] it does not stop at the finish.
pub fn trace_replay(
    track: &Track,
    config: &PhysicsConfig,
    spec: CarSpec,
    inputs: &[InputSnapshot],
    sample_every: u32,
) -> Vec<TraceSample> {
    let mut car = Car::spawn(track, spec, config.tile_size);
    let stride = if sample_every == 0 { 1 } else { sample_every };
    let total_ticks = inputs.len() as u32;
    let mut samples = vec![TraceSample::new(0, InputSnapshot::IDLE, &car, false)];

    for (index, input) in inputs.iter().enumerate() {
        let step = step_car(&mut car, *input, track, config);
        let tick = (index + 1) as u32;
        if tick.is_multiple_of(stride) || tick == total_ticks {
            samples.push(TraceSample::new(tick, *input, &car, step.collided));
        }
    }

    samples
}

fn mix_u64(hash: u64, value: u64) -> u64 {
    // FNV-1a style mix over exact bit patterns.
    hash.wrapping_mul(0x0000_0100_0000_01B3) ^ value
}

/// Order-sensitive hash of a trace for cross-build determinism checks.
pub fn trace_fingerprint(samples: &[TraceSample]) -> u64 {
    let mut hash = 0xCBF2_9CE4_8422_2325u64;

    for sample in samples {
        hash = mix_u64(hash, u64::from(sample.tick));
        hash = mix_u64(hash, u64::from(encode_input_byte(sample.input)));
        hash = mix_u64(hash, sample.x.to_bits());
        hash = mix_u64(hash, sample.y.to_bits());
        hash = mix_u64(hash, sample.angle.to_bits());
        hash = mix_u64(hash, sample.speed.to_bits());
        hash = mix_u64(hash, sample.mud_timer.to_bits());
        hash = mix_u64(hash, u64::from(sample.collided));
    }

    hash
}
