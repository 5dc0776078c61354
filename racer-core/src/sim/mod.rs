use crate::car::Car;
use crate::collision::resolve_collision;
use crate::config::PhysicsConfig;
use crate::input::InputSnapshot;
use crate::physics::advance;
use crate::surface::surface_multipliers;
use crate::track::Track;

pub mod ghost;
pub mod session;

pub use ghost::{GhostKind, GhostLane, GhostState};

/// What happened to one car during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub collided: bool,
}

/// One fixed tick for any car: surface multipliers, integration, then wall
/// resolution. Live, ghost and verifier cars all go through here so a
/// replayed input buffer reproduces the recorded trajectory exactly.
#[inline]
pub fn step_car(
    car: &mut Car,
    input: InputSnapshot,
    track: &Track,
    config: &PhysicsConfig,
) -> StepReport {
    let dt = config.fixed_timestep;
    let tile = track.kind_at(car.x, car.y, config.tile_size);
    let multipliers = surface_multipliers(car, dt, tile, config);

    let (prev_x, prev_y) = (car.x, car.y);
    advance(
        car,
        input,
        dt,
        multipliers.accel,
        multipliers.max_speed,
        multipliers.turn,
    );
    let collided = resolve_collision(car, prev_x, prev_y, track, config);

    StepReport { collided }
}

/// Run timer. Adds one step of milliseconds per tick and reports the
/// truncated sum, so 60 ticks at 1/60 s read 999 ms.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunClock {
    total_ms: f64,
}

impl RunClock {
    #[inline]
    pub fn tick(&mut self, fixed_timestep: f64) {
        self.total_ms += fixed_timestep * 1000.0;
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.total_ms as u64
    }

    pub fn reset(&mut self) {
        self.total_ms = 0.0;
    }
}

/// Run time in whole milliseconds for `ticks` fixed steps, summed tick by
/// tick exactly as [`RunClock`] does.
pub fn ticks_to_ms(ticks: u32, fixed_timestep: f64) -> u64 {
    let mut clock = RunClock::default();
    for _ in 0..ticks {
        clock.tick(fixed_timestep);
    }
    clock.elapsed_ms()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::CarSpec;
    use crate::collision::collides_at;
    use crate::track::TileKind;

    fn mud_strip() -> Track {
        Track::from_json(
            r#"{
                "width": 12, "height": 3,
                "tiles": ["111111111111", "130022200041", "111111111111"],
                "legend": {"0": "road", "1": "wall", "2": "mud", "3": "start", "4": "finish"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn elapsed_time_truncates_the_tick_sum() {
        assert_eq!(ticks_to_ms(0, 1.0 / 60.0), 0);
        assert_eq!(ticks_to_ms(1, 1.0 / 60.0), 16);
        assert_eq!(ticks_to_ms(30, 1.0 / 60.0), 500);
        // The float sum lands just under 1000.
        assert_eq!(ticks_to_ms(60, 1.0 / 60.0), 999);
        assert_eq!(ticks_to_ms(90, 1.0 / 60.0), 1_500);
    }

    #[test]
    fn clock_matches_ticks_to_ms() {
        let mut clock = RunClock::default();
        for tick in 1..=600u32 {
            clock.tick(1.0 / 60.0);
            assert_eq!(clock.elapsed_ms(), ticks_to_ms(tick, 1.0 / 60.0));
        }
        clock.reset();
        assert_eq!(clock.elapsed_ms(), 0);
    }

    #[test]
    fn mud_caps_speed_while_the_timer_runs() {
        let track = mud_strip();
        let config = PhysicsConfig::default();
        let mut car = Car::spawn(&track, CarSpec::default(), config.tile_size);

        let mut entered_mud = false;
        for _ in 0..200 {
            step_car(&mut car, InputSnapshot::ACCELERATE, &track, &config);
            if track.kind_at(car.x, car.y, config.tile_size) == TileKind::Mud {
                entered_mud = true;
            }
            if car.mud_timer > 0.0 {
                assert!(car.speed <= car.max_speed * config.mud_speed_multiplier);
            }
        }
        assert!(entered_mud);
    }

    #[test]
    fn stepping_never_leaves_the_car_inside_a_wall() {
        let track = mud_strip();
        let config = PhysicsConfig::default();
        let mut car = Car::spawn(&track, CarSpec::default(), config.tile_size);
        for tick in 0..400u32 {
            let input = InputSnapshot {
                accelerate: true,
                turn_left: tick % 50 < 10,
                turn_right: tick % 70 < 5,
                ..InputSnapshot::IDLE
            };
            step_car(&mut car, input, &track, &config);
            assert!(!collides_at(&track, car.x, car.y, &config), "tick {tick}");
        }
    }
}
