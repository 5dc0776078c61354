use crate::constants::{CAR_ACCELERATION, CAR_MAX_SPEED, CAR_TURN_RATE};
use crate::track::Track;

/// Per-car handling constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarSpec {
    pub max_speed: f64,
    pub acceleration: f64,
    pub turn_rate: f64,
}

impl Default for CarSpec {
    fn default() -> Self {
        Self {
            max_speed: CAR_MAX_SPEED,
            acceleration: CAR_ACCELERATION,
            turn_rate: CAR_TURN_RATE,
        }
    }
}

/// Kinematic state of one car. `angle` is in radians with 0 along +x and is
/// never wrapped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Car {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub speed: f64,
    pub max_speed: f64,
    pub acceleration: f64,
    pub turn_rate: f64,
    pub mud_timer: f64,
}

impl Default for Car {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, CarSpec::default())
    }
}

impl Car {
    pub fn new(x: f64, y: f64, angle: f64, spec: CarSpec) -> Self {
        Self {
            x,
            y,
            angle,
            speed: 0.0,
            max_speed: spec.max_speed,
            acceleration: spec.acceleration,
            turn_rate: spec.turn_rate,
            mud_timer: 0.0,
        }
    }

    /// Places a stationary car at the centre of the track's start tile.
    pub fn spawn(track: &Track, spec: CarSpec, tile_size: f64) -> Self {
        let start = track.start();
        Self::new(
            (start.x as f64 + 0.5) * tile_size,
            (start.y as f64 + 0.5) * tile_size,
            track.start_angle(),
            spec,
        )
    }

    pub fn spec(&self) -> CarSpec {
        CarSpec {
            max_speed: self.max_speed,
            acceleration: self.acceleration,
            turn_rate: self.turn_rate,
        }
    }
}
