use crate::car::CarSpec;
use crate::constants::{
    CAR_RADIUS, COUNTDOWN_SECS, FIXED_TIMESTEP, MUD_ACCEL_MULTIPLIER, MUD_SPEED_MULTIPLIER,
    MUD_STICKY_TIME, MUD_TURN_MULTIPLIER, TILE_SIZE,
};

/// Constants every car in a session is simulated with. The first five fields
/// are stamped into replay metadata; a replay only plays back when they match.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub fixed_timestep: f64,
    pub mud_accel_multiplier: f64,
    pub mud_speed_multiplier: f64,
    pub mud_turn_multiplier: f64,
    pub mud_sticky_time: f64,
    pub tile_size: f64,
    pub car_radius: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: FIXED_TIMESTEP,
            mud_accel_multiplier: MUD_ACCEL_MULTIPLIER,
            mud_speed_multiplier: MUD_SPEED_MULTIPLIER,
            mud_turn_multiplier: MUD_TURN_MULTIPLIER,
            mud_sticky_time: MUD_STICKY_TIME,
            tile_size: TILE_SIZE,
            car_radius: CAR_RADIUS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionOptions {
    pub physics: PhysicsConfig,
    pub car: CarSpec,
    /// Zero skips the countdown and the run waits for the first input.
    pub countdown_secs: f64,
    pub ghost_enabled: bool,
    pub creator_ghost_enabled: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            car: CarSpec::default(),
            countdown_secs: COUNTDOWN_SECS,
            ghost_enabled: true,
            creator_ghost_enabled: false,
        }
    }
}
