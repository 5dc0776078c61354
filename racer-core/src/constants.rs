// Simulation rate
pub const FIXED_TIMESTEP: f64 = 1.0 / 60.0;
pub const MAX_FRAME_ACCUMULATOR_SECS: f64 = 0.25;
pub const COUNTDOWN_SECS: f64 = 3.0;

// World geometry (world units)
pub const TILE_SIZE: f64 = 32.0;
pub const CAR_RADIUS: f64 = 10.0;

// Default car
pub const CAR_MAX_SPEED: f64 = 420.0;
pub const CAR_ACCELERATION: f64 = 420.0;
pub const CAR_TURN_RATE: f64 = 3.2; // rad/s

// Coasting drag as a fraction of braking force
pub const COAST_DRAG_FACTOR: f64 = 0.4;

// Collision response
pub const COLLISION_SPEED_DAMPING: f64 = 0.6;
pub const COLLISION_PULLBACK: f64 = 0.1;

// Sticky mud
pub const MUD_ACCEL_MULTIPLIER: f64 = 0.5;
pub const MUD_SPEED_MULTIPLIER: f64 = 0.45;
pub const MUD_TURN_MULTIPLIER: f64 = 0.7;
pub const MUD_STICKY_TIME: f64 = 0.6; // seconds

// 10 minutes of ticks at 60 Hz
pub const MAX_REPLAY_TICKS_DEFAULT: u32 = 36_000;

// Editor defaults
pub const DRAFT_DEFAULT_WIDTH: usize = 20;
pub const DRAFT_DEFAULT_HEIGHT: usize = 20;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mud_penalties_are_real_penalties() {
        for multiplier in [
            MUD_ACCEL_MULTIPLIER,
            MUD_SPEED_MULTIPLIER,
            MUD_TURN_MULTIPLIER,
        ] {
            assert!(multiplier > 0.0 && multiplier < 1.0);
        }
    }

    #[test]
    fn car_fits_inside_a_single_tile_corridor() {
        assert!(CAR_RADIUS * 2.0 < TILE_SIZE);
    }
}
