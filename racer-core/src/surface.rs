use crate::car::Car;
use crate::config::PhysicsConfig;
use crate::track::TileKind;

/// Scaling applied to a car's acceleration, top speed and turn rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceMultipliers {
    pub accel: f64,
    pub max_speed: f64,
    pub turn: f64,
}

impl SurfaceMultipliers {
    pub const NONE: Self = Self {
        accel: 1.0,
        max_speed: 1.0,
        turn: 1.0,
    };

    pub fn mud(config: &PhysicsConfig) -> Self {
        Self {
            accel: config.mud_accel_multiplier,
            max_speed: config.mud_speed_multiplier,
            turn: config.mud_turn_multiplier,
        }
    }
}

/// Updates the car's mud timer for the tile under it and returns the
/// multipliers for this tick. Mud re-arms the full sticky time; any other
/// surface bleeds the timer down linearly to exactly zero.
pub fn surface_multipliers(
    car: &mut Car,
    dt: f64,
    tile: TileKind,
    config: &PhysicsConfig,
) -> SurfaceMultipliers {
    if tile == TileKind::Mud {
        car.mud_timer = config.mud_sticky_time;
    } else if car.mud_timer > 0.0 {
        car.mud_timer = (car.mud_timer - dt).max(0.0);
    }

    if car.mud_timer > 0.0 {
        SurfaceMultipliers::mud(config)
    } else {
        SurfaceMultipliers::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mud_arms_timer_and_applies_penalty() {
        let config = PhysicsConfig::default();
        let mut car = Car::default();
        let multipliers =
            surface_multipliers(&mut car, config.fixed_timestep, TileKind::Mud, &config);
        assert_eq!(car.mud_timer, config.mud_sticky_time);
        assert_eq!(multipliers, SurfaceMultipliers::mud(&config));
    }

    #[test]
    fn timer_decays_to_exactly_zero_then_releases() {
        let config = PhysicsConfig::default();
        let dt = 0.25;
        let mut car = Car::default();
        surface_multipliers(&mut car, dt, TileKind::Mud, &config);

        // 0.6 -> 0.35 -> 0.1 -> 0
        let first = surface_multipliers(&mut car, dt, TileKind::Road, &config);
        assert_eq!(first, SurfaceMultipliers::mud(&config));
        let second = surface_multipliers(&mut car, dt, TileKind::Road, &config);
        assert_eq!(second, SurfaceMultipliers::mud(&config));
        let third = surface_multipliers(&mut car, dt, TileKind::Road, &config);
        assert_eq!(car.mud_timer, 0.0);
        assert_eq!(third, SurfaceMultipliers::NONE);
    }

    #[test]
    fn timer_rearms_every_tick_on_mud() {
        let config = PhysicsConfig::default();
        let mut car = Car::default();
        for _ in 0..10 {
            surface_multipliers(&mut car, config.fixed_timestep, TileKind::Mud, &config);
            assert_eq!(car.mud_timer, config.mud_sticky_time);
        }
    }

    #[test]
    fn non_mud_surfaces_are_neutral_without_timer() {
        let config = PhysicsConfig::default();
        let mut car = Car::default();
        for tile in [TileKind::Road, TileKind::Start, TileKind::Checkpoint, TileKind::Wall] {
            assert_eq!(
                surface_multipliers(&mut car, config.fixed_timestep, tile, &config),
                SurfaceMultipliers::NONE
            );
        }
        assert_eq!(car.mud_timer, 0.0);
    }
}
