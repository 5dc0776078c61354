use crate::car::Car;
use crate::constants::COAST_DRAG_FACTOR;
use crate::input::InputSnapshot;

/// Advances `car` by one step of `dt` seconds.
///
/// Speed is updated first and position integrates along the new heading at
/// the new speed. Holding both turn keys applies both deltas.
pub fn advance(
    car: &mut Car,
    input: InputSnapshot,
    dt: f64,
    accel_multiplier: f64,
    max_speed_multiplier: f64,
    turn_multiplier: f64,
) {
    let max_speed = car.max_speed * max_speed_multiplier;
    let acceleration = car.acceleration * accel_multiplier;

    if input.accelerate {
        car.speed = (car.speed + acceleration * dt).min(max_speed);
    } else if input.brake {
        car.speed = (car.speed - acceleration * dt).max(0.0);
    } else {
        car.speed = (car.speed - acceleration * COAST_DRAG_FACTOR * dt).max(0.0);
    }

    if input.turn_left {
        car.angle -= car.turn_rate * turn_multiplier * dt;
    }
    if input.turn_right {
        car.angle += car.turn_rate * turn_multiplier * dt;
    }

    car.x += car.angle.cos() * car.speed * dt;
    car.y += car.angle.sin() * car.speed * dt;
}
