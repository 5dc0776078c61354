use crate::car::Car;
use crate::config::PhysicsConfig;
use crate::constants::{COLLISION_PULLBACK, COLLISION_SPEED_DAMPING};
use crate::track::{TilePos, Track};

/// True when a circle of `radius` centred at (`cx`, `cy`) touches the
/// axis-aligned rectangle. Touching edges count.
pub fn circle_intersects_rect(
    cx: f64,
    cy: f64,
    radius: f64,
    left: f64,
    top: f64,
    size: f64,
) -> bool {
    let closest_x = cx.clamp(left, left + size);
    let closest_y = cy.clamp(top, top + size);
    let dx = cx - closest_x;
    let dy = cy - closest_y;
    dx * dx + dy * dy <= radius * radius
}

/// Whether a car-sized circle at (`x`, `y`) overlaps any wall tile. Cells
/// outside the grid count as walls.
pub fn collides_at(track: &Track, x: f64, y: f64, config: &PhysicsConfig) -> bool {
    let ts = config.tile_size;
    let r = config.car_radius;
    let min_x = ((x - r) / ts).floor() as i32;
    let max_x = ((x + r) / ts).floor() as i32;
    let min_y = ((y - r) / ts).floor() as i32;
    let max_y = ((y + r) / ts).floor() as i32;

    for ty in min_y..=max_y {
        for tx in min_x..=max_x {
            let pos = TilePos::new(tx, ty);
            if !track.in_bounds(pos) {
                return true;
            }
            if track.is_wall_tile(pos)
                && circle_intersects_rect(x, y, r, tx as f64 * ts, ty as f64 * ts, ts)
            {
                return true;
            }
        }
    }
    false
}

/// Pulls the car back out of walls after it moved from (`prev_x`, `prev_y`).
///
/// Axes are tested independently so the car slides along a wall instead of
/// sticking to it. Returns true when either axis was rejected.
pub fn resolve_collision(
    car: &mut Car,
    prev_x: f64,
    prev_y: f64,
    track: &Track,
    config: &PhysicsConfig,
) -> bool {
    let resolved_x = if collides_at(track, car.x, prev_y, config) {
        prev_x
    } else {
        car.x
    };
    let resolved_y = if collides_at(track, resolved_x, car.y, config) {
        prev_y
    } else {
        car.y
    };

    if resolved_x == car.x && resolved_y == car.y {
        return false;
    }

    car.speed *= COLLISION_SPEED_DAMPING;
    car.x = resolved_x - (car.x - prev_x) * COLLISION_PULLBACK;
    car.y = resolved_y - (car.y - prev_y) * COLLISION_PULLBACK;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::CarSpec;

    fn arena() -> Track {
        Track::from_json(
            r#"{
                "width": 6, "height": 5,
                "tiles": ["111111", "130001", "100101", "100041", "111111"],
                "legend": {"0": "road", "1": "wall", "3": "start", "4": "finish"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn circle_rect_touching_edge_counts() {
        assert!(circle_intersects_rect(42.0, 16.0, 10.0, 0.0, 0.0, 32.0));
        assert!(!circle_intersects_rect(42.1, 16.0, 10.0, 0.0, 0.0, 32.0));
        // Corner distance is sqrt(50) < 10.
        assert!(circle_intersects_rect(37.0, 37.0, 10.0, 0.0, 0.0, 32.0));
    }

    #[test]
    fn open_road_does_not_collide() {
        let track = arena();
        let config = PhysicsConfig::default();
        assert!(!collides_at(&track, 48.0, 48.0, &config));
        assert!(collides_at(&track, 40.0, 48.0, &config));
    }

    #[test]
    fn out_of_bounds_range_collides() {
        let track = arena();
        let config = PhysicsConfig::default();
        assert!(collides_at(&track, -50.0, 48.0, &config));
        assert!(collides_at(&track, 48.0, 500.0, &config));
    }

    #[test]
    fn free_move_is_untouched() {
        let track = arena();
        let config = PhysicsConfig::default();
        let mut car = Car::new(50.0, 48.0, 0.0, CarSpec::default());
        car.speed = 120.0;
        let before = car;
        assert!(!resolve_collision(&mut car, 48.0, 48.0, &track, &config));
        assert_eq!(car, before);
    }

    #[test]
    fn head_on_wall_rejects_x_and_damps_speed() {
        let track = arena();
        let config = PhysicsConfig::default();
        // Tile (3,2) is an interior wall; its left edge is at x=96.
        let mut car = Car::new(87.0, 80.0, 0.0, CarSpec::default());
        car.speed = 300.0;
        assert!(resolve_collision(&mut car, 80.0, 80.0, &track, &config));
        assert_eq!(car.speed, 180.0);
        assert!((car.x - (80.0 - 0.7)).abs() < 1e-9);
        assert_eq!(car.y, 80.0);
        assert!(!collides_at(&track, car.x, car.y, &config));
    }

    #[test]
    fn sliding_keeps_the_free_axis() {
        let track = arena();
        let config = PhysicsConfig::default();
        // Moving up-right into the top wall: y is rejected, x survives.
        let mut car = Car::new(60.0, 40.0, 0.0, CarSpec::default());
        car.speed = 100.0;
        assert!(resolve_collision(&mut car, 58.0, 44.0, &track, &config));
        assert!((car.x - (60.0 - 0.2)).abs() < 1e-9);
        assert!((car.y - (44.0 + 0.4)).abs() < 1e-9);
        assert_eq!(car.speed, 60.0);
    }
}
