use crate::car::Car;
use crate::geometry::heading_vector;

/// Per-tick reward: forward (+x) component of velocity, floored at zero.
pub fn score(car: &Car) -> f64 {
    let [forward, _] = heading_vector(car.heading);
    (car.speed * forward).max(0.0)
}
