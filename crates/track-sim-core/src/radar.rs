//! Fan-of-rays distance sensing against the track boundary.

use crate::car::Car;
use crate::config::SimConfig;
use crate::constants::SENSOR_WIDTH;
use crate::geometry::{distance, heading_vector};
use crate::track::TrackMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadarReading {
    /// Final traced point of the ray (boundary hit, frame exit, or max range).
    pub hit_point: [f64; 2],
    /// Euclidean distance from the car center to `hit_point`.
    pub distance: f64,
}

/// March one ray from `origin` in unit steps, stopping on the first traced point that is
/// out of frame or on a boundary pixel, or at `max_range`.
pub fn cast_ray(
    origin: [f64; 2],
    angle_degrees: f64,
    max_range: u32,
    track: &TrackMap,
) -> RadarReading {
    let [dx, dy] = heading_vector(angle_degrees);
    let mut point = origin;
    for length in 0..=max_range {
        let step = length as f64;
        point = [origin[0] + dx * step, origin[1] + dy * step];
        if track.is_boundary_at(point) {
            break;
        }
    }
    RadarReading {
        hit_point: point,
        distance: distance(origin, point),
    }
}

/// Readings for every configured offset, in offset order, cast from the car center.
pub fn sense(car: &Car, track: &TrackMap, config: &SimConfig) -> Vec<RadarReading> {
    let center = car.center(config);
    config
        .radar_offsets
        .iter()
        .map(|offset| cast_ray(center, car.heading + offset, config.radar_max_range, track))
        .collect()
}

/// Normalized policy input: each distance divided by `normalization`, zero-padded on the
/// right to [`SENSOR_WIDTH`].
pub fn sensor_vector(readings: &[RadarReading], normalization: f64) -> [f32; SENSOR_WIDTH] {
    let mut out = [0.0f32; SENSOR_WIDTH];
    for (slot, reading) in out.iter_mut().zip(readings) {
        *slot = (reading.distance / normalization) as f32;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn car_at_center(center: [f64; 2], heading: f64, config: &SimConfig) -> Car {
        let half = config.half_car_size();
        let mut car = Car::spawn(config);
        car.position = [center[0] - half, center[1] - half];
        car.heading = heading;
        car
    }

    #[test]
    fn open_track_reports_max_range_on_every_ray() {
        let config = SimConfig::default();
        let track = TrackMap::open(800, 600).unwrap();
        let car = Car::spawn(&config);
        let center = car.center(&config);
        let readings = sense(&car, &track, &config);

        assert_eq!(readings.len(), 5);
        for (reading, offset) in readings.iter().zip(&config.radar_offsets) {
            assert!((reading.distance - 150.0).abs() < 1e-9, "offset {offset}");
            let [dx, dy] = heading_vector(car.heading + offset);
            assert!((reading.hit_point[0] - (center[0] + dx * 150.0)).abs() < 1e-9);
            assert!((reading.hit_point[1] - (center[1] + dy * 150.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn center_on_boundary_reports_zero_everywhere() {
        let config = SimConfig::default();
        let track = TrackMap::from_fn(100, 100, |x, y| x == 50 && y == 50).unwrap();
        let car = car_at_center([50.5, 50.5], 0.0, &config);
        for reading in sense(&car, &track, &config) {
            assert_eq!(reading.distance, 0.0);
            assert_eq!(reading.hit_point, [50.5, 50.5]);
        }
    }

    #[test]
    fn center_out_of_frame_reports_zero() {
        let config = SimConfig::default();
        let track = TrackMap::open(50, 50).unwrap();
        let car = car_at_center([-10.0, 25.0], 0.0, &config);
        assert!(sense(&car, &track, &config)
            .iter()
            .all(|r| r.distance == 0.0));
    }

    #[test]
    fn forward_ray_stops_on_wall() {
        let config = SimConfig::default();
        let track = TrackMap::from_fn(300, 100, |x, _| x >= 120).unwrap();
        let car = car_at_center([20.5, 50.5], 0.0, &config);
        let readings = sense(&car, &track, &config);
        // Offsets are [-90, -45, 0, 45, 90]; index 2 looks straight ahead.
        let ahead = readings[2];
        // First traced point with x >= 120 is at length 100 (x = 120.5).
        assert!((ahead.distance - 100.0).abs() < 1e-9);
        assert_eq!(TrackMap::pixel_of(ahead.hit_point[0]), 120);
    }

    #[test]
    fn ray_stops_at_frame_edge() {
        let track = TrackMap::open(100, 100).unwrap();
        // Facing down the screen (heading -90): frame ends at y = 100.
        let reading = cast_ray([50.5, 80.5], -90.0, 150, &track);
        assert!((reading.distance - 20.0).abs() < 1e-9);
        assert_eq!(TrackMap::pixel_of(reading.hit_point[1]), 100);
    }

    #[test]
    fn readings_follow_offset_order() {
        let config = SimConfig::default();
        // Wall below the car only: the -90 ray (first) looks down the screen when
        // heading is 0, the +90 ray (last) looks up.
        let track = TrackMap::from_fn(400, 400, |_, y| y >= 230).unwrap();
        let car = car_at_center([200.5, 200.5], 0.0, &config);
        let readings = sense(&car, &track, &config);
        assert!((readings[0].distance - 30.0).abs() < 1e-9);
        assert!((readings[4].distance - 150.0).abs() < 1e-9);
    }

    #[test]
    fn sensor_vector_normalizes_and_pads() {
        let readings = [
            RadarReading {
                hit_point: [0.0, 0.0],
                distance: 150.0,
            },
            RadarReading {
                hit_point: [0.0, 0.0],
                distance: 15.0,
            },
        ];
        let v = sensor_vector(&readings, 30.0);
        assert_eq!(v.len(), SENSOR_WIDTH);
        assert_eq!(v, [5.0, 0.5, 0.0, 0.0, 0.0]);
        assert_eq!(sensor_vector(&[], 30.0), [0.0; SENSOR_WIDTH]);
    }

    proptest! {
        #[test]
        fn proptest_ray_distance_within_range(
            x in -20.0f64..220.0,
            y in -20.0f64..220.0,
            angle in -720.0f64..720.0,
            max_range in 1u32..200,
        ) {
            let track = TrackMap::from_fn(200, 200, |px, py| (px / 10 + py / 10) % 7 == 0).unwrap();
            let reading = cast_ray([x, y], angle, max_range, &track);
            prop_assert!(reading.distance >= 0.0);
            prop_assert!(reading.distance <= max_range as f64 + 1e-9);
            prop_assert!(reading.distance.is_finite());
        }
    }
}
