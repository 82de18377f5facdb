use crate::action::Action;
use crate::config::SimConfig;
use crate::geometry::heading_vector;
use crate::radar::{self, RadarReading};
use crate::track::TrackMap;

/// Outcome of one [`Car::update`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The car was already dead; nothing changed.
    Inert,
    /// The car started the tick on a boundary pixel and did not move.
    CrashedBeforeMove,
    /// The car moved onto a boundary pixel.
    CrashedAfterMove,
    Moved,
}

impl UpdateOutcome {
    pub fn crashed(self) -> bool {
        matches!(
            self,
            UpdateOutcome::CrashedBeforeMove | UpdateOutcome::CrashedAfterMove
        )
    }
}

/// One simulated car. Owned by the episode that spawned it.
#[derive(Clone, Debug)]
pub struct Car {
    /// Top-left reference point of the footprint.
    pub position: [f64; 2],
    /// Degrees; see [`crate::geometry::heading_vector`] for the screen convention.
    pub heading: f64,
    pub speed: f64,
    pub distance_traveled: f64,
    alive: bool,
    radar: Vec<RadarReading>,
}

impl Car {
    /// Fresh car at the configured spawn pose. The radar stays empty until the first
    /// update.
    pub fn spawn(config: &SimConfig) -> Self {
        Self {
            position: config.spawn_position,
            heading: config.spawn_heading,
            speed: config.spawn_speed,
            distance_traveled: 0.0,
            alive: true,
            radar: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn radar(&self) -> &[RadarReading] {
        &self.radar
    }

    pub fn center(&self, config: &SimConfig) -> [f64; 2] {
        let half = config.half_car_size();
        [self.position[0] + half, self.position[1] + half]
    }

    /// Apply a policy decision. Dead cars ignore actions.
    pub fn apply(&mut self, action: Action, config: &SimConfig) {
        if !self.alive {
            return;
        }
        match action {
            Action::TurnLeft => self.heading += config.turn_delta,
            Action::TurnRight => self.heading -= config.turn_delta,
            Action::Hold => {}
            Action::Accelerate => {
                self.speed = (self.speed + config.speed_increment).min(config.max_speed);
            }
        }
    }

    /// Advance one tick: collision check, move along heading, collision check at the new
    /// center, then rebuild the radar if the car survived.
    pub fn update(&mut self, track: &TrackMap, config: &SimConfig) -> UpdateOutcome {
        if !self.alive {
            return UpdateOutcome::Inert;
        }

        if self.collides(track, config) {
            self.crash();
            return UpdateOutcome::CrashedBeforeMove;
        }

        let [dx, dy] = heading_vector(self.heading);
        self.position[0] += dx * self.speed;
        self.position[1] += dy * self.speed;
        self.distance_traveled += self.speed;
        debug_assert!(
            self.position.iter().all(|v| v.is_finite()),
            "car position became non-finite"
        );

        if self.collides(track, config) {
            self.crash();
            return UpdateOutcome::CrashedAfterMove;
        }

        self.radar = radar::sense(self, track, config);
        UpdateOutcome::Moved
    }

    fn collides(&self, track: &TrackMap, config: &SimConfig) -> bool {
        track.is_boundary_at(self.center(config))
    }

    fn crash(&mut self) {
        self.alive = false;
        self.radar.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn open_config() -> SimConfig {
        SimConfig {
            spawn_position: [100.0, 100.0],
            spawn_speed: 5.0,
            ..SimConfig::default()
        }
    }

    #[test]
    fn spawn_uses_configured_pose_and_empty_radar() {
        let config = SimConfig::default();
        let car = Car::spawn(&config);
        assert_eq!(car.position, [630.0, 270.0]);
        assert_eq!(car.heading, 0.0);
        assert_eq!(car.speed, 5.0);
        assert_eq!(car.distance_traveled, 0.0);
        assert!(car.is_alive());
        assert!(car.radar().is_empty());
        assert_eq!(car.center(&config), [637.5, 277.5]);
    }

    #[test]
    fn update_moves_along_heading_and_counts_distance() {
        let config = open_config();
        let track = TrackMap::open(400, 400).unwrap();
        let mut car = Car::spawn(&config);
        assert_eq!(car.update(&track, &config), UpdateOutcome::Moved);
        assert!((car.position[0] - 105.0).abs() < 1e-9);
        assert!((car.position[1] - 100.0).abs() < 1e-9);
        assert_eq!(car.distance_traveled, 5.0);
        assert_eq!(car.radar().len(), config.radar_offsets.len());
    }

    #[test]
    fn positive_heading_moves_up_the_screen() {
        let config = SimConfig {
            spawn_heading: 90.0,
            ..open_config()
        };
        let track = TrackMap::open(400, 400).unwrap();
        let mut car = Car::spawn(&config);
        car.update(&track, &config);
        assert!((car.position[0] - 100.0).abs() < 1e-9);
        assert!((car.position[1] - 95.0).abs() < 1e-9);
    }

    #[test]
    fn crash_before_move_leaves_state_untouched() {
        let config = open_config();
        // Boundary pixel under the spawn center (107.5, 107.5).
        let track = TrackMap::from_fn(400, 400, |x, y| x == 107 && y == 107).unwrap();
        let mut car = Car::spawn(&config);
        assert_eq!(car.update(&track, &config), UpdateOutcome::CrashedBeforeMove);
        assert!(!car.is_alive());
        assert_eq!(car.position, [100.0, 100.0]);
        assert_eq!(car.distance_traveled, 0.0);
        assert!(car.radar().is_empty());
    }

    #[test]
    fn crash_after_move_counts_the_final_step() {
        let config = open_config();
        // Center moves from 107.5 to 112.5 and lands on column 112.
        let track = TrackMap::from_fn(400, 400, |x, _| x == 112).unwrap();
        let mut car = Car::spawn(&config);
        assert_eq!(car.update(&track, &config), UpdateOutcome::CrashedAfterMove);
        assert!(!car.is_alive());
        assert_eq!(car.distance_traveled, 5.0);
        assert!(car.radar().is_empty());
    }

    #[test]
    fn leaving_the_frame_is_a_crash() {
        let config = SimConfig {
            spawn_position: [385.0, 100.0],
            ..open_config()
        };
        let track = TrackMap::open(400, 400).unwrap();
        let mut car = Car::spawn(&config);
        // Center 392.5 -> 397.5 -> 402.5.
        assert_eq!(car.update(&track, &config), UpdateOutcome::Moved);
        assert_eq!(car.update(&track, &config), UpdateOutcome::CrashedAfterMove);
    }

    #[test]
    fn dead_car_is_inert() {
        let config = open_config();
        let track = TrackMap::from_fn(400, 400, |x, _| x == 112).unwrap();
        let mut car = Car::spawn(&config);
        car.update(&track, &config);
        assert!(!car.is_alive());

        let (position, heading, speed, distance) =
            (car.position, car.heading, car.speed, car.distance_traveled);
        for action in Action::ALL {
            car.apply(action, &config);
            assert_eq!(car.update(&track, &config), UpdateOutcome::Inert);
        }
        assert_eq!(car.position, position);
        assert_eq!(car.heading, heading);
        assert_eq!(car.speed, speed);
        assert_eq!(car.distance_traveled, distance);
        assert!(!car.is_alive());
    }

    #[test]
    fn actions_adjust_heading_and_speed() {
        let config = open_config();
        let mut car = Car::spawn(&config);
        car.apply(Action::TurnLeft, &config);
        assert_eq!(car.heading, 10.0);
        car.apply(Action::TurnRight, &config);
        car.apply(Action::TurnRight, &config);
        assert_eq!(car.heading, -10.0);
        car.apply(Action::Hold, &config);
        assert_eq!(car.heading, -10.0);
        assert_eq!(car.speed, 5.0);
        car.apply(Action::Accelerate, &config);
        assert_eq!(car.speed, 6.0);
    }

    #[test]
    fn accelerate_clamps_to_max_speed() {
        let config = open_config();
        let mut car = Car::spawn(&config);
        for _ in 0..20 {
            car.apply(Action::Accelerate, &config);
        }
        assert_eq!(car.speed, config.max_speed);
    }

    proptest! {
        #[test]
        fn proptest_speed_and_distance_invariants(
            actions in proptest::collection::vec(0usize..4, 1..60),
        ) {
            let config = SimConfig::default();
            let track = TrackMap::ellipse_ring(800, 600, [380.0, 280.0], [220.0, 140.0]).unwrap();
            let mut car = Car::spawn(&config);
            for index in actions {
                let before = car.distance_traveled;
                let was_alive = car.is_alive();
                car.apply(Action::from_index(index).unwrap(), &config);
                let speed = car.speed;
                let outcome = car.update(&track, &config);
                prop_assert!(car.speed >= 0.0 && car.speed <= config.max_speed);
                prop_assert!(car.distance_traveled >= before);
                match outcome {
                    UpdateOutcome::Moved | UpdateOutcome::CrashedAfterMove => {
                        prop_assert!((car.distance_traveled - before - speed).abs() < 1e-9);
                    }
                    _ => prop_assert_eq!(car.distance_traveled, before),
                }
                if !was_alive {
                    prop_assert!(!car.is_alive());
                }
                if car.is_alive() {
                    prop_assert_eq!(car.radar().len(), config.radar_offsets.len());
                } else {
                    prop_assert!(car.radar().is_empty());
                }
            }
        }
    }
}
