use crate::car::Car;
use crate::radar::RadarReading;
use serde::{Deserialize, Serialize};

/// Why an episode stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No car was alive at the start of the final tick.
    AllCrashed,
    /// The tick counter exceeded `max_ticks`.
    TickBudget,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarSnapshot {
    pub position: [f64; 2],
    pub heading: f64,
    pub speed: f64,
    pub alive: bool,
    pub distance_traveled: f64,
    pub radar: Vec<RadarReading>,
}

impl From<&Car> for CarSnapshot {
    fn from(car: &Car) -> Self {
        Self {
            position: car.position,
            heading: car.heading,
            speed: car.speed,
            alive: car.is_alive(),
            distance_traveled: car.distance_traveled,
            radar: car.radar().to_vec(),
        }
    }
}

/// Read-only view of every car after one processed tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFrame {
    pub generation: u64,
    pub tick: usize,
    pub alive_count: usize,
    pub cars: Vec<CarSnapshot>,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generation: u64,
    /// Number of ticks processed, including the terminal one.
    pub ticks: usize,
    pub termination: Termination,
    pub final_alive_count: usize,
    /// Accumulated reward per population member, in population order.
    pub fitness: Vec<f64>,
    #[serde(default)]
    pub distances: Vec<f64>,
}

impl EpisodeSummary {
    /// Index and fitness of the best member. Ties go to the lowest index.
    pub fn best(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &f) in self.fitness.iter().enumerate() {
            if best.is_none_or(|(_, b)| f > b) {
                best = Some((i, f));
            }
        }
        best
    }

    pub fn mean_fitness(&self) -> f64 {
        if self.fitness.is_empty() {
            return 0.0;
        }
        self.fitness.iter().sum::<f64>() / self.fitness.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(fitness: Vec<f64>) -> EpisodeSummary {
        EpisodeSummary {
            schema_version: 1,
            generation: 1,
            ticks: 10,
            termination: Termination::AllCrashed,
            final_alive_count: 0,
            distances: vec![0.0; fitness.len()],
            fitness,
        }
    }

    #[test]
    fn best_prefers_lowest_index_on_ties() {
        assert_eq!(summary(vec![1.0, 3.0, 3.0]).best(), Some((1, 3.0)));
        assert_eq!(summary(Vec::new()).best(), None);
    }

    #[test]
    fn mean_fitness_handles_empty() {
        assert_eq!(summary(Vec::new()).mean_fitness(), 0.0);
        assert_eq!(summary(vec![1.0, 3.0]).mean_fitness(), 2.0);
    }

    #[test]
    fn summary_json_defaults_schema_version() {
        let json = r#"{
            "generation": 3,
            "ticks": 5,
            "termination": "tick_budget",
            "final_alive_count": 1,
            "fitness": [2.5]
        }"#;
        let parsed: EpisodeSummary = serde_json::from_str(json).expect("summary should parse");
        assert_eq!(parsed.schema_version, 1);
        assert_eq!(parsed.termination, Termination::TickBudget);
        assert!(parsed.distances.is_empty());
    }
}
