use crate::action::{Action, ActionSelectError};
use crate::car::Car;
use crate::config::{SimConfig, SimConfigError};
use crate::metrics::{CarSnapshot, EpisodeSummary, SnapshotFrame, Termination};
use crate::policy::Policy;
use crate::radar::sensor_vector;
use crate::reward;
use crate::track::TrackMap;
use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq)]
pub enum EpisodeError {
    Config(SimConfigError),
    EmptyPopulation,
    PopulationMismatch {
        expected: usize,
        actual: usize,
    },
    PolicyOutputWidth {
        member: usize,
        expected: usize,
        actual: usize,
    },
    NonFinitePolicyOutput {
        member: usize,
    },
    Finished,
}

impl fmt::Display for EpisodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeError::Config(e) => write!(f, "{}", e),
            EpisodeError::EmptyPopulation => write!(f, "episode needs at least one policy"),
            EpisodeError::PopulationMismatch { expected, actual } => write!(
                f,
                "population_size ({expected}) must match the number of policies ({actual})"
            ),
            EpisodeError::PolicyOutputWidth {
                member,
                expected,
                actual,
            } => write!(
                f,
                "policy for member {member} returned {actual} outputs, expected {expected}"
            ),
            EpisodeError::NonFinitePolicyOutput { member } => {
                write!(f, "policy for member {member} returned a non-finite output")
            }
            EpisodeError::Finished => write!(f, "episode has already finished"),
        }
    }
}

impl From<SimConfigError> for EpisodeError {
    fn from(err: SimConfigError) -> Self {
        EpisodeError::Config(err)
    }
}

impl Error for EpisodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EpisodeError::Config(e) => Some(e),
            _ => None,
        }
    }
}

/// Receives a snapshot after every processed tick.
pub trait EpisodeObserver {
    fn on_tick(&mut self, frame: &SnapshotFrame);
}

/// Keeps every `every`-th frame plus the final one.
#[derive(Clone, Debug)]
pub struct SnapshotRecorder {
    every: usize,
    frames: Vec<SnapshotFrame>,
    last: Option<SnapshotFrame>,
}

impl SnapshotRecorder {
    /// `every` of zero is treated as one.
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            frames: Vec::new(),
            last: None,
        }
    }

    pub fn into_frames(mut self) -> Vec<SnapshotFrame> {
        if let Some(last) = self.last.take() {
            self.frames.push(last);
        }
        self.frames
    }
}

impl EpisodeObserver for SnapshotRecorder {
    fn on_tick(&mut self, frame: &SnapshotFrame) {
        if frame.tick % self.every == 0 {
            self.frames.push(frame.clone());
            self.last = None;
        } else {
            self.last = Some(frame.clone());
        }
    }
}

/// What happened during one call to [`Episode::step`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub tick: usize,
    pub alive_at_start: usize,
    /// Members that crashed during this tick, in population order.
    pub crashed: Vec<usize>,
}

/// One generation's run: N cars, one policy each, on a shared read-only track.
pub struct Episode<'a, P> {
    track: &'a TrackMap,
    config: SimConfig,
    policies: Vec<P>,
    cars: Vec<Car>,
    fitness: Vec<f64>,
    generation: u64,
    tick: usize,
    ticks_processed: usize,
    termination: Option<Termination>,
    aborted: bool,
}

impl<'a, P: Policy> Episode<'a, P> {
    pub fn new(
        track: &'a TrackMap,
        policies: Vec<P>,
        config: SimConfig,
        generation: u64,
    ) -> Result<Self, EpisodeError> {
        if policies.is_empty() {
            return Err(EpisodeError::EmptyPopulation);
        }
        config.validate()?;
        if policies.len() != config.population_size {
            return Err(EpisodeError::PopulationMismatch {
                expected: config.population_size,
                actual: policies.len(),
            });
        }

        let cars = (0..policies.len()).map(|_| Car::spawn(&config)).collect();
        let fitness = vec![0.0; policies.len()];
        log::debug!(
            "generation {generation}: starting episode with {} cars on {}x{} track",
            policies.len(),
            track.width(),
            track.height()
        );
        Ok(Self {
            track,
            config,
            policies,
            cars,
            fitness,
            generation,
            tick: 0,
            ticks_processed: 0,
            termination: None,
            aborted: false,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    /// Current tick counter. Starts at 0 and advances after each non-terminal tick.
    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn alive_count(&self) -> usize {
        self.cars.iter().filter(|c| c.is_alive()).count()
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn is_finished(&self) -> bool {
        self.termination.is_some() || self.aborted
    }

    /// Final results, available once the episode has terminated.
    pub fn summary(&self) -> Option<EpisodeSummary> {
        let termination = self.termination?;
        Some(EpisodeSummary {
            schema_version: 1,
            generation: self.generation,
            ticks: self.ticks_processed,
            termination,
            final_alive_count: self.alive_count(),
            fitness: self.fitness.clone(),
            distances: self.cars.iter().map(|c| c.distance_traveled).collect(),
        })
    }

    pub fn step(&mut self) -> Result<TickReport, EpisodeError> {
        self.step_inner(None)
    }

    pub fn run(&mut self) -> Result<EpisodeSummary, EpisodeError> {
        self.run_inner(None)
    }

    pub fn run_with_observer(
        &mut self,
        observer: &mut dyn EpisodeObserver,
    ) -> Result<EpisodeSummary, EpisodeError> {
        self.run_inner(Some(observer))
    }

    fn run_inner(
        &mut self,
        mut observer: Option<&mut dyn EpisodeObserver>,
    ) -> Result<EpisodeSummary, EpisodeError> {
        loop {
            let frame_sink: Option<&mut dyn EpisodeObserver> = match observer {
                Some(ref mut o) => Some(&mut **o),
                None => None,
            };
            self.step_inner(frame_sink)?;
            if let Some(summary) = self.summary() {
                return Ok(summary);
            }
        }
    }

    fn step_inner(
        &mut self,
        observer: Option<&mut dyn EpisodeObserver>,
    ) -> Result<TickReport, EpisodeError> {
        if self.is_finished() {
            return Err(EpisodeError::Finished);
        }

        let alive_at_start = self.alive_count();
        let mut crashed = Vec::new();
        for member in 0..self.cars.len() {
            if !self.cars[member].is_alive() {
                continue;
            }
            if let Err(e) = self.advance_car(member, &mut crashed) {
                self.aborted = true;
                return Err(e);
            }
        }
        self.ticks_processed += 1;

        let report = TickReport {
            tick: self.tick,
            alive_at_start,
            crashed,
        };
        if let Some(observer) = observer {
            observer.on_tick(&self.snapshot());
        }

        if alive_at_start == 0 {
            self.finish(Termination::AllCrashed);
        } else if self.tick > self.config.max_ticks {
            self.finish(Termination::TickBudget);
        } else {
            self.tick += 1;
        }
        Ok(report)
    }

    fn advance_car(&mut self, member: usize, crashed: &mut Vec<usize>) -> Result<(), EpisodeError> {
        let car = &mut self.cars[member];
        let sensors = sensor_vector(car.radar(), self.config.radar_normalization);
        let outputs = self.policies[member].evaluate(&sensors);
        let action = Action::select(&outputs).map_err(|e| match e {
            ActionSelectError::WrongWidth { expected, actual } => {
                EpisodeError::PolicyOutputWidth {
                    member,
                    expected,
                    actual,
                }
            }
            ActionSelectError::NonFinite { .. } => EpisodeError::NonFinitePolicyOutput { member },
        })?;

        car.apply(action, &self.config);
        let outcome = car.update(self.track, &self.config);
        self.fitness[member] += reward::score(car);
        if outcome.crashed() {
            log::debug!(
                "generation {}: car {member} crashed at tick {} after {:.1}px",
                self.generation,
                self.tick,
                car.distance_traveled
            );
            crashed.push(member);
        }
        Ok(())
    }

    fn snapshot(&self) -> SnapshotFrame {
        SnapshotFrame {
            generation: self.generation,
            tick: self.tick,
            alive_count: self.alive_count(),
            cars: self.cars.iter().map(CarSnapshot::from).collect(),
        }
    }

    fn finish(&mut self, termination: Termination) {
        self.termination = Some(termination);
        let best = self
            .fitness
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        log::info!(
            "generation {}: episode ended after {} ticks ({:?}), {} alive, best fitness {:.2}",
            self.generation,
            self.ticks_processed,
            termination,
            self.alive_count(),
            best
        );
    }
}

/// Run one full episode and return the per-member fitness summary.
pub fn run_episode<P: Policy>(
    policies: Vec<P>,
    track: &TrackMap,
    config: &SimConfig,
    generation: u64,
) -> Result<EpisodeSummary, EpisodeError> {
    Episode::new(track, policies, config.clone(), generation)?.run()
}
