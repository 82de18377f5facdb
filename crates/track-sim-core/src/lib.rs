pub mod action;
pub mod car;
pub mod config;
pub mod constants;
pub mod episode;
pub mod geometry;
pub mod metrics;
pub mod nn;
pub mod policy;
pub mod radar;
pub mod reward;
pub mod rng;
pub mod track;

pub use action::Action;
pub use car::Car;
pub use config::{SimConfig, SimConfigError};
pub use constants::{ACTION_COUNT, SENSOR_WIDTH};
pub use episode::{run_episode, Episode, EpisodeError, EpisodeObserver, SnapshotRecorder};
pub use metrics::{CarSnapshot, EpisodeSummary, SnapshotFrame, Termination};
pub use nn::NeuralNet;
pub use policy::{FixedAction, FnPolicy, Policy, SteeringHeuristic};
pub use track::{TrackError, TrackMap};
