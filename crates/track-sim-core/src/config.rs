use crate::constants::{MAX_POPULATION, MAX_TRACK_DIMENSION, SENSOR_WIDTH};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed used when building policies for a run.
    pub seed: u64,
    /// Number of cars (one per policy) driven in each episode.
    pub population_size: usize,
    /// Track width in pixels. Image assets are scaled to this size on load.
    pub track_width: u32,
    /// Track height in pixels. Image assets are scaled to this size on load.
    pub track_height: u32,
    /// RGB color that marks boundary pixels in a track image.
    pub border_color: [u8; 3],
    /// Side length of the square car footprint. The car center is offset by half of it.
    pub car_size: f64,
    /// Top-left reference point every car spawns at.
    pub spawn_position: [f64; 2],
    /// Spawn heading in degrees.
    pub spawn_heading: f64,
    /// Spawn speed in pixels per tick.
    pub spawn_speed: f64,
    /// Upper speed clamp in pixels per tick.
    pub max_speed: f64,
    /// Speed gained by one accelerate action.
    pub speed_increment: f64,
    /// Heading change in degrees for one turn action.
    pub turn_delta: f64,
    /// Radar ray offsets relative to heading, in degrees. Must be ascending; the order
    /// fixes the layout of the sensor vector.
    pub radar_offsets: Vec<f64>,
    /// Maximum ray length in unit marching steps.
    pub radar_max_range: u32,
    /// Divisor applied to radar distances to build the sensor vector.
    pub radar_normalization: f64,
    /// Tick budget for one episode.
    pub max_ticks: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            population_size: 30,
            track_width: 800,
            track_height: 600,
            border_color: [255, 255, 255],
            car_size: 15.0,
            spawn_position: [630.0, 270.0],
            spawn_heading: 0.0,
            spawn_speed: 5.0,
            max_speed: 10.0,
            speed_increment: 1.0,
            turn_delta: 10.0,
            radar_offsets: vec![-90.0, -45.0, 0.0, 45.0, 90.0],
            radar_max_range: 150,
            radar_normalization: 30.0,
            // 30 ticks per second for a 40 second time cap.
            max_ticks: 30 * 40,
        }
    }
}

macro_rules! define_sim_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum SimConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for SimConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_sim_config_error! {
    InvalidPopulationSize => "population_size must be greater than 0";
    PopulationTooLarge { max: usize, actual: usize } => "population_size ({actual}) exceeds supported maximum ({max})";
    InvalidTrackSize => "track_width and track_height must be greater than 0";
    TrackTooLarge { max: u32, width: u32, height: u32 } => "track size {width}x{height} exceeds supported maximum ({max})";
    InvalidCarSize => "car_size must be positive and finite";
    InvalidSpawnPosition => "spawn_position must be finite";
    InvalidSpawnHeading => "spawn_heading must be finite";
    InvalidSpawnSpeed => "spawn_speed must be finite and within [0, max_speed]";
    InvalidMaxSpeed => "max_speed must be positive and finite";
    InvalidSpeedIncrement => "speed_increment must be finite and non-negative";
    InvalidTurnDelta => "turn_delta must be finite and non-negative";
    EmptyRadarOffsets => "radar_offsets must contain at least one offset";
    TooManyRadarOffsets { max: usize, actual: usize } => "radar_offsets has {actual} entries, sensor vector holds at most {max}";
    InvalidRadarOffset => "radar_offsets must be finite";
    UnorderedRadarOffsets => "radar_offsets must be strictly ascending";
    InvalidRadarMaxRange => "radar_max_range must be greater than 0";
    InvalidRadarNormalization => "radar_normalization must be positive and finite";
    InvalidMaxTicks => "max_ticks must be greater than 0";
}

impl std::error::Error for SimConfigError {}

impl SimConfig {
    pub const MAX_POPULATION: usize = MAX_POPULATION;

    pub const MAX_TRACK_DIMENSION: u32 = MAX_TRACK_DIMENSION;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.validate_population()?;
        self.validate_track()?;
        self.validate_car()?;
        self.validate_radar()?;
        if self.max_ticks == 0 {
            return Err(SimConfigError::InvalidMaxTicks);
        }
        Ok(())
    }

    fn validate_population(&self) -> Result<(), SimConfigError> {
        if self.population_size == 0 {
            return Err(SimConfigError::InvalidPopulationSize);
        }
        if self.population_size > Self::MAX_POPULATION {
            return Err(SimConfigError::PopulationTooLarge {
                max: Self::MAX_POPULATION,
                actual: self.population_size,
            });
        }
        Ok(())
    }

    fn validate_track(&self) -> Result<(), SimConfigError> {
        if self.track_width == 0 || self.track_height == 0 {
            return Err(SimConfigError::InvalidTrackSize);
        }
        if self.track_width > Self::MAX_TRACK_DIMENSION
            || self.track_height > Self::MAX_TRACK_DIMENSION
        {
            return Err(SimConfigError::TrackTooLarge {
                max: Self::MAX_TRACK_DIMENSION,
                width: self.track_width,
                height: self.track_height,
            });
        }
        Ok(())
    }

    fn validate_car(&self) -> Result<(), SimConfigError> {
        if !(self.car_size.is_finite() && self.car_size > 0.0) {
            return Err(SimConfigError::InvalidCarSize);
        }
        if !self.spawn_position.iter().all(|v| v.is_finite()) {
            return Err(SimConfigError::InvalidSpawnPosition);
        }
        if !self.spawn_heading.is_finite() {
            return Err(SimConfigError::InvalidSpawnHeading);
        }
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(SimConfigError::InvalidMaxSpeed);
        }
        if !(self.spawn_speed.is_finite() && (0.0..=self.max_speed).contains(&self.spawn_speed)) {
            return Err(SimConfigError::InvalidSpawnSpeed);
        }
        if !(self.speed_increment.is_finite() && self.speed_increment >= 0.0) {
            return Err(SimConfigError::InvalidSpeedIncrement);
        }
        if !(self.turn_delta.is_finite() && self.turn_delta >= 0.0) {
            return Err(SimConfigError::InvalidTurnDelta);
        }
        Ok(())
    }

    fn validate_radar(&self) -> Result<(), SimConfigError> {
        if self.radar_offsets.is_empty() {
            return Err(SimConfigError::EmptyRadarOffsets);
        }
        if self.radar_offsets.len() > SENSOR_WIDTH {
            return Err(SimConfigError::TooManyRadarOffsets {
                max: SENSOR_WIDTH,
                actual: self.radar_offsets.len(),
            });
        }
        if !self.radar_offsets.iter().all(|o| o.is_finite()) {
            return Err(SimConfigError::InvalidRadarOffset);
        }
        if !self.radar_offsets.windows(2).all(|w| w[0] < w[1]) {
            return Err(SimConfigError::UnorderedRadarOffsets);
        }
        if self.radar_max_range == 0 {
            return Err(SimConfigError::InvalidRadarMaxRange);
        }
        if !(self.radar_normalization.is_finite() && self.radar_normalization > 0.0) {
            return Err(SimConfigError::InvalidRadarNormalization);
        }
        Ok(())
    }

    /// Center offset applied to a car's top-left reference point.
    pub fn half_car_size(&self) -> f64 {
        self.car_size / 2.0
    }
}
