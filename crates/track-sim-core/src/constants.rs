/// Width of the sensor vector handed to every policy. Radar readings beyond this are
/// rejected by config validation; fewer readings are zero-padded.
pub const SENSOR_WIDTH: usize = 5;

/// Number of discrete actions a policy chooses between. Policy outputs must be exactly
/// this wide.
pub const ACTION_COUNT: usize = 4;

/// Headings are stored in simulation degrees and converted to a screen-space (Y down)
/// trigonometric angle as `HEADING_FLIP_DEGREES - heading`. All direction math goes
/// through [`crate::geometry::heading_vector`].
pub const HEADING_FLIP_DEGREES: f64 = 360.0;

/// Largest population a single episode accepts.
pub const MAX_POPULATION: usize = 10_000;

/// Largest track dimension (pixels) accepted by config validation.
pub const MAX_TRACK_DIMENSION: u32 = 8192;

/// Prime multiplier used to derive per-member RNG streams from a base seed.
/// Chosen so streams for consecutive member indices have minimal overlap.
pub const RNG_DERIVATION_PRIME: u64 = 7919;
