//! Decision-making seam between the simulation and whatever drives the cars.

use crate::action::Action;
use crate::constants::SENSOR_WIDTH;
use serde::{Deserialize, Serialize};

/// Maps a sensor vector to an action score vector.
///
/// `sensors` is always [`SENSOR_WIDTH`] wide. The output must be
/// [`crate::constants::ACTION_COUNT`] wide; the episode picks the first maximum.
/// Policies are stateless from the simulation's point of view.
pub trait Policy {
    fn evaluate(&self, sensors: &[f32]) -> Vec<f32>;
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn evaluate(&self, sensors: &[f32]) -> Vec<f32> {
        (**self).evaluate(sensors)
    }
}

impl<P: Policy + ?Sized> Policy for &P {
    fn evaluate(&self, sensors: &[f32]) -> Vec<f32> {
        (**self).evaluate(sensors)
    }
}

/// Adapts a closure into a [`Policy`].
#[derive(Clone, Copy)]
pub struct FnPolicy<F>(pub F);

impl<F> Policy for FnPolicy<F>
where
    F: Fn(&[f32]) -> Vec<f32>,
{
    fn evaluate(&self, sensors: &[f32]) -> Vec<f32> {
        (self.0)(sensors)
    }
}

/// Always emits the same action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedAction(pub Action);

impl Policy for FixedAction {
    fn evaluate(&self, _sensors: &[f32]) -> Vec<f32> {
        self.0.one_hot()
    }
}

/// Scripted driver: accelerate while the road ahead is clear, otherwise steer toward the
/// side with more room.
///
/// Expects the default five-ray layout `[-90, -45, 0, 45, 90]`: indices 0..2 look right
/// of the heading, 3..5 look left.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SteeringHeuristic {
    /// Normalized front distance below which the car starts turning.
    pub front_clearance: f32,
}

impl Default for SteeringHeuristic {
    fn default() -> Self {
        // 2.0 normalized = 60 px at the default radar scale.
        Self {
            front_clearance: 2.0,
        }
    }
}

impl SteeringHeuristic {
    pub fn decide(&self, sensors: &[f32]) -> Action {
        let mut padded = [0.0f32; SENSOR_WIDTH];
        for (slot, &v) in padded.iter_mut().zip(sensors) {
            *slot = v;
        }
        let [right_wide, right, front, left, left_wide] = padded;
        if front >= self.front_clearance {
            return Action::Accelerate;
        }
        let left_room = left + left_wide;
        let right_room = right + right_wide;
        if left_room > right_room {
            Action::TurnLeft
        } else if right_room > left_room {
            Action::TurnRight
        } else {
            Action::Hold
        }
    }
}

impl Policy for SteeringHeuristic {
    fn evaluate(&self, sensors: &[f32]) -> Vec<f32> {
        self.decide(sensors).one_hot()
    }
}
