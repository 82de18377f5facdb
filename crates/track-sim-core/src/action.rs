use crate::constants::ACTION_COUNT;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Discrete control applied to a car once per tick. The discriminant is the index of the
/// policy output that selects it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Heading += turn_delta (counter-clockwise on screen).
    TurnLeft = 0,
    /// Heading -= turn_delta.
    TurnRight = 1,
    Hold = 2,
    /// Speed += speed_increment, clamped to max_speed.
    Accelerate = 3,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionSelectError {
    WrongWidth { expected: usize, actual: usize },
    NonFinite { index: usize },
}

impl fmt::Display for ActionSelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionSelectError::WrongWidth { expected, actual } => {
                write!(f, "policy output has {actual} entries, expected {expected}")
            }
            ActionSelectError::NonFinite { index } => {
                write!(f, "policy output entry {index} is not finite")
            }
        }
    }
}

impl Error for ActionSelectError {}

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::TurnLeft,
        Action::TurnRight,
        Action::Hold,
        Action::Accelerate,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Argmax over a policy output. Ties go to the lowest index.
    pub fn select(outputs: &[f32]) -> Result<Self, ActionSelectError> {
        if outputs.len() != ACTION_COUNT {
            return Err(ActionSelectError::WrongWidth {
                expected: ACTION_COUNT,
                actual: outputs.len(),
            });
        }
        if let Some(index) = outputs.iter().position(|v| !v.is_finite()) {
            return Err(ActionSelectError::NonFinite { index });
        }
        let mut best = 0;
        for (i, &v) in outputs.iter().enumerate().skip(1) {
            // Strict comparison keeps the first maximum.
            if v > outputs[best] {
                best = i;
            }
        }
        Ok(Self::ALL[best])
    }

    /// One-hot output vector that [`Action::select`] maps back to `self`.
    pub fn one_hot(self) -> Vec<f32> {
        let mut out = vec![0.0; ACTION_COUNT];
        out[self.index()] = 1.0;
        out
    }
}
