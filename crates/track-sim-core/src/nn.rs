//! Fixed-topology feedforward network: 5 inputs → 8 hidden (tanh) → 4 outputs (tanh).
//! Stack-allocated, no heap. 84 weights total.
//!
//! Inputs:  normalized radar distances (5)
//! Outputs: action scores [turn_left, turn_right, hold, accelerate]

use crate::constants::{ACTION_COUNT, SENSOR_WIDTH};
use crate::policy::Policy;
use rand::Rng;
use std::{error::Error, fmt};

const INPUT_SIZE: usize = SENSOR_WIDTH;
const HIDDEN_SIZE: usize = 8;
const OUTPUT_SIZE: usize = ACTION_COUNT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightCountError {
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for WeightCountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "network needs {} weights, got {}",
            self.expected, self.actual
        )
    }
}

impl Error for WeightCountError {}

#[derive(Clone, Debug, PartialEq)]
pub struct NeuralNet {
    // weights: input→hidden (5×8) + hidden bias (8) + hidden→output (8×4) + output bias (4)
    // Total: 40 + 8 + 32 + 4 = 84 parameters
    pub w_ih: [[f32; HIDDEN_SIZE]; INPUT_SIZE],  // 5×8
    pub b_h: [f32; HIDDEN_SIZE],                 // 8
    pub w_ho: [[f32; OUTPUT_SIZE]; HIDDEN_SIZE], // 8×4
    pub b_o: [f32; OUTPUT_SIZE],                 // 4
}

impl NeuralNet {
    pub const WEIGHT_COUNT: usize =
        INPUT_SIZE * HIDDEN_SIZE + HIDDEN_SIZE + HIDDEN_SIZE * OUTPUT_SIZE + OUTPUT_SIZE;

    /// Build a network from a flat slice laid out as produced by [`Self::to_weight_vec`].
    pub fn try_from_weights(weights: &[f32]) -> Result<Self, WeightCountError> {
        if weights.len() != Self::WEIGHT_COUNT {
            return Err(WeightCountError {
                expected: Self::WEIGHT_COUNT,
                actual: weights.len(),
            });
        }
        Ok(Self::from_weight_iter(weights.iter().copied()))
    }

    /// Uniform random weights in `[-1, 1)`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_weight_iter((0..Self::WEIGHT_COUNT).map(|_| rng.random::<f32>() * 2.0 - 1.0))
    }

    // Callers guarantee WEIGHT_COUNT items; a short iterator zero-fills the tail.
    fn from_weight_iter(mut weights: impl Iterator<Item = f32>) -> Self {
        let mut take = || weights.next().unwrap_or_default();

        let mut w_ih = [[0.0f32; HIDDEN_SIZE]; INPUT_SIZE];
        for row in &mut w_ih {
            for w in row.iter_mut() {
                *w = take();
            }
        }

        let mut b_h = [0.0f32; HIDDEN_SIZE];
        for b in &mut b_h {
            *b = take();
        }

        let mut w_ho = [[0.0f32; OUTPUT_SIZE]; HIDDEN_SIZE];
        for row in &mut w_ho {
            for w in row.iter_mut() {
                *w = take();
            }
        }

        let mut b_o = [0.0f32; OUTPUT_SIZE];
        for b in &mut b_o {
            *b = take();
        }

        Self {
            w_ih,
            b_h,
            w_ho,
            b_o,
        }
    }

    /// Forward pass. Returns scores in [`crate::action::Action`] index order.
    pub fn forward(&self, input: &[f32; INPUT_SIZE]) -> [f32; OUTPUT_SIZE] {
        // Hidden layer
        let mut hidden = self.b_h;
        for (i, &x) in input.iter().enumerate() {
            for (j, h) in hidden.iter_mut().enumerate() {
                *h += x * self.w_ih[i][j];
            }
        }
        for h in &mut hidden {
            *h = h.tanh();
        }

        // Output layer
        let mut output = self.b_o;
        for (i, &h) in hidden.iter().enumerate() {
            for (j, o) in output.iter_mut().enumerate() {
                *o += h * self.w_ho[i][j];
            }
        }
        for o in &mut output {
            *o = o.tanh();
        }

        output
    }

    /// Flatten network parameters in the same order expected by `try_from_weights`.
    pub fn to_weight_vec(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(Self::WEIGHT_COUNT);
        for row in &self.w_ih {
            out.extend_from_slice(row);
        }
        out.extend_from_slice(&self.b_h);
        for row in &self.w_ho {
            out.extend_from_slice(row);
        }
        out.extend_from_slice(&self.b_o);
        out
    }
}

impl Policy for NeuralNet {
    fn evaluate(&self, sensors: &[f32]) -> Vec<f32> {
        let mut input = [0.0f32; INPUT_SIZE];
        for (slot, &v) in input.iter_mut().zip(sensors) {
            *slot = v;
        }
        self.forward(&input).to_vec()
    }
}
