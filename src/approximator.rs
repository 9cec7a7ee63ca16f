//! Capability interface for Q-function approximators.
//!
//! [`crate::model::DoubleQLearningModel`] only talks to its two networks
//! through [`QFunctionApproximator`], so any numerical backend can sit behind it.
//! [`crate::network::NeuralNetwork`] is the bundled implementation.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Weights and biases of one layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerParameters {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

/// Full parameter snapshot of an approximator, in layer order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub layers: Vec<LayerParameters>,
}

/// A function `Q(s, ·)` mapping a batch of states to one value per action.
pub trait QFunctionApproximator: Sized {
    /// Number of features per state.
    fn input_dim(&self) -> usize;

    /// Number of actions, i.e. columns of [`QFunctionApproximator::predict`] output.
    fn num_actions(&self) -> usize;

    /// Q-values for `states[N, input_dim]`, shape `[N, num_actions]`. No side effects.
    fn predict(&self, states: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// One gradient-descent step minimising the mean squared error between
    /// `Q(states[i], actions[i])` and `td_targets[i]`. Returns the loss before the step.
    fn gradient_step(
        &mut self,
        states: ArrayView2<f32>,
        td_targets: ArrayView1<f32>,
        actions: &[usize],
    ) -> Result<f32>;

    fn parameters(&self) -> Parameters;

    /// Replace every parameter. Fails without modifying anything on a shape mismatch.
    fn set_parameters(&mut self, parameters: Parameters) -> Result<()>;

    fn save(&self, path: &Path) -> Result<()>;

    fn load_from(path: &Path) -> Result<Self>;
}
