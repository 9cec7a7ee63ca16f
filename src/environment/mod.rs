//! # Environments
//!
//! The training loop only sees the [`Environment`] trait. Any toy scenario
//! (cart-pole, grid rooms, ...) is an interchangeable implementation behind it.

pub mod cart_pole;
pub mod rooms;

pub use cart_pole::CartPole;
pub use rooms::{RoomAction, RoomNavigation};

use ndarray::Array1;
use serde_json::{Map, Value};

use crate::error::Result;

/// Result of a single environment step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub state: Array1<f32>,
    pub reward: f32,
    /// The environment reached a real terminal state.
    pub terminal: bool,
    /// Opaque extra data from the environment
    pub info: Map<String, Value>,
}

/// Episodic environment with a discrete action space.
pub trait Environment {
    /// Start a new episode and return its first state.
    fn reset(&mut self) -> Result<Array1<f32>>;

    /// Apply `action` and advance one step.
    fn step(&mut self, action: usize) -> Result<StepOutcome>;

    /// Size of the discrete action space.
    fn num_actions(&self) -> usize;

    fn observation_shape(&self) -> Vec<usize>;

    /// Number of features in a flattened state.
    fn state_size(&self) -> usize {
        self.observation_shape().iter().product()
    }
}
