//! Epsilon-greedy action selection and its per-episode epsilon schedule.

use ndarray::{Array1, ArrayView1};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DdqnError, Result};

/// Index of the largest value; ties go to the first index. `None` for an empty view.
///
/// NaN entries never win against a number.
pub fn argmax(values: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            None => best = Some((index, value)),
            Some((_, current)) if value > current || (current.is_nan() && !value.is_nan()) => {
                best = Some((index, value))
            }
            _ => {}
        }
    }
    best.map(|(index, _)| index)
}

/// Epsilon-greedy distribution over actions.
///
/// Every action gets `epsilon / A`; the greedy action additionally gets `1 - epsilon`.
pub fn eps_greedy_policy(q_values: ArrayView1<f32>, epsilon: f32) -> Result<Array1<f32>> {
    if !(0.0..=1.0).contains(&epsilon) {
        return Err(DdqnError::invalid_parameter("epsilon", format!("{} is outside [0, 1]", epsilon)));
    }
    let greedy = argmax(q_values)
        .ok_or_else(|| DdqnError::invalid_parameter("q_values", "at least one action is required"))?;

    let num_actions = q_values.len();
    let mut policy = Array1::from_elem(num_actions, epsilon / num_actions as f32);
    policy[greedy] += 1.0 - epsilon;
    Ok(policy)
}

/// Draw an action index from a probability distribution.
pub fn sample_action<R: Rng + ?Sized>(policy: ArrayView1<f32>, rng: &mut R) -> Result<usize> {
    let distribution = WeightedIndex::new(policy.iter().copied())
        .map_err(|e| DdqnError::NumericalError(format!("invalid action distribution: {}", e)))?;
    Ok(distribution.sample(rng))
}

/// Linear per-episode epsilon decay, clamped at a floor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpsilonSchedule {
    pub start: f32,
    pub floor: f32,
    pub decay: f32,
    current: f32,
}

impl EpsilonSchedule {
    pub fn new(start: f32, floor: f32, decay: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&start) || !(0.0..=1.0).contains(&floor) {
            return Err(DdqnError::invalid_parameter("epsilon", "start and floor must lie in [0, 1]"));
        }
        if floor > start {
            return Err(DdqnError::invalid_parameter("epsilon_floor", "floor must not exceed start"));
        }
        if !(decay >= 0.0) {
            return Err(DdqnError::invalid_parameter("epsilon_decay", "decay must be non-negative"));
        }
        Ok(EpsilonSchedule { start, floor, decay, current: start })
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    /// Apply one episode's decrement and return the new epsilon.
    pub fn step(&mut self) -> f32 {
        self.current = (self.current - self.decay).max(self.floor);
        self.current
    }

    pub fn reset(&mut self) {
        self.current = self.start;
    }
}
