//! Experience replay: a bounded ring buffer of transitions sampled uniformly
//! with replacement.

use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::{DdqnError, Result};

/// One environment step `<s, a, r, s', t>`. Rewards are `f32`, the network's dtype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_state: Array1<f32>,
    /// True only when the environment reached a real terminal state.
    pub terminal: bool,
}

/// A sampled batch, every field with leading dimension `batch_size`.
#[derive(Clone, Debug, PartialEq)]
pub struct Minibatch {
    pub states: Array2<f32>,
    pub actions: Vec<usize>,
    pub rewards: Array1<f32>,
    pub next_states: Array2<f32>,
    pub terminals: Array1<bool>,
}

impl Minibatch {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Fixed-capacity FIFO of transitions. Once full, every insertion evicts the oldest entry.
#[derive(Clone, Debug)]
pub struct ExperienceReplay {
    buffer: VecDeque<Transition>,
    capacity: usize,
    state_size: usize,
}

impl ExperienceReplay {
    /// Create a buffer holding at most `capacity` transitions of `state_size` features each.
    pub fn new(capacity: usize, state_size: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(DdqnError::invalid_parameter("capacity", "Capacity must be greater than 0"));
        }
        if state_size == 0 {
            return Err(DdqnError::invalid_parameter("state_size", "State size must be greater than 0"));
        }
        // Large capacities grow on demand instead of reserving up front.
        let initial = capacity.min(1 << 16);
        Ok(ExperienceReplay {
            buffer: VecDeque::with_capacity(initial),
            capacity,
            state_size,
        })
    }

    /// Adds a transition, evicting the oldest one when the buffer is full.
    pub fn add(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Current number of stored transitions, never more than [`ExperienceReplay::capacity`].
    pub fn buffer_length(&self) -> usize {
        self.buffer.len()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    /// Stored transitions from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    /// Sample `batch_size` transitions using the thread-local RNG.
    pub fn sample_minibatch(&self, batch_size: usize) -> Result<Minibatch> {
        self.sample_minibatch_using(batch_size, &mut rand::thread_rng())
    }

    /// Sample `batch_size` indices independently and uniformly, with replacement,
    /// and stack the chosen transitions.
    pub fn sample_minibatch_using<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Result<Minibatch> {
        if batch_size > 0 && self.buffer.is_empty() {
            return Err(DdqnError::EmptyBuffer("cannot sample from an empty replay buffer".to_string()));
        }

        let mut states = Array2::zeros((batch_size, self.state_size));
        let mut next_states = Array2::zeros((batch_size, self.state_size));
        let mut actions = Vec::with_capacity(batch_size);
        let mut rewards = Array1::zeros(batch_size);
        let mut terminals = Array1::from_elem(batch_size, false);

        for i in 0..batch_size {
            let transition = &self.buffer[rng.gen_range(0..self.buffer.len())];
            if transition.state.len() != self.state_size || transition.next_state.len() != self.state_size {
                return Err(DdqnError::dimension_mismatch(
                    format!("{} state features", self.state_size),
                    format!("{} / {}", transition.state.len(), transition.next_state.len()),
                ));
            }
            states.row_mut(i).assign(&transition.state);
            next_states.row_mut(i).assign(&transition.next_state);
            actions.push(transition.action);
            rewards[i] = transition.reward;
            terminals[i] = transition.terminal;
        }

        Ok(Minibatch {
            states,
            actions,
            rewards,
            next_states,
            terminals,
        })
    }
}
