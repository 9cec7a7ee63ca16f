//! # ddqn - Double Deep Q-Learning
//!
//! A small double-DQN toolkit: an experience replay buffer, double Q-learning
//! TD targets, an epsilon-greedy policy and a training loop, all written against
//! a [`approximator::QFunctionApproximator`] capability trait. A dense
//! [`network::NeuralNetwork`] is bundled as the default approximator.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ddqn::config::TrainingConfig;
//! use ddqn::trainer::run_training;
//!
//! let config = TrainingConfig {
//!     num_episodes: 300,
//!     seed: Some(7),
//!     ..TrainingConfig::default()
//! };
//! let report = run_training(&config).unwrap();
//! println!("solved: {}, last average: {:?}", report.solved, report.running_averages.last());
//! ```
//!
//! ## Module Organization
//!
//! - [`replay_buffer`] - Bounded experience replay with uniform sampling
//! - [`td_target`] - Double Q-learning TD targets
//! - [`policy`] - Epsilon-greedy policy and epsilon schedule
//! - [`model`] - Online/offline network pair with stochastic role swapping
//! - [`approximator`] - Q-function approximator trait
//! - [`network`], [`layers`], [`activations`], [`loss`], [`optimizer`] - Dense network backend
//! - [`environment`] - Environment trait with cart-pole and room-navigation tasks
//! - [`trainer`] - Training loop and entry points
//! - [`config`] - Training configuration
//! - [`metrics`] - Episode statistics
//! - [`error`] - Error types and result handling
//! - [`logging`] - Tracing setup

pub mod activations;
pub mod approximator;
pub mod config;
pub mod environment;
pub mod error;
pub mod layers;
pub mod logging;
pub mod loss;
pub mod metrics;
pub mod model;
pub mod network;
pub mod optimizer;
pub mod policy;
pub mod replay_buffer;
pub mod td_target;
pub mod trainer;

pub use error::{DdqnError, Result};

#[cfg(test)]
mod tests;
