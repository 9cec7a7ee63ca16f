//! # Activation Functions
//!
//! Element-wise non-linearities used by [`crate::layers::DenseLayer`].
//! Hidden layers of a Q-network use ReLU and the output layer is linear.

pub mod functions;

pub use functions::Activation;
