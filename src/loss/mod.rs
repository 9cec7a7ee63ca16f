//! Loss functions for Q-value regression.

pub mod functions;

pub use functions::{Loss, MaskedMse};
