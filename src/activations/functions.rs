use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Activation applied by a [`crate::layers::DenseLayer`] to its pre-activation output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Relu,
    /// Identity, used for the Q-value output layer.
    Linear,
}

impl Activation {
    pub fn apply_batch(&self, pre_activation: &mut Array2<f32>) {
        if let Activation::Relu = self {
            pre_activation.mapv_inplace(|v| v.max(0.0));
        }
    }

    /// Elementwise derivative at `pre_activation`.
    pub fn derivative_batch(&self, pre_activation: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Activation::Relu => pre_activation.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Linear => Array2::ones(pre_activation.raw_dim()),
        }
    }
}
