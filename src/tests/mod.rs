pub mod test_metrics;
pub mod test_td_target;
pub mod test_trainer;

use ndarray::Array2;

use crate::activations::Activation;
use crate::network::NeuralNetwork;
use crate::optimizer::{OptimizerWrapper, SGD};

/// Single linear layer `inputs -> actions` with all-zero parameters and plain SGD,
/// so Q-values and updates can be computed by hand.
pub(crate) fn zero_linear_network(inputs: usize, actions: usize, learning_rate: f32) -> NeuralNetwork {
    let mut network = NeuralNetwork::new(
        &[inputs, actions],
        &[Activation::Linear],
        OptimizerWrapper::SGD(SGD::new()),
        learning_rate,
    )
    .unwrap();
    network.layers[0].weights = Array2::zeros((inputs, actions));
    network
}
