use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use bincode::{deserialize, serialize};

use crate::activations::Activation;
use crate::approximator::{LayerParameters, Parameters, QFunctionApproximator};
use crate::error::{DdqnError, Result};
use crate::layers::DenseLayer;
use crate::loss::{Loss, MaskedMse};
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// A Neural Network consisting of dense layers, an optimizer, and methods for training
/// and making predictions.
///
/// This is the default [`QFunctionApproximator`] backend: a multi-layer perceptron
/// whose output layer has one unit per action.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
    pub learning_rate: f32,
}

impl NeuralNetwork {
    /// Create a new neural network with the given layer sizes, activations, and optimizer.
    /// `activations` must hold one entry per layer, i.e. `layer_sizes.len() - 1`.
    pub fn new(
        layer_sizes: &[usize],
        activations: &[Activation],
        optimizer: OptimizerWrapper,
        learning_rate: f32,
    ) -> Result<Self> {
        Self::new_using(layer_sizes, activations, optimizer, learning_rate, &mut rand::thread_rng())
    }

    /// Same as [`NeuralNetwork::new`] with weights drawn from `rng`.
    pub fn new_using<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        optimizer: OptimizerWrapper,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(DdqnError::invalid_parameter(
                "layer_sizes",
                "Network must have at least input and output layers",
            ));
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(DdqnError::invalid_parameter("layer_sizes", "Layer sizes must be positive"));
        }
        if activations.len() != layer_sizes.len() - 1 {
            return Err(DdqnError::invalid_parameter(
                "activations",
                "Number of activations must match number of layers - 1",
            ));
        }
        if !(learning_rate > 0.0) {
            return Err(DdqnError::invalid_parameter("learning_rate", "Learning rate must be positive"));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new_using(window[0], window[1], activation, rng))
            .collect::<Vec<_>>();

        Ok(NeuralNetwork { layers, optimizer, learning_rate })
    }

    /// Q-network shape: ReLU hidden layers and a linear output with one unit per action.
    pub fn q_network<R: Rng + ?Sized>(
        input_dim: usize,
        hidden_layers: &[usize],
        num_actions: usize,
        optimizer: OptimizerWrapper,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        let mut layer_sizes = Vec::with_capacity(hidden_layers.len() + 2);
        layer_sizes.push(input_dim);
        layer_sizes.extend_from_slice(hidden_layers);
        layer_sizes.push(num_actions);

        let mut activations = vec![Activation::Relu; hidden_layers.len()];
        activations.push(Activation::Linear);

        Self::new_using(&layer_sizes, &activations, optimizer, learning_rate, rng)
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    fn check_input(&self, inputs: &ArrayView2<f32>) -> Result<()> {
        if inputs.ncols() != self.input_size() {
            return Err(DdqnError::dimension_mismatch(
                format!("{} input features", self.input_size()),
                format!("{} input features", inputs.ncols()),
            ));
        }
        Ok(())
    }

    /// Perform a forward pass for a single input vector.
    pub fn forward(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        let input = input.insert_axis(Axis(0)); // Treat single instance as a minibatch of size 1
        let output = self.infer_batch(input)?;
        Ok(output.index_axis_move(Axis(0), 0))
    }

    /// Forward pass for a batch without caching anything for backpropagation.
    pub fn infer_batch(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(&inputs)?;
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            current_output = layer.infer_batch(current_output.view());
        }
        Ok(current_output)
    }

    /// Forward pass for a batch that caches per-layer state for [`NeuralNetwork::backward_batch`].
    fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(&inputs)?;
        let mut current_output = inputs.to_owned();
        for layer in &mut self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        Ok(current_output)
    }

    /// Backpropagate output errors through every layer, returning per-layer gradients
    /// in layer order.
    fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Result<Vec<(Array2<f32>, Array1<f32>)>> {
        let mut gradients: Vec<(Array2<f32>, Array1<f32>)> = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();

        for (i, layer) in self.layers.iter().enumerate().rev() {
            let (adjusted_error, weight_gradients, bias_gradients) = layer
                .backward_batch(current_error.view())
                .ok_or_else(|| DdqnError::NumericalError("backward pass without a cached forward pass".to_string()))?;
            gradients.push((weight_gradients, bias_gradients));

            if i != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }
        }

        gradients.reverse();
        Ok(gradients)
    }

    /// One optimizer step on the masked MSE between `Q(s, a)` and `targets`.
    ///
    /// Returns the loss measured before the step.
    pub fn train_masked(
        &mut self,
        inputs: ArrayView2<f32>,
        targets: ArrayView1<f32>,
        actions: &[usize],
    ) -> Result<f32> {
        let loss_fn = MaskedMse;
        let outputs = self.forward_batch(inputs)?;
        let loss = loss_fn.compute(outputs.view(), targets, actions)?;
        let output_errors = loss_fn.gradient(outputs.view(), targets, actions)?;
        let gradients = self.backward_batch(output_errors.view())?;

        let learning_rate = self.learning_rate;
        for (index, (layer, (weight_gradients, bias_gradients))) in
            self.layers.iter_mut().zip(gradients).enumerate()
        {
            self.optimizer.update_weights(index, &mut layer.weights, &weight_gradients, learning_rate);
            self.optimizer.update_biases(index, &mut layer.biases, &bias_gradients, learning_rate);
            layer.clear_cache();
        }
        self.optimizer.finish_step();

        Ok(loss)
    }

    /// Save the neural network's state to a file.
    /// This function serializes the neural network, including its layers and optimizer, and writes
    /// the serialized data to a file at the specified path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serialize(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(&serialized)?;
        Ok(())
    }

    /// Load a neural network from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = fs::File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        let deserialized: Self = deserialize(&buffer)?;
        deserialized.check_layout()?;
        Ok(deserialized)
    }

    /// Every layer's biases match its width and each layer feeds the next.
    fn check_layout(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(DdqnError::invalid_parameter("layers", "Network has no layers"));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.biases.len() != layer.output_size() {
                return Err(DdqnError::dimension_mismatch(
                    format!("layer {} biases of length {}", i, layer.output_size()),
                    format!("length {}", layer.biases.len()),
                ));
            }
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(DdqnError::dimension_mismatch(
                    format!("layer {} input width {}", i + 1, pair[0].output_size()),
                    format!("{}", pair[1].input_size()),
                ));
            }
        }
        Ok(())
    }
}

impl QFunctionApproximator for NeuralNetwork {
    fn input_dim(&self) -> usize {
        self.input_size()
    }

    fn num_actions(&self) -> usize {
        self.output_size()
    }

    fn predict(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.infer_batch(states)
    }

    fn gradient_step(
        &mut self,
        states: ArrayView2<f32>,
        td_targets: ArrayView1<f32>,
        actions: &[usize],
    ) -> Result<f32> {
        self.train_masked(states, td_targets, actions)
    }

    fn parameters(&self) -> Parameters {
        Parameters {
            layers: self
                .layers
                .iter()
                .map(|layer| LayerParameters {
                    weights: layer.weights.clone(),
                    biases: layer.biases.clone(),
                })
                .collect(),
        }
    }

    fn set_parameters(&mut self, parameters: Parameters) -> Result<()> {
        if parameters.layers.len() != self.layers.len() {
            return Err(DdqnError::dimension_mismatch(
                format!("{} layers", self.layers.len()),
                format!("{} layers", parameters.layers.len()),
            ));
        }
        for (layer, incoming) in self.layers.iter().zip(&parameters.layers) {
            if layer.weights.dim() != incoming.weights.dim() || layer.biases.dim() != incoming.biases.dim() {
                return Err(DdqnError::dimension_mismatch(
                    format!("{:?}", layer.weights.dim()),
                    format!("{:?}", incoming.weights.dim()),
                ));
            }
        }
        for (layer, incoming) in self.layers.iter_mut().zip(parameters.layers) {
            layer.weights = incoming.weights;
            layer.biases = incoming.biases;
        }
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        NeuralNetwork::save(self, path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        NeuralNetwork::load(path)
    }
}
