//! Gradient-descent optimizers for [`crate::network::NeuralNetwork`].
//!
//! Every optimizer receives the index of the layer it is updating, so stateful
//! optimizers keep one accumulator per layer. State is allocated lazily the
//! first time a layer is seen.

use ndarray::{Array, Array1, Array2, Dimension};
use serde::{Deserialize, Serialize};

pub trait Optimizer {
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32);
    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32);

    /// Called once after all layers of a gradient step have been updated.
    fn finish_step(&mut self) {}
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
    RMSProp(RMSProp),
}

impl Optimizer for OptimizerWrapper {
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
            OptimizerWrapper::RMSProp(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
        }
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
            OptimizerWrapper::RMSProp(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
        }
    }

    fn finish_step(&mut self) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.finish_step(),
            OptimizerWrapper::Adam(optimizer) => optimizer.finish_step(),
            OptimizerWrapper::RMSProp(optimizer) => optimizer.finish_step(),
        }
    }
}

/// Per-layer accumulator slot, zero-initialised to the parameter's shape on first use.
fn slot<'a, D: Dimension>(
    slots: &'a mut Vec<Option<Array<f32, D>>>,
    layer: usize,
    like: &Array<f32, D>,
) -> &'a mut Array<f32, D> {
    if slots.len() <= layer {
        slots.resize(layer + 1, None);
    }
    let stale = slots[layer]
        .as_ref()
        .map_or(true, |existing| existing.shape() != like.shape());
    if stale {
        slots[layer] = Some(Array::zeros(like.raw_dim()));
    }
    slots[layer].get_or_insert_with(|| Array::zeros(like.raw_dim()))
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Optimizer for SGD {
    fn update_weights(&mut self, _layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        weights.zip_mut_with(gradients, |w, &g| *w -= learning_rate * g);
    }

    fn update_biases(&mut self, _layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        biases.zip_mut_with(gradients, |b, &g| *b -= learning_rate * g);
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Vec<Option<Array2<f32>>>,
    v_weights: Vec<Option<Array2<f32>>>,
    m_biases: Vec<Option<Array1<f32>>>,
    v_biases: Vec<Option<Array1<f32>>>,
    pub t: i32,
}

impl Adam {
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            beta1,
            beta2,
            epsilon,
            m_weights: Vec::new(),
            v_weights: Vec::new(),
            m_biases: Vec::new(),
            v_biases: Vec::new(),
            t: 1,
        }
    }

    fn adam_step<D: Dimension>(
        &self,
        params: &mut Array<f32, D>,
        gradients: &Array<f32, D>,
        m: &mut Array<f32, D>,
        v: &mut Array<f32, D>,
        learning_rate: f32,
    ) {
        let (beta1, beta2) = (self.beta1, self.beta2);
        m.zip_mut_with(gradients, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        v.zip_mut_with(gradients, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        let m_correction = 1.0 - beta1.powi(self.t);
        let v_correction = 1.0 - beta2.powi(self.t);
        let epsilon = self.epsilon;

        ndarray::Zip::from(params).and(&*m).and(&*v).for_each(|p, &m, &v| {
            let m_hat = m / m_correction;
            let v_hat = v / v_correction;
            *p -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
        });
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        let mut m = slot(&mut self.m_weights, layer, weights).clone();
        let mut v = slot(&mut self.v_weights, layer, weights).clone();
        self.adam_step(weights, gradients, &mut m, &mut v, learning_rate);
        self.m_weights[layer] = Some(m);
        self.v_weights[layer] = Some(v);
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        let mut m = slot(&mut self.m_biases, layer, biases).clone();
        let mut v = slot(&mut self.v_biases, layer, biases).clone();
        self.adam_step(biases, gradients, &mut m, &mut v, learning_rate);
        self.m_biases[layer] = Some(m);
        self.v_biases[layer] = Some(v);
    }

    fn finish_step(&mut self) {
        self.t = self.t.saturating_add(1);
    }
}

/// RMSProp optimizer
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RMSProp {
    pub beta: f32,
    pub epsilon: f32,
    v_weights: Vec<Option<Array2<f32>>>,
    v_biases: Vec<Option<Array1<f32>>>,
}

impl RMSProp {
    pub fn new(beta: f32, epsilon: f32) -> Self {
        RMSProp {
            beta,
            epsilon,
            v_weights: Vec::new(),
            v_biases: Vec::new(),
        }
    }
}

impl Default for RMSProp {
    fn default() -> Self {
        Self::new(0.9, 1e-7)
    }
}

impl Optimizer for RMSProp {
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        let (beta, epsilon) = (self.beta, self.epsilon);
        let v = slot(&mut self.v_weights, layer, weights);
        v.zip_mut_with(gradients, |v, &g| *v = beta * *v + (1.0 - beta) * g * g);
        ndarray::Zip::from(weights).and(gradients).and(&*v).for_each(|w, &g, &v| {
            *w -= learning_rate * g / (v.sqrt() + epsilon);
        });
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        let (beta, epsilon) = (self.beta, self.epsilon);
        let v = slot(&mut self.v_biases, layer, biases);
        v.zip_mut_with(gradients, |v, &g| *v = beta * *v + (1.0 - beta) * g * g);
        ndarray::Zip::from(biases).and(gradients).and(&*v).for_each(|b, &g, &v| {
            *b -= learning_rate * g / (v.sqrt() + epsilon);
        });
    }
}
