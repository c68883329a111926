//! Feed-forward value network.
//!
//! A small fully connected network mapping state vectors to per-action value
//! estimates. The loss (mean squared error) and the optimizer are fixed at
//! construction, so one [`NeuralNetwork::train_on_batch`] call is one
//! complete gradient step.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::Result;
use crate::loss::{mse, mse_grad};
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// Activation function applied to a layer's pre-activation output.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Linear,
}

impl Activation {
    fn apply(&self, values: &mut Array2<f32>) {
        match self {
            Activation::Relu => values.mapv_inplace(|v| v.max(0.0)),
            Activation::Linear => {}
        }
    }

    fn derivative(&self, pre_activation: &Array2<f32>) -> Array2<f32> {
        match self {
            Activation::Relu => pre_activation.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Linear => Array2::ones(pre_activation.dim()),
        }
    }
}

/// A fully connected layer.
#[derive(Serialize, Deserialize, Clone)]
pub struct Layer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

impl Layer {
    /// Create a layer with LeCun-uniform weight init and zero biases.
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Self {
        let limit = (3.0 / input_size as f32).sqrt();
        let weights = Array2::random((input_size, output_size), Uniform::new(-limit, limit));
        let biases = Array1::zeros(output_size);
        Layer {
            weights,
            biases,
            activation,
        }
    }

    /// Forward pass for a batch; returns (pre-activation, activated) outputs.
    fn forward(&self, inputs: ArrayView2<f32>) -> (Array2<f32>, Array2<f32>) {
        let pre = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        let mut post = pre.clone();
        self.activation.apply(&mut post);
        (pre, post)
    }
}

/// A feed-forward network with its optimizer and learning rate bound at
/// construction.
#[derive(Serialize, Deserialize, Clone)]
pub struct NeuralNetwork {
    pub layers: Vec<Layer>,
    pub optimizer: OptimizerWrapper,
    pub learning_rate: f32,
}

impl NeuralNetwork {
    /// Build a network from consecutive layer sizes.
    ///
    /// `layer_sizes` has one entry per activation plus one for the input,
    /// so `&[4, 32, 2]` with `&[Relu, Linear]` is a two-layer network.
    pub fn new(
        layer_sizes: &[usize],
        activations: &[Activation],
        optimizer: OptimizerWrapper,
        learning_rate: f32,
    ) -> Self {
        assert_eq!(
            layer_sizes.len() - 1,
            activations.len(),
            "one activation per weight layer"
        );

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| Layer::new(window[0], window[1], activation))
            .collect::<Vec<_>>();

        NeuralNetwork {
            layers,
            optimizer,
            learning_rate,
        }
    }

    /// Number of outputs of the final layer.
    pub fn output_dim(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.biases.len())
    }

    /// Forward pass for a batch of input rows. Does not mutate the network.
    pub fn predict(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            let (_, post) = layer.forward(current.view());
            current = post;
        }
        current
    }

    /// One gradient step on a batch, returning the mean-squared-error loss
    /// of the forward pass the gradients were computed from.
    pub fn train_on_batch(
        &mut self,
        inputs: ArrayView2<f32>,
        targets: ArrayView2<f32>,
    ) -> Result<f32> {
        // Forward, keeping per-layer inputs and pre-activation outputs for
        // backpropagation.
        let mut layer_inputs = Vec::with_capacity(self.layers.len());
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            layer_inputs.push(current.clone());
            let (pre, post) = layer.forward(current.view());
            pre_activations.push(pre);
            current = post;
        }

        let loss = mse(current.view(), targets);
        let mut error = mse_grad(current.view(), targets);

        // Backward pass, updating in place from the last layer down.
        for idx in (0..self.layers.len()).rev() {
            let layer = &mut self.layers[idx];
            let delta = &error * &layer.activation.derivative(&pre_activations[idx]);
            let weight_grads = layer_inputs[idx].t().dot(&delta);
            let bias_grads = delta.sum_axis(Axis(0));

            if idx != 0 {
                error = delta.dot(&layer.weights.t());
            }

            self.optimizer.step(
                idx,
                &mut layer.weights,
                &mut layer.biases,
                &weight_grads,
                &bias_grads,
                self.learning_rate,
            );
        }

        Ok(loss)
    }

    /// Serialize the network to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    /// Load a network previously written by [`NeuralNetwork::save`].
    pub fn load(path: &str) -> Result<Self> {
        let data = fs::read(path)?;
        let network = bincode::deserialize(&data)?;
        Ok(network)
    }
}
