//! Stochastic-gradient optimizers.
//!
//! A network owns one [`OptimizerWrapper`] shared by all of its layers; the
//! layer index is passed into [`Optimizer::step`] so stateful optimizers can
//! keep per-layer slots.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Applies one parameter update for a single layer.
pub trait Optimizer {
    fn step(
        &mut self,
        layer_idx: usize,
        weights: &mut Array2<f32>,
        biases: &mut Array1<f32>,
        weight_grads: &Array2<f32>,
        bias_grads: &Array1<f32>,
        learning_rate: f32,
    );
}

/// Serializable dispatch over the concrete optimizers.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    Sgd(Sgd),
    Momentum(Momentum),
}

impl Optimizer for OptimizerWrapper {
    fn step(
        &mut self,
        layer_idx: usize,
        weights: &mut Array2<f32>,
        biases: &mut Array1<f32>,
        weight_grads: &Array2<f32>,
        bias_grads: &Array1<f32>,
        learning_rate: f32,
    ) {
        match self {
            OptimizerWrapper::Sgd(optimizer) => {
                optimizer.step(layer_idx, weights, biases, weight_grads, bias_grads, learning_rate)
            }
            OptimizerWrapper::Momentum(optimizer) => {
                optimizer.step(layer_idx, weights, biases, weight_grads, bias_grads, learning_rate)
            }
        }
    }
}

/// Vanilla stochastic gradient descent.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Sgd;

impl Sgd {
    pub fn new() -> Sgd {
        Sgd
    }
}

impl Default for Sgd {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer for Sgd {
    fn step(
        &mut self,
        _layer_idx: usize,
        weights: &mut Array2<f32>,
        biases: &mut Array1<f32>,
        weight_grads: &Array2<f32>,
        bias_grads: &Array1<f32>,
        learning_rate: f32,
    ) {
        weights.zip_mut_with(weight_grads, |w, &g| *w -= learning_rate * g);
        biases.zip_mut_with(bias_grads, |b, &g| *b -= learning_rate * g);
    }
}

/// SGD with classical momentum.
///
/// Velocity buffers are created lazily the first time a layer index is seen,
/// so the optimizer does not need the layer shapes up front.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Momentum {
    pub beta: f32,
    v_weights: Vec<Option<Array2<f32>>>,
    v_biases: Vec<Option<Array1<f32>>>,
}

impl Momentum {
    pub fn new(beta: f32) -> Self {
        Momentum {
            beta,
            v_weights: Vec::new(),
            v_biases: Vec::new(),
        }
    }

    fn ensure_slot(&mut self, layer_idx: usize) {
        while self.v_weights.len() <= layer_idx {
            self.v_weights.push(None);
            self.v_biases.push(None);
        }
    }
}

impl Default for Momentum {
    fn default() -> Self {
        Self::new(0.9)
    }
}

impl Optimizer for Momentum {
    fn step(
        &mut self,
        layer_idx: usize,
        weights: &mut Array2<f32>,
        biases: &mut Array1<f32>,
        weight_grads: &Array2<f32>,
        bias_grads: &Array1<f32>,
        learning_rate: f32,
    ) {
        self.ensure_slot(layer_idx);
        let beta = self.beta;

        let vw = self.v_weights[layer_idx]
            .get_or_insert_with(|| Array2::zeros(weights.dim()));
        vw.zip_mut_with(weight_grads, |v, &g| *v = *v * beta + g);
        weights.zip_mut_with(vw, |w, &v| *w -= learning_rate * v);

        let vb = self.v_biases[layer_idx]
            .get_or_insert_with(|| Array1::zeros(biases.dim()));
        vb.zip_mut_with(bias_grads, |v, &g| *v = *v * beta + g);
        biases.zip_mut_with(vb, |b, &v| *b -= learning_rate * v);
    }
}
