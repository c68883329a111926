use ndarray::{Array2, ArrayView2};

use crate::error::Result;
use crate::network::NeuralNetwork;

/// Capability contract for a value-function approximator.
///
/// A value model maps a batch of state rows to a `(batch, action_dim)`
/// matrix of per-action value estimates and takes in-place gradient steps
/// toward a target matrix. Any numerics backend satisfying this contract
/// can back [`crate::agent::DoubleDqnTrainer`].
pub trait ValueModel {
    /// Value estimates for a batch of states, shape `(batch, action_dim)`.
    fn predict(&self, states: ArrayView2<f32>) -> Array2<f32>;

    /// One gradient step toward `targets`; returns the training loss.
    fn train_on_batch(
        &mut self,
        states: ArrayView2<f32>,
        targets: ArrayView2<f32>,
    ) -> Result<f32>;

    /// Width of the value matrix (number of discrete actions).
    fn action_dim(&self) -> usize;
}

impl ValueModel for NeuralNetwork {
    fn predict(&self, states: ArrayView2<f32>) -> Array2<f32> {
        NeuralNetwork::predict(self, states)
    }

    fn train_on_batch(
        &mut self,
        states: ArrayView2<f32>,
        targets: ArrayView2<f32>,
    ) -> Result<f32> {
        NeuralNetwork::train_on_batch(self, states, targets)
    }

    fn action_dim(&self) -> usize {
        self.output_dim()
    }
}
