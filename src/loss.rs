//! Loss functions for training.
//!
//! Only mean squared error is compiled into the value networks; the training
//! targets are dense value matrices, so MSE over every output unit is the
//! right objective.

use ndarray::{Array2, ArrayView2};

/// Mean squared error over a batch of predictions, averaged over every
/// element of the `(batch, outputs)` matrix.
pub fn mse(predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32 {
    let diff = &predictions - &targets;
    let n = (predictions.nrows() * predictions.ncols()).max(1) as f32;
    (&diff * &diff).sum() / n
}

/// Gradient of the squared-error objective with respect to the predictions.
///
/// The raw residual `predictions - targets` is used, matching the scaling
/// the optimizers expect; the constant factor folds into the learning rate.
pub fn mse_grad(predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> Array2<f32> {
    &predictions - &targets
}
