//! # Double DQN training
//!
//! Two twin value networks alternate roles after every epoch: the *primary*
//! model is updated by gradient descent and evaluates the value of the next
//! action, while the *secondary* model selects that action. Using separate
//! estimators for selection and evaluation reduces the maximization bias of
//! single-network Q-learning.
//!
//! The trainer is generic over [`ValueModel`], so any function approximator
//! exposing batched `predict` and `train_on_batch` can back it; the bundled
//! [`crate::network::NeuralNetwork`] is the default backend.

pub mod traits;

mod double_dqn;
pub use double_dqn::{ActionSelection, DoubleDqnTrainer, DoubleDqnTrainerBuilder, EnvSpec};
pub use traits::ValueModel;
