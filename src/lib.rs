//! # Twinq - Double Q-Learning with Twin Value Networks
//!
//! Twinq implements the Double DQN training update: two structurally
//! identical value networks alternate between the *primary* role (updated by
//! gradient descent, evaluates the selected next action) and the *secondary*
//! role (selects the next action) after every training epoch. De-correlating
//! selection from evaluation reduces the overestimation bias of plain
//! Q-learning.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use twinq::agent::{DoubleDqnTrainerBuilder, EnvSpec};
//! use twinq::metrics::TrainingMetrics;
//! use twinq::replay::{Experience, ReplayBuffer};
//! use ndarray::array;
//!
//! let spec = EnvSpec { state_dim: 4, action_dim: 2 };
//! let mut trainer = DoubleDqnTrainerBuilder::new()
//!     .env_spec(spec)
//!     .hidden_layers(&[64, 32])
//!     .learning_rate(0.02)
//!     .gamma(0.95)
//!     .batch_size(32)
//!     .n_epoch(2)
//!     .build()
//!     .unwrap();
//!
//! let mut replay = ReplayBuffer::new(10_000, 2);
//! replay.add(Experience {
//!     state: array![0.1, -0.2, 0.3, -0.1],
//!     action: 1,
//!     reward: 1.0,
//!     next_state: array![0.15, -0.25, 0.35, -0.05],
//!     done: false,
//! });
//!
//! let mut metrics = TrainingMetrics::new();
//! let avg_loss = trainer.train(&mut replay, &mut metrics).unwrap();
//! println!("avg loss: {avg_loss}");
//! ```
//!
//! ## Module Organization
//!
//! - [`agent`] - The Double DQN trainer, its builder, and the value-model trait
//! - [`error`] - Error types and result handling
//! - [`loss`] - Loss functions for training
//! - [`metrics`] - Training metrics accumulator
//! - [`network`] - Feed-forward value network
//! - [`optimizer`] - Optimization algorithms
//! - [`replay`] - Experience replay memory

pub mod agent;
pub mod error;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod replay;

#[cfg(test)]
mod tests;
