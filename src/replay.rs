//! Experience replay memory.
//!
//! Transitions are stored individually and stacked into an aligned
//! [`Minibatch`] at sampling time, with actions one-hot encoded to the width
//! of the action space.

use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::collections::VecDeque;

use crate::error::{Result, TwinqError};

/// A single stored transition.
#[derive(Clone, Debug, PartialEq)]
pub struct Experience {
    pub state: Array1<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub done: bool,
}

/// A sampled batch with aligned rows.
///
/// `actions` is one-hot encoded with shape `(batch, action_dim)`;
/// `terminals` holds `1.0` for rows whose next state ended the episode.
#[derive(Clone, Debug)]
pub struct Minibatch {
    pub states: Array2<f32>,
    pub next_states: Array2<f32>,
    pub actions: Array2<f32>,
    pub rewards: Array1<f32>,
    pub terminals: Array1<f32>,
}

impl Minibatch {
    /// Stack transitions into an aligned batch.
    pub fn from_experiences(experiences: &[&Experience], action_dim: usize) -> Result<Self> {
        if experiences.is_empty() {
            return Err(TwinqError::EmptyBuffer(
                "cannot build a minibatch from zero experiences".to_string(),
            ));
        }

        let batch_size = experiences.len();
        let state_dim = experiences[0].state.len();

        let mut states = Array2::zeros((batch_size, state_dim));
        let mut next_states = Array2::zeros((batch_size, state_dim));
        let mut actions = Array2::zeros((batch_size, action_dim));
        let mut rewards = Array1::zeros(batch_size);
        let mut terminals = Array1::zeros(batch_size);

        for (i, exp) in experiences.iter().enumerate() {
            if exp.state.len() != state_dim || exp.next_state.len() != state_dim {
                return Err(TwinqError::dimension_mismatch(
                    format!("state rows of length {}", state_dim),
                    format!(
                        "lengths {} and {}",
                        exp.state.len(),
                        exp.next_state.len()
                    ),
                ));
            }
            if exp.action >= action_dim {
                return Err(TwinqError::invalid_parameter(
                    "action".to_string(),
                    format!("index {} out of range for {} actions", exp.action, action_dim),
                ));
            }

            states.row_mut(i).assign(&exp.state);
            next_states.row_mut(i).assign(&exp.next_state);
            actions[[i, exp.action]] = 1.0;
            rewards[i] = exp.reward;
            terminals[i] = if exp.done { 1.0 } else { 0.0 };
        }

        Ok(Minibatch {
            states,
            next_states,
            actions,
            rewards,
            terminals,
        })
    }

    pub fn len(&self) -> usize {
        self.states.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of random minibatches for training.
///
/// The sampling policy (with or without replacement, prioritization) is the
/// implementation's choice.
pub trait ReplayMemory {
    fn rand_minibatch(&mut self, batch_size: usize) -> Result<Minibatch>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fixed-capacity ring buffer sampling uniformly without replacement.
#[derive(Clone)]
pub struct ReplayBuffer {
    buffer: VecDeque<Experience>,
    capacity: usize,
    action_dim: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize, action_dim: usize) -> Self {
        ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            action_dim,
        }
    }

    /// Append a transition, evicting the oldest when full.
    pub fn add(&mut self, experience: Experience) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(experience);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }
}

impl ReplayMemory for ReplayBuffer {
    /// Sample up to `batch_size` distinct transitions.
    fn rand_minibatch(&mut self, batch_size: usize) -> Result<Minibatch> {
        if self.buffer.is_empty() {
            return Err(TwinqError::EmptyBuffer(
                "no experiences to sample from".to_string(),
            ));
        }

        let mut rng = thread_rng();
        let mut indices = (0..self.buffer.len()).collect::<Vec<usize>>();
        indices.shuffle(&mut rng);
        indices.truncate(batch_size);

        let sampled = indices
            .into_iter()
            .map(|i| &self.buffer[i])
            .collect::<Vec<_>>();
        Minibatch::from_experiences(&sampled, self.action_dim)
    }

    fn len(&self) -> usize {
        self.buffer.len()
    }
}
