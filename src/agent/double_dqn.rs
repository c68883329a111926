use log::{debug, info};
use ndarray::{Array1, Array2, Axis};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::agent::ValueModel;
use crate::error::{Result, TwinqError};
use crate::metrics::TrainingMetrics;
use crate::network::{Activation, NeuralNetwork};
use crate::optimizer::{OptimizerWrapper, Sgd};
use crate::replay::{Minibatch, ReplayMemory};

/// Interface description of the environment the agent acts in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvSpec {
    pub state_dim: usize,
    pub action_dim: usize,
}

/// How the next-state action is taken from the secondary model's argmax.
///
/// `BroadcastFirst` reproduces the historical behavior: whenever the batch
/// has more than one row, the per-row argmax vector is collapsed to its
/// first entry and that single action index is evaluated for every row.
/// This discards per-example action selection on batches whose optimal
/// actions diverge. `PerRow` keeps one selected index per row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionSelection {
    BroadcastFirst,
    PerRow,
}

/// Double DQN trainer over two twin value models.
///
/// The two models live in fixed slots; which slot is primary oscillates
/// after every epoch, so the swap is a label reassignment and never copies
/// weights. Slot 0 (model A) starts primary.
///
/// # Example
///
/// ```rust,no_run
/// use twinq::agent::{DoubleDqnTrainerBuilder, EnvSpec};
/// use twinq::metrics::TrainingMetrics;
/// use twinq::replay::ReplayBuffer;
///
/// let mut trainer = DoubleDqnTrainerBuilder::new()
///     .env_spec(EnvSpec { state_dim: 4, action_dim: 2 })
///     .learning_rate(0.02)
///     .build()
///     .unwrap();
///
/// let mut replay = ReplayBuffer::new(10_000, 2);
/// let mut metrics = TrainingMetrics::new();
/// // ... fill the replay buffer, then:
/// let avg_loss = trainer.train(&mut replay, &mut metrics).unwrap();
/// ```
#[derive(Serialize, Deserialize)]
pub struct DoubleDqnTrainer<M> {
    models: [M; 2],

    /// Slot index of the current primary model.
    primary: usize,

    /// Discount factor for bootstrapped future value.
    pub gamma: f32,

    /// Rows sampled from replay per epoch.
    pub batch_size: usize,

    /// Gradient steps per `train` call.
    pub n_epoch: usize,

    pub action_selection: ActionSelection,

    /// Total epochs executed over the trainer's lifetime.
    pub train_steps: usize,
}

impl<M: ValueModel> DoubleDqnTrainer<M> {
    /// Assemble a trainer from two independently initialized models of
    /// identical architecture. Model A starts as the primary.
    pub fn new(
        model_a: M,
        model_b: M,
        gamma: f32,
        batch_size: usize,
        n_epoch: usize,
        action_selection: ActionSelection,
    ) -> Self {
        DoubleDqnTrainer {
            models: [model_a, model_b],
            primary: 0,
            gamma,
            batch_size,
            n_epoch,
            action_selection,
            train_steps: 0,
        }
    }

    /// The model currently holding the primary role.
    pub fn primary(&self) -> &M {
        &self.models[self.primary]
    }

    /// The model currently holding the secondary role.
    pub fn secondary(&self) -> &M {
        &self.models[1 - self.primary]
    }

    /// Slot index (0 = model A, 1 = model B) of the current primary.
    pub fn primary_index(&self) -> usize {
        self.primary
    }

    /// Run `n_epoch` update steps, each on a fresh minibatch, and return the
    /// mean loss across epochs. The mean is also appended to `metrics`.
    ///
    /// Errors from the replay memory or the models propagate unmodified.
    pub fn train<R: ReplayMemory>(
        &mut self,
        replay: &mut R,
        metrics: &mut TrainingMetrics,
    ) -> Result<f32> {
        let mut loss_total = 0.0;
        for epoch in 0..self.n_epoch {
            let batch = replay.rand_minibatch(self.batch_size)?;
            let loss = self.train_epoch(&batch)?;
            debug!("epoch {}: loss {}", epoch, loss);
            loss_total += loss;
        }

        let avg_loss = loss_total / self.n_epoch as f32;
        metrics.record_loss(avg_loss);
        Ok(avg_loss)
    }

    /// One update step: build Double Q-learning targets from the batch,
    /// take a gradient step on the primary model, then swap roles.
    fn train_epoch(&mut self, batch: &Minibatch) -> Result<f32> {
        let (primary, secondary) = (self.primary, 1 - self.primary);

        // Current value estimates for the sampled states.
        let q_states = self.models[primary].predict(batch.states.view());

        // Select the next action with the secondary model.
        let q_next_select = self.models[secondary].predict(batch.next_states.view());
        let mut selected = argmax_rows(&q_next_select);
        if self.action_selection == ActionSelection::BroadcastFirst && selected.len() > 1 {
            let first = selected[0];
            for slot in selected.iter_mut() {
                *slot = first;
            }
        }

        // Evaluate the selected action with the primary model.
        let q_next_eval = self.models[primary].predict(batch.next_states.view());
        let q_next_max =
            Array1::from_shape_fn(selected.len(), |i| q_next_eval[[i, selected[i]]]);

        // target = reward + gamma * (1 - terminal) * Q_next_max; terminal
        // rows carry no future value.
        let future = batch.terminals.mapv(|t| 1.0 - t) * &q_next_max * self.gamma;
        let targets = &batch.rewards + &future;

        // Substitute the target into the taken action's column only; the
        // other columns keep the current estimates, so no gradient flows
        // through them.
        let taken = &batch.actions * &targets.view().insert_axis(Axis(1));
        let kept = batch.actions.mapv(|a| 1.0 - a) * &q_states;
        let q_targets = taken + kept;

        let loss = self.models[primary].train_on_batch(batch.states.view(), q_targets.view())?;

        self.train_steps += 1;
        self.primary = 1 - self.primary;
        Ok(loss)
    }
}

impl<M: ValueModel + Serialize + DeserializeOwned> DoubleDqnTrainer<M> {
    /// Serialize the trainer, including both models, to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load a trainer previously written by [`DoubleDqnTrainer::save`].
    pub fn load(path: &str) -> Result<Self> {
        let data = std::fs::read(path)?;
        let trainer = bincode::deserialize(&data)?;
        Ok(trainer)
    }
}

/// First index of the maximum in each row.
fn argmax_rows(values: &Array2<f32>) -> Vec<usize> {
    values
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = 0;
            let mut best_value = f32::NEG_INFINITY;
            for (idx, &value) in row.iter().enumerate() {
                if value > best_value {
                    best = idx;
                    best_value = value;
                }
            }
            best
        })
        .collect()
}

/// Builder for a [`DoubleDqnTrainer`] backed by twin [`NeuralNetwork`]s.
///
/// The two networks are configuration-cloned: identical layer sizes,
/// activations, optimizer, and learning rate, but independent weight
/// initializations.
pub struct DoubleDqnTrainerBuilder {
    env_spec: Option<EnvSpec>,
    hidden_layers: Vec<usize>,
    learning_rate: f32,
    gamma: f32,
    batch_size: usize,
    n_epoch: usize,
    action_selection: ActionSelection,
    optimizer: OptimizerWrapper,
}

impl DoubleDqnTrainerBuilder {
    pub fn new() -> Self {
        DoubleDqnTrainerBuilder {
            env_spec: None,
            hidden_layers: vec![128, 64],
            learning_rate: 0.02,
            gamma: 0.95,
            batch_size: 32,
            n_epoch: 1,
            action_selection: ActionSelection::BroadcastFirst,
            optimizer: OptimizerWrapper::Sgd(Sgd::new()),
        }
    }

    pub fn env_spec(mut self, spec: EnvSpec) -> Self {
        self.env_spec = Some(spec);
        self
    }

    pub fn hidden_layers(mut self, sizes: &[usize]) -> Self {
        self.hidden_layers = sizes.to_vec();
        self
    }

    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn n_epoch(mut self, n_epoch: usize) -> Self {
        self.n_epoch = n_epoch;
        self
    }

    pub fn action_selection(mut self, selection: ActionSelection) -> Self {
        self.action_selection = selection;
        self
    }

    pub fn optimizer(mut self, optimizer: OptimizerWrapper) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn build(self) -> Result<DoubleDqnTrainer<NeuralNetwork>> {
        let spec = self.env_spec.ok_or_else(|| TwinqError::InvalidParameter {
            name: "env_spec".to_string(),
            reason: "Environment spec must be specified".to_string(),
        })?;

        if spec.state_dim == 0 || spec.action_dim == 0 {
            return Err(TwinqError::InvalidParameter {
                name: "env_spec".to_string(),
                reason: "State and action dimensions must be greater than 0".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(TwinqError::InvalidParameter {
                name: "gamma".to_string(),
                reason: "Discount factor must be within [0, 1]".to_string(),
            });
        }
        if self.learning_rate <= 0.0 {
            return Err(TwinqError::InvalidParameter {
                name: "learning_rate".to_string(),
                reason: "Learning rate must be positive".to_string(),
            });
        }
        if self.batch_size == 0 {
            return Err(TwinqError::InvalidParameter {
                name: "batch_size".to_string(),
                reason: "Batch size must be greater than 0".to_string(),
            });
        }
        if self.n_epoch == 0 {
            return Err(TwinqError::InvalidParameter {
                name: "n_epoch".to_string(),
                reason: "Epoch count must be greater than 0".to_string(),
            });
        }

        let mut layer_sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        layer_sizes.push(spec.state_dim);
        layer_sizes.extend_from_slice(&self.hidden_layers);
        layer_sizes.push(spec.action_dim);

        let mut activations = vec![Activation::Relu; self.hidden_layers.len()];
        activations.push(Activation::Linear);

        let model_a = NeuralNetwork::new(
            &layer_sizes,
            &activations,
            self.optimizer.clone(),
            self.learning_rate,
        );
        info!("model A built, layer sizes {:?}", layer_sizes);
        let model_b = NeuralNetwork::new(
            &layer_sizes,
            &activations,
            self.optimizer,
            self.learning_rate,
        );
        info!("model B built, layer sizes {:?}", layer_sizes);

        Ok(DoubleDqnTrainer::new(
            model_a,
            model_b,
            self.gamma,
            self.batch_size,
            self.n_epoch,
            self.action_selection,
        ))
    }
}

impl Default for DoubleDqnTrainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
