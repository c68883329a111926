use ndarray::{Array1, Array2};
use proptest::prelude::*;

use twinq::agent::{ActionSelection, DoubleDqnTrainer, ValueModel};
use twinq::error::Result;
use twinq::metrics::TrainingMetrics;
use twinq::replay::{Minibatch, ReplayMemory};

/// Minimal scripted value model: fixed answers for the state batch and the
/// next-state batch, recorded targets, canned losses.
struct StubModel {
    states: Array2<f32>,
    on_states: Array2<f32>,
    on_next_states: Array2<f32>,
    losses: Vec<f32>,
    next_loss: usize,
    trained_targets: Vec<Array2<f32>>,
}

impl StubModel {
    fn new(states: Array2<f32>, on_states: Array2<f32>, on_next_states: Array2<f32>) -> Self {
        StubModel {
            states,
            on_states,
            on_next_states,
            losses: Vec::new(),
            next_loss: 0,
            trained_targets: Vec::new(),
        }
    }

    fn with_losses(mut self, losses: &[f32]) -> Self {
        self.losses = losses.to_vec();
        self
    }
}

impl ValueModel for StubModel {
    fn predict(&self, states: ndarray::ArrayView2<f32>) -> Array2<f32> {
        if states == self.states.view() {
            self.on_states.clone()
        } else {
            self.on_next_states.clone()
        }
    }

    fn train_on_batch(
        &mut self,
        _states: ndarray::ArrayView2<f32>,
        targets: ndarray::ArrayView2<f32>,
    ) -> Result<f32> {
        self.trained_targets.push(targets.to_owned());
        let loss = self.losses.get(self.next_loss).copied().unwrap_or(0.0);
        self.next_loss += 1;
        Ok(loss)
    }

    fn action_dim(&self) -> usize {
        self.on_states.ncols()
    }
}

struct StubReplay {
    batch: Minibatch,
}

impl ReplayMemory for StubReplay {
    fn rand_minibatch(&mut self, _batch_size: usize) -> Result<Minibatch> {
        Ok(self.batch.clone())
    }

    fn len(&self) -> usize {
        self.batch.len()
    }
}

/// Run one epoch on a single-row batch and return the target matrix the
/// primary model was trained on.
fn targets_for_single_row(
    action: usize,
    reward: f32,
    terminal: bool,
    gamma: f32,
    q_states: [f32; 2],
    q_next_eval: [f32; 2],
    q_next_select: [f32; 2],
) -> Array2<f32> {
    let states = Array2::from_shape_vec((1, 2), vec![0.1, 0.2]).unwrap();
    let mut actions = Array2::zeros((1, 2));
    actions[[0, action]] = 1.0;

    let batch = Minibatch {
        states: states.clone(),
        next_states: Array2::from_shape_vec((1, 2), vec![0.3, 0.4]).unwrap(),
        actions,
        rewards: Array1::from_vec(vec![reward]),
        terminals: Array1::from_vec(vec![if terminal { 1.0 } else { 0.0 }]),
    };

    let model_a = StubModel::new(
        states.clone(),
        Array2::from_shape_vec((1, 2), q_states.to_vec()).unwrap(),
        Array2::from_shape_vec((1, 2), q_next_eval.to_vec()).unwrap(),
    );
    let model_b = StubModel::new(
        states,
        Array2::zeros((1, 2)),
        Array2::from_shape_vec((1, 2), q_next_select.to_vec()).unwrap(),
    );

    let mut trainer =
        DoubleDqnTrainer::new(model_a, model_b, gamma, 1, 1, ActionSelection::BroadcastFirst);
    let mut metrics = TrainingMetrics::new();
    let mut replay = StubReplay { batch };
    trainer.train(&mut replay, &mut metrics).unwrap();

    trainer.secondary().trained_targets[0].clone()
}

proptest! {
    // Terminal transitions bootstrap nothing: the taken-action target is the
    // reward, bit for bit, whatever gamma is.
    #[test]
    fn terminal_target_equals_reward(
        gamma in 0.0f32..=1.0,
        reward in -100.0f32..100.0,
        action in 0usize..2,
        qn in -50.0f32..50.0,
    ) {
        let targets = targets_for_single_row(
            action, reward, true, gamma, [0.5, -0.5], [qn, qn], [1.0, 0.0],
        );
        prop_assert_eq!(targets[[0, action]], reward);
    }

    // Columns for actions not taken keep the primary's current estimates
    // exactly.
    #[test]
    fn untaken_columns_are_preserved(
        gamma in 0.0f32..=1.0,
        reward in -100.0f32..100.0,
        action in 0usize..2,
        terminal in any::<bool>(),
        q0 in -50.0f32..50.0,
        q1 in -50.0f32..50.0,
    ) {
        let targets = targets_for_single_row(
            action, reward, terminal, gamma, [q0, q1], [3.0, 4.0], [1.0, 0.0],
        );
        let other = 1 - action;
        let q_states = [q0, q1];
        prop_assert_eq!(targets[[0, other]], q_states[other]);
    }

    // The taken-action target follows the bootstrap formula with the value
    // of the action the secondary model selected.
    #[test]
    fn taken_column_matches_bootstrap_formula(
        gamma in 0.0f32..=1.0,
        reward in -10.0f32..10.0,
        action in 0usize..2,
        e0 in -10.0f32..10.0,
        e1 in -10.0f32..10.0,
        select_first in any::<bool>(),
    ) {
        let selection = if select_first { [1.0, 0.0] } else { [0.0, 1.0] };
        let selected = usize::from(!select_first);
        let targets = targets_for_single_row(
            action, reward, false, gamma, [0.0, 0.0], [e0, e1], selection,
        );
        let q_next_eval = [e0, e1];
        let expected = reward + gamma * q_next_eval[selected];
        prop_assert!((targets[[0, action]] - expected).abs() <= 1e-4);
    }

    // train() returns exactly total / n_epoch for any scripted loss
    // sequence.
    #[test]
    fn mean_loss_is_total_over_epochs(
        losses in prop::collection::vec(0.0f32..10.0, 1..=6),
    ) {
        let states = Array2::from_shape_vec((1, 2), vec![0.1, 0.2]).unwrap();
        let batch = Minibatch {
            states: states.clone(),
            next_states: Array2::from_shape_vec((1, 2), vec![0.3, 0.4]).unwrap(),
            actions: Array2::from_shape_vec((1, 2), vec![1.0, 0.0]).unwrap(),
            rewards: Array1::zeros(1),
            terminals: Array1::zeros(1),
        };

        // Epochs alternate models: A sees losses[0], losses[2], ...
        let a_losses: Vec<f32> = losses.iter().step_by(2).copied().collect();
        let b_losses: Vec<f32> = losses.iter().skip(1).step_by(2).copied().collect();

        let zeros = Array2::zeros((1, 2));
        let model_a = StubModel::new(states.clone(), zeros.clone(), zeros.clone())
            .with_losses(&a_losses);
        let model_b = StubModel::new(states, zeros.clone(), zeros)
            .with_losses(&b_losses);

        let n_epoch = losses.len();
        let mut trainer = DoubleDqnTrainer::new(
            model_a, model_b, 0.9, 1, n_epoch, ActionSelection::BroadcastFirst,
        );
        let mut metrics = TrainingMetrics::new();
        let mut replay = StubReplay { batch };

        let avg = trainer.train(&mut replay, &mut metrics).unwrap();
        let expected = losses.iter().sum::<f32>() / n_epoch as f32;
        prop_assert!((avg - expected).abs() <= 1e-5);
        prop_assert_eq!(metrics.latest_loss(), Some(avg));
    }
}
