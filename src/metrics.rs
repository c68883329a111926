//! Training metrics accumulator.
//!
//! The trainer appends one averaged loss per `train` call; callers own the
//! accumulator and pass it in by reference, so there is no shared global
//! metric state anywhere in the crate.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Loss history across `train` calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// One mean loss per `train` call, in order.
    pub losses: Vec<f32>,
}

impl TrainingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a loss value.
    pub fn record_loss(&mut self, loss: f32) {
        self.losses.push(loss);
    }

    /// The most recently recorded loss.
    pub fn latest_loss(&self) -> Option<f32> {
        self.losses.last().copied()
    }

    /// Mean of the last `window` losses.
    pub fn avg_loss(&self, window: usize) -> Option<f32> {
        if self.losses.is_empty() {
            return None;
        }
        let n = window.min(self.losses.len());
        let sum: f32 = self.losses.iter().rev().take(n).sum();
        Some(sum / n as f32)
    }

    /// Write the metrics as JSON.
    pub fn save(&self, path: &str) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load metrics previously written by [`TrainingMetrics::save`].
    pub fn load(path: &str) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let metrics = serde_json::from_str(&data)?;
        Ok(metrics)
    }
}
