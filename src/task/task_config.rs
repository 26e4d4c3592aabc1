use serde::{Serialize, Deserialize};

use crate::error::{Result, TaskError};

/// Optional knobs passed through to the training backend.
///
/// All fields are `Option<>` so records written without them deserialize
/// cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainOptions {
    /// Overrides any network-specific batch size.
    #[serde(default)]
    pub batch_size: Option<usize>,
    /// Epochs between validation passes.
    #[serde(default)]
    pub val_interval: Option<f64>,
    /// Model file to fine-tune from.
    #[serde(default)]
    pub pretrained_model: Option<String>,
    /// Square crop applied to every input image.
    #[serde(default)]
    pub crop_size: Option<u32>,
    /// Subtract the dataset's mean file.
    #[serde(default)]
    pub use_mean: Option<bool>,
}

/// Configuration for a training task.
///
/// # Fields
/// - `train_epochs`      — how many epochs to train for; must be positive
/// - `snapshot_interval` — epochs between checkpoints
/// - `learning_rate`     — base learning rate
/// - `lr_policy`         — learning-rate schedule options, stored as given
/// - `options`           — backend pass-through options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub train_epochs: f64,
    pub snapshot_interval: f64,
    pub learning_rate: f64,
    #[serde(default)]
    pub lr_policy: serde_json::Value,
    #[serde(default)]
    pub options: TrainOptions,
}

impl TaskConfig {
    /// Creates a config with a fixed learning-rate policy and no options.
    pub fn new(train_epochs: f64, snapshot_interval: f64, learning_rate: f64) -> Self {
        TaskConfig {
            train_epochs,
            snapshot_interval,
            learning_rate,
            lr_policy: serde_json::json!({ "policy": "fixed" }),
            options: TrainOptions::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.train_epochs > 0.0) {
            return Err(TaskError::InvalidConfig(format!(
                "train_epochs must be positive, got {}",
                self.train_epochs
            )));
        }
        if self.snapshot_interval < 0.0 {
            return Err(TaskError::InvalidConfig(format!(
                "snapshot_interval must not be negative, got {}",
                self.snapshot_interval
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_epochs() {
        assert!(TaskConfig::new(10.0, 1.0, 0.01).validate().is_ok());
        assert!(matches!(
            TaskConfig::new(0.0, 1.0, 0.01).validate(),
            Err(TaskError::InvalidConfig(_))
        ));
        assert!(matches!(
            TaskConfig::new(-3.0, 1.0, 0.01).validate(),
            Err(TaskError::InvalidConfig(_))
        ));
        assert!(TaskConfig::new(f64::NAN, 1.0, 0.01).validate().is_err());
    }

    #[test]
    fn rejects_negative_snapshot_interval() {
        assert!(TaskConfig::new(10.0, -1.0, 0.01).validate().is_err());
    }
}
