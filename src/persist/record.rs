use std::path::PathBuf;

use serde::{Serialize, Deserialize};

use crate::series::SeriesTable;
use crate::task::task_config::TaskConfig;

/// The persisted form of a training task.
///
/// Runtime-only state (dataset, snapshots, label cache, push throttle,
/// notifier and backend) is not persisted and is rebuilt after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Schema version; see `persist::migrate`.
    pub version: u32,
    pub job_id: String,
    pub task_id: String,
    pub job_dir: PathBuf,
    #[serde(flatten)]
    pub config: TaskConfig,
    #[serde(default)]
    pub current_epoch: f64,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub train_outputs: SeriesTable,
    #[serde(default)]
    pub val_outputs: SeriesTable,
}
