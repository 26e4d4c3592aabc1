use std::sync::{Arc, Mutex, atomic::AtomicBool, mpsc};

use ferrite_jobs::{DatasetRef, TaskEvent, TrainTask};

use crate::config::StudioConfig;

// ---------------------------------------------------------------------------
// Training status
// ---------------------------------------------------------------------------

pub enum TrainingStatus {
    /// Nothing is running. A task restored from disk may still be present.
    Idle,
    /// The synthetic backend is reporting into the task from a background thread.
    Running {
        stop_flag: Arc<AtomicBool>,
    },
    /// Training ended and the task record was written to `task_path`.
    /// `was_stopped` is true when the user stopped it early.
    Done {
        task_path:   String,
        was_stopped: bool,
    },
    /// Training failed with an error.
    Failed {
        reason: String,
    },
}

impl TrainingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TrainingStatus::Idle           => "idle",
            TrainingStatus::Running { .. } => "running",
            TrainingStatus::Done { .. }    => "done",
            TrainingStatus::Failed { .. }  => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// Main state struct
// ---------------------------------------------------------------------------

pub struct StudioState {
    pub config:   StudioConfig,
    /// The job's task, freshly created or restored from `config.task_path()`.
    pub task:     Option<TrainTask>,
    pub training: TrainingStatus,
    /// Updates emitted by the task; drained by the SSE handler.
    pub events:   Arc<Mutex<mpsc::Receiver<TaskEvent>>>,
    /// Sending half handed to every task as its notifier.
    pub events_tx: mpsc::Sender<TaskEvent>,
}

impl StudioState {
    pub fn new(config: StudioConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        StudioState {
            config,
            task:      None,
            training:  TrainingStatus::Idle,
            events:    Arc::new(Mutex::new(rx)),
            events_tx: tx,
        }
    }

    /// Dataset described by the config, if one is configured.
    pub fn dataset(&self) -> Option<DatasetRef> {
        let dir = self.config.dataset_dir.clone()?;
        let mut ds = DatasetRef::new(dir);
        ds.labels_file = self.config.labels_file.clone();
        Some(ds)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.training, TrainingStatus::Running { .. })
    }
}

/// Shared state type — an `Arc<Mutex<StudioState>>` passed to every handler.
pub type SharedState = Arc<Mutex<StudioState>>;
