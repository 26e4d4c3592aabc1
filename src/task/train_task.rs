use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::{Result, TaskError};
use crate::graph::{self, GraphData};
use crate::notify::{Notifier, NullNotifier, TaskUpdate};
use crate::persist::{self, TaskRecord, CURRENT_VERSION};
use crate::series::SeriesTable;
use crate::task::backend::{BaseBackend, TrainBackend};
use crate::task::dataset::DatasetRef;
use crate::task::snapshot::{format_epoch, Snapshot, SnapshotChoice};
use crate::task::task_config::TaskConfig;
use crate::util::print_time_diff;

/// Minimum gap between two live graph pushes driven by training output.
pub const TRAIN_UPDATE_INTERVAL: Duration = Duration::from_secs(5);

/// A training job's metric history and progress.
///
/// The training backend drives it with [`advance_epoch`](Self::advance_epoch)
/// and the `record_*_output` methods; the web layer reads graph payloads
/// back out and receives pushes through the configured [`Notifier`].
pub struct TrainTask {
    pub job_id: String,
    pub task_id: String,
    /// Directory holding this job's files (task record, snapshots).
    pub job_dir: PathBuf,
    pub config: TaskConfig,
    pub current_epoch: f64,
    /// Fraction of `train_epochs` completed.
    pub progress: f64,
    pub train_outputs: SeriesTable,
    pub val_outputs: SeriesTable,
    /// Checkpoints found on disk, oldest first. Rebuilt on load.
    pub snapshots: Vec<Snapshot>,
    /// Reattached by the owner after load; never persisted.
    pub dataset: Option<DatasetRef>,
    labels: Option<Vec<String>>,
    last_train_update: Option<Instant>,
    push_interval: Duration,
    /// Wall-clock time and progress when timing started, for the ETA.
    timing_origin: Option<(Instant, f64)>,
    backend: Box<dyn TrainBackend>,
    notifier: Box<dyn Notifier + Send>,
}

impl TrainTask {
    /// Creates a fresh task. Fails if the config is invalid.
    pub fn new(
        job_id: impl Into<String>,
        task_id: impl Into<String>,
        job_dir: impl Into<PathBuf>,
        config: TaskConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(TrainTask {
            job_id: job_id.into(),
            task_id: task_id.into(),
            job_dir: job_dir.into(),
            config,
            current_epoch: 0.0,
            progress: 0.0,
            train_outputs: SeriesTable::new(),
            val_outputs: SeriesTable::new(),
            snapshots: Vec::new(),
            dataset: None,
            labels: None,
            last_train_update: None,
            push_interval: TRAIN_UPDATE_INTERVAL,
            timing_origin: Some((Instant::now(), 0.0)),
            backend: Box::new(BaseBackend),
            notifier: Box::new(NullNotifier),
        })
    }

    pub fn with_backend<B: TrainBackend + 'static>(mut self, backend: B) -> Self {
        self.backend = Box::new(backend);
        self
    }

    pub fn with_notifier<N: Notifier + Send + 'static>(mut self, notifier: N) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_dataset(mut self, dataset: DatasetRef) -> Self {
        self.attach_dataset(dataset);
        self
    }

    /// Overrides [`TRAIN_UPDATE_INTERVAL`] for this task.
    pub fn with_push_interval(mut self, interval: Duration) -> Self {
        self.push_interval = interval;
        self
    }

    /// Attaches the dataset; any cached labels are dropped.
    pub fn attach_dataset(&mut self, dataset: DatasetRef) {
        self.dataset = Some(dataset);
        self.labels = None;
    }

    pub fn set_notifier<N: Notifier + Send + 'static>(&mut self, notifier: N) {
        self.notifier = Box::new(notifier);
    }

    /// Identifier used by the browser to address this task's widgets.
    pub fn html_id(&self) -> String {
        format!("task-{}", self.task_id)
    }

    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    /// Records one training metric for the current epoch.
    ///
    /// When the epoch row becomes complete the combined and learning-rate
    /// graphs are pushed, at most once per push interval. The value is
    /// stored regardless of throttling.
    pub fn record_train_output(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        value: f64,
    ) -> Result<bool> {
        let complete = self.train_outputs.append(name, kind, value, self.current_epoch)?;
        if !complete {
            return Ok(false);
        }

        if let Some(last) = self.last_train_update {
            if last.elapsed() < self.push_interval {
                debug!("{}: train graph push throttled", self.html_id());
                return Ok(true);
            }
        }
        self.last_train_update = Some(Instant::now());

        if let Some(data) = self.combined_graph_data() {
            self.emit(TaskUpdate::CombinedGraph { task: self.html_id(), data });
        }
        if let Some(data) = self.lr_graph_data() {
            self.emit(TaskUpdate::LrGraph { task: self.html_id(), data });
        }
        Ok(true)
    }

    /// Records one validation metric for the current epoch, pushing the
    /// combined graph whenever the row completes.
    pub fn record_val_output(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        value: f64,
    ) -> Result<bool> {
        let complete = self.val_outputs.append(name, kind, value, self.current_epoch)?;
        if complete {
            if let Some(data) = self.combined_graph_data() {
                self.emit(TaskUpdate::CombinedGraph { task: self.html_id(), data });
            }
        }
        Ok(complete)
    }

    /// Moves the task to `epoch` and pushes a progress update.
    /// Reporting the epoch the task is already at does nothing.
    pub fn advance_epoch(&mut self, epoch: f64) -> Result<()> {
        if epoch == self.current_epoch {
            return Ok(());
        }
        if !(self.config.train_epochs > 0.0) {
            return Err(TaskError::InvalidConfig(format!(
                "train_epochs must be positive, got {}",
                self.config.train_epochs
            )));
        }
        if epoch < self.current_epoch {
            warn!("{}: epoch moved backwards from {} to {}", self.html_id(), self.current_epoch, epoch);
        }

        if self.timing_origin.is_none() {
            self.timing_origin = Some((Instant::now(), self.progress));
        }
        self.current_epoch = epoch;
        self.progress = epoch / self.config.train_epochs;

        let percentage = (100.0 * self.progress).round().max(0.0) as u32;
        let eta = print_time_diff(self.est_done());
        self.emit(TaskUpdate::Progress { task: self.html_id(), percentage, eta });
        Ok(())
    }

    /// Estimated time until training finishes, from the rate of progress
    /// since timing started. `None` until some progress has been observed.
    pub fn est_done(&self) -> Option<Duration> {
        let (started, start_progress) = self.timing_origin?;
        let done = self.progress - start_progress;
        if done <= 0.0 {
            return None;
        }
        let remaining = (1.0 - self.progress).max(0.0);
        Duration::try_from_secs_f64(started.elapsed().as_secs_f64() * remaining / done).ok()
    }

    fn emit(&self, update: TaskUpdate) {
        self.notifier.emit(&self.job_id, update);
    }

    // -----------------------------------------------------------------------
    // Graph payloads
    // -----------------------------------------------------------------------

    pub fn loss_graph_data(&self) -> Option<GraphData> {
        graph::loss_graph(&self.train_outputs, &self.val_outputs)
    }

    pub fn accuracy_graph_data(&self) -> Option<GraphData> {
        graph::accuracy_graph(&self.train_outputs, &self.val_outputs)
    }

    pub fn combined_graph_data(&self) -> Option<GraphData> {
        graph::combined_graph(&self.train_outputs, &self.val_outputs)
    }

    pub fn lr_graph_data(&self) -> Option<GraphData> {
        graph::lr_graph(&self.train_outputs)
    }

    // -----------------------------------------------------------------------
    // Snapshots and backend capabilities
    // -----------------------------------------------------------------------

    /// Refreshes `snapshots` from disk. Returns `true` if any were found.
    pub fn detect_snapshots(&mut self) -> Result<bool> {
        self.snapshots = self.backend.detect_snapshots(&self.job_dir)?;
        Ok(!self.snapshots.is_empty())
    }

    /// Snapshot picker entries, newest first.
    pub fn snapshot_list(&self) -> Vec<SnapshotChoice> {
        self.snapshots
            .iter()
            .rev()
            .map(|s| SnapshotChoice {
                epoch: s.epoch,
                label: format!("Epoch #{}", format_epoch(s.epoch)),
            })
            .collect()
    }

    pub fn est_next_snapshot(&self) -> Option<Duration> {
        self.backend.est_next_snapshot(self.current_epoch, self.config.snapshot_interval)
    }

    pub fn can_view_weights(&self) -> Result<bool> {
        self.backend.can_view_weights()
    }

    pub fn can_infer_one(&self) -> Result<bool> {
        self.backend.can_infer_one()
    }

    pub fn can_view_activations(&self) -> Result<bool> {
        self.backend.can_view_activations()
    }

    pub fn can_infer_many(&self) -> Result<bool> {
        self.backend.can_infer_many()
    }

    pub fn view_weights(
        &self,
        model_epoch: Option<f64>,
        layers: Option<&[String]>,
    ) -> Result<Option<serde_json::Value>> {
        self.backend.view_weights(model_epoch, layers)
    }

    pub fn infer_one(
        &self,
        input: &serde_json::Value,
        model_epoch: Option<f64>,
        layers: Option<&[String]>,
    ) -> Result<Option<serde_json::Value>> {
        self.backend.infer_one(input, model_epoch, layers)
    }

    pub fn infer_many(
        &self,
        inputs: &[serde_json::Value],
        model_epoch: Option<f64>,
    ) -> Result<Option<serde_json::Value>> {
        self.backend.infer_many(inputs, model_epoch)
    }

    // -----------------------------------------------------------------------
    // Labels
    // -----------------------------------------------------------------------

    /// Class labels from the dataset's label file, one per non-empty line.
    /// Read once and cached.
    pub fn get_labels(&mut self) -> Result<&[String]> {
        if self.labels.as_ref().map_or(true, |l| l.is_empty()) {
            let labels = self.read_labels()?;
            self.labels = Some(labels);
        }
        Ok(self.labels.as_deref().unwrap_or(&[]))
    }

    fn read_labels(&self) -> Result<Vec<String>> {
        let dataset = self.dataset.as_ref()
            .ok_or_else(|| TaskError::Precondition("no dataset attached".into()))?;
        let file = dataset.labels_file.as_deref()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| TaskError::Precondition("labels_file not set".into()))?;
        let path = dataset.path(file);
        if !path.exists() {
            return Err(TaskError::Precondition(format!(
                "labels_file does not exist: {}",
                path.display()
            )));
        }

        let labels: Vec<String> = std::fs::read_to_string(&path)?
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect();
        if labels.is_empty() {
            return Err(TaskError::Precondition("no labels in labels_file".into()));
        }
        Ok(labels)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// The persisted subset of this task.
    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            version: CURRENT_VERSION,
            job_id: self.job_id.clone(),
            task_id: self.task_id.clone(),
            job_dir: self.job_dir.clone(),
            config: self.config.clone(),
            current_epoch: self.current_epoch,
            progress: self.progress,
            train_outputs: self.train_outputs.clone(),
            val_outputs: self.val_outputs.clone(),
        }
    }

    /// Rebuilds a task from its record and rescans snapshots with `backend`.
    /// The dataset must be reattached by the caller.
    pub fn from_record<B: TrainBackend + 'static>(record: TaskRecord, backend: B) -> Result<Self> {
        record.config.validate()?;
        let mut task = TrainTask {
            job_id: record.job_id,
            task_id: record.task_id,
            job_dir: record.job_dir,
            config: record.config,
            current_epoch: record.current_epoch,
            progress: record.progress,
            train_outputs: record.train_outputs,
            val_outputs: record.val_outputs,
            snapshots: Vec::new(),
            dataset: None,
            labels: None,
            last_train_update: None,
            push_interval: TRAIN_UPDATE_INTERVAL,
            timing_origin: None,
            backend: Box::new(backend),
            notifier: Box::new(NullNotifier),
        };
        task.detect_snapshots()?;
        Ok(task)
    }

    /// Serializes the task record to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.to_record())?;
        Ok(())
    }

    /// Loads a task written by `save_json`, upgrading older records.
    pub fn load_json<B: TrainBackend + 'static>(path: impl AsRef<Path>, backend: B) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let reader = std::io::BufReader::new(file);
        let raw: serde_json::Value = serde_json::from_reader(reader)?;
        let record: TaskRecord = serde_json::from_value(persist::upgrade(raw)?)?;
        let task = Self::from_record(record, backend)?;
        info!(
            "loaded {} at epoch {} ({} snapshot(s))",
            task.html_id(),
            format_epoch(task.current_epoch),
            task.snapshots.len()
        );
        Ok(task)
    }
}

impl fmt::Debug for TrainTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainTask")
            .field("job_id", &self.job_id)
            .field("task_id", &self.task_id)
            .field("job_dir", &self.job_dir)
            .field("current_epoch", &self.current_epoch)
            .field("progress", &self.progress)
            .field("train_series", &self.train_outputs.len())
            .field("val_series", &self.val_outputs.len())
            .field("snapshots", &self.snapshots.len())
            .finish_non_exhaustive()
    }
}
