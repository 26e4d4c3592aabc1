use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;

use crate::error::{Result, TaskError};
use crate::task::snapshot::{format_epoch, Snapshot};

/// What a training backend offers beyond the metrics it reports.
///
/// Capability queries have no sensible answer in general, so the defaults
/// fail with `NotImplemented`; the operations themselves default to
/// "unsupported" (`Ok(None)`).
pub trait TrainBackend: Send {
    /// Lists the checkpoints present under `job_dir`, oldest first.
    fn detect_snapshots(&self, _job_dir: &Path) -> Result<Vec<Snapshot>> {
        Ok(Vec::new())
    }

    /// Time until the next checkpoint, if the backend can tell.
    fn est_next_snapshot(&self, _current_epoch: f64, _snapshot_interval: f64) -> Option<Duration> {
        None
    }

    fn can_view_weights(&self) -> Result<bool> {
        Err(TaskError::NotImplemented("can_view_weights"))
    }

    fn view_weights(
        &self,
        _model_epoch: Option<f64>,
        _layers: Option<&[String]>,
    ) -> Result<Option<serde_json::Value>> {
        Ok(None)
    }

    fn can_infer_one(&self) -> Result<bool> {
        Err(TaskError::NotImplemented("can_infer_one"))
    }

    fn can_view_activations(&self) -> Result<bool> {
        Err(TaskError::NotImplemented("can_view_activations"))
    }

    fn infer_one(
        &self,
        _input: &serde_json::Value,
        _model_epoch: Option<f64>,
        _layers: Option<&[String]>,
    ) -> Result<Option<serde_json::Value>> {
        Ok(None)
    }

    fn can_infer_many(&self) -> Result<bool> {
        Err(TaskError::NotImplemented("can_infer_many"))
    }

    fn infer_many(
        &self,
        _inputs: &[serde_json::Value],
        _model_epoch: Option<f64>,
    ) -> Result<Option<serde_json::Value>> {
        Ok(None)
    }
}

/// Backend with no capabilities of its own. Finds no snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseBackend;

impl TrainBackend for BaseBackend {}

// ---------------------------------------------------------------------------
// FileSnapshotBackend
// ---------------------------------------------------------------------------

const SNAPSHOT_PREFIX: &str = "snapshot_epoch_";
const SNAPSHOT_SUFFIX: &str = ".json";

/// Backend whose checkpoints are `snapshot_epoch_<N>.json` files in the job
/// directory. It cannot visualise or run models.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSnapshotBackend;

impl FileSnapshotBackend {
    /// Where the checkpoint for `epoch` lives.
    pub fn snapshot_path(job_dir: &Path, epoch: f64) -> PathBuf {
        job_dir.join(format!("{}{}{}", SNAPSHOT_PREFIX, format_epoch(epoch), SNAPSHOT_SUFFIX))
    }

    fn parse_epoch(file_name: &str) -> Option<f64> {
        file_name
            .strip_prefix(SNAPSHOT_PREFIX)
            .and_then(|s| s.strip_suffix(SNAPSHOT_SUFFIX))
            .and_then(|s| s.parse::<f64>().ok())
    }
}

impl TrainBackend for FileSnapshotBackend {
    fn detect_snapshots(&self, job_dir: &Path) -> Result<Vec<Snapshot>> {
        let entries = match std::fs::read_dir(job_dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut snapshots = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(epoch) = name.to_str().and_then(Self::parse_epoch) {
                snapshots.push(Snapshot { path: entry.path(), epoch });
            }
        }
        snapshots.sort_by(|a, b| a.epoch.total_cmp(&b.epoch));
        debug!("found {} snapshot(s) in {}", snapshots.len(), job_dir.display());
        Ok(snapshots)
    }

    fn can_view_weights(&self) -> Result<bool> { Ok(false) }
    fn can_infer_one(&self) -> Result<bool> { Ok(false) }
    fn can_view_activations(&self) -> Result<bool> { Ok(false) }
    fn can_infer_many(&self) -> Result<bool> { Ok(false) }
}
