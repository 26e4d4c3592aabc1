use std::path::PathBuf;

use serde::Serialize;

/// A checkpoint file written by the training backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub path: PathBuf,
    pub epoch: f64,
}

/// One entry of the snapshot picker shown in the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotChoice {
    pub epoch: f64,
    pub label: String,
}

/// Renders an epoch for display: whole epochs without a fraction.
pub fn format_epoch(epoch: f64) -> String {
    if epoch.fract() == 0.0 && epoch.is_finite() {
        format!("{:.0}", epoch)
    } else {
        format!("{}", epoch)
    }
}
