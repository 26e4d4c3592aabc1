use serde::Serialize;

use crate::graph::GraphData;

/// A live update pushed to the browsers watching a job.
///
/// Serializes as `{"task": <id>, "update": "<kind>", ...}`:
///
/// ```text
/// {"task":"task-42","update":"progress","percentage":37,"eta":"4 minutes, 10 seconds"}
/// {"task":"task-42","update":"combined_graph","data":{...}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "update", rename_all = "snake_case")]
pub enum TaskUpdate {
    Progress {
        task: String,
        percentage: u32,
        eta: String,
    },
    CombinedGraph {
        task: String,
        data: GraphData,
    },
    LrGraph {
        task: String,
        data: GraphData,
    },
}

impl TaskUpdate {
    /// The `update` tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskUpdate::Progress { .. }      => "progress",
            TaskUpdate::CombinedGraph { .. } => "combined_graph",
            TaskUpdate::LrGraph { .. }       => "lr_graph",
        }
    }
}

/// An update addressed to a broadcast room (the job id).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskEvent {
    pub room: String,
    pub update: TaskUpdate,
}
