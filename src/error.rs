use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TaskError>;

/// Everything that can go wrong while recording, loading or querying a
/// training task.
#[derive(Error, Debug)]
pub enum TaskError {
    /// A value arrived for `name` before the epoch row it belongs to was opened.
    #[error("received a new output for '{name}' without being told the new epoch ({name_len} rows vs {epoch_len} epochs)")]
    OutOfOrderUpdate {
        name: String,
        name_len: usize,
        epoch_len: usize,
    },

    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A capability query reached the base backend.
    #[error("{0} must be implemented by a concrete training backend")]
    NotImplemented(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not upgrade task record: {0}")]
    Migration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
