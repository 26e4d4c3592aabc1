pub mod train_task;
pub mod task_config;
pub mod backend;
pub mod dataset;
pub mod snapshot;

pub use train_task::{TrainTask, TRAIN_UPDATE_INTERVAL};
pub use task_config::{TaskConfig, TrainOptions};
pub use backend::{BaseBackend, FileSnapshotBackend, TrainBackend};
pub use dataset::DatasetRef;
pub use snapshot::{Snapshot, SnapshotChoice};
