pub mod error;
pub mod series;
pub mod graph;
pub mod notify;
pub mod persist;
pub mod task;
pub mod util;

// Convenience re-exports
pub use error::{Result, TaskError};
pub use series::{NamedSeries, RowValue, SeriesTable};
pub use graph::GraphData;
pub use notify::{ChannelNotifier, Notifier, NullNotifier, TaskEvent, TaskUpdate};
pub use task::{DatasetRef, TaskConfig, TrainBackend, TrainTask};
