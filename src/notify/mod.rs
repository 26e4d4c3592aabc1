pub mod task_update;
pub mod notifier;

pub use task_update::{TaskEvent, TaskUpdate};
pub use notifier::{ChannelNotifier, Notifier, NullNotifier};
