pub mod record;
pub mod migrate;

pub use record::TaskRecord;
pub use migrate::{upgrade, CURRENT_VERSION};
