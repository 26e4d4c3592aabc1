pub mod row_value;
pub mod named_series;
pub mod table;

pub use row_value::RowValue;
pub use named_series::NamedSeries;
pub use table::{SeriesTable, EPOCH, LEARNING_RATE};
