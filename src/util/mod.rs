pub mod time_fmt;

pub use time_fmt::print_time_diff;
