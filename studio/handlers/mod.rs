pub mod graphs;
pub mod train;
pub mod train_sse;
