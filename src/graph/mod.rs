pub mod graph_data;
pub mod builders;

pub use graph_data::{Column, GraphData};
pub use builders::{accuracy_graph, combined_graph, downsample, loss_graph, lr_graph, stride};
