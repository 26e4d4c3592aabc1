use indexmap::IndexMap;

use crate::graph::graph_data::{Column, GraphData};
use crate::series::{NamedSeries, SeriesTable, EPOCH, LEARNING_RATE};

/// Rendered charts hold roughly this many points (at most twice as many).
const TARGET_POINTS: usize = 100;

/// Axis tag for accuracy-like series in the combined graph.
const SECONDARY_AXIS: &str = "y2";

// ---------------------------------------------------------------------------
// Down-sampling
// ---------------------------------------------------------------------------

/// Skip interval for a series with `len` rows: `max(len / 100, 1)`.
pub fn stride(len: usize) -> usize {
    (len / TARGET_POINTS).max(1)
}

/// Every `stride`-th element, starting with the first.
pub fn downsample<T: Clone>(values: &[T], stride: usize) -> Vec<T> {
    values.iter().step_by(stride.max(1)).cloned().collect()
}

// ---------------------------------------------------------------------------
// Public builders
// ---------------------------------------------------------------------------

/// Loss curves: every metric whose kind mentions "loss" in any case.
pub fn loss_graph(train: &SeriesTable, val: &SeriesTable) -> Option<GraphData> {
    build(train, val, false, |s| s.kind_contains("loss"))
}

/// Accuracy curves: metrics whose kind is exactly `"Accuracy"`.
pub fn accuracy_graph(train: &SeriesTable, val: &SeriesTable) -> Option<GraphData> {
    build(train, val, false, |s| s.kind == "Accuracy")
}

/// Every tracked metric on one chart; accuracy-like kinds go on the
/// secondary axis.
pub fn combined_graph(train: &SeriesTable, val: &SeriesTable) -> Option<GraphData> {
    build(train, val, true, |_| true)
}

/// Learning rate against epoch, from the training table only.
pub fn lr_graph(train: &SeriesTable) -> Option<GraphData> {
    let epochs = train.get(EPOCH)?;
    let rates  = train.get(LEARNING_RATE)?;

    let step = stride(epochs.len());
    let mut data = GraphData::default();
    data.columns.push(Column::new("epoch", downsample(&epochs.data, step)));
    data.columns.push(Column::new("lr", downsample(&rates.data, step)));
    data.xs.insert("lr".into(), "epoch".into());
    data.names.insert("lr".into(), "Learning Rate".into());
    Some(data)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn build<F>(train: &SeriesTable, val: &SeriesTable, with_axes: bool, include: F) -> Option<GraphData>
where
    F: Fn(&NamedSeries) -> bool,
{
    let mut data = GraphData::default();
    if with_axes {
        data.axes = Some(IndexMap::new());
    }

    add_side(&mut data, train, "train", &include);
    add_side(&mut data, val, "val", &include);

    if data.columns.is_empty() {
        None
    } else {
        Some(data)
    }
}

/// Appends the matching columns of one table, followed by its x column if
/// anything was added.
fn add_side<F>(data: &mut GraphData, table: &SeriesTable, side: &str, include: &F)
where
    F: Fn(&NamedSeries) -> bool,
{
    let epochs = match table.get(EPOCH) {
        Some(e) => e,
        None    => return,
    };
    let step  = stride(epochs.len());
    let x_id  = format!("{}_epochs", side);
    let mut added = false;

    for (name, series) in table.iter() {
        if name == EPOCH || name == LEARNING_RATE || !include(series) {
            continue;
        }
        let col_id = format!("{}-{}", name, side);
        data.columns.push(Column::new(col_id.clone(), downsample(&series.data, step)));
        data.xs.insert(col_id.clone(), x_id.clone());
        data.names.insert(col_id.clone(), format!("{} ({})", name, side));
        if let Some(axes) = data.axes.as_mut() {
            if series.kind_contains("accuracy") {
                axes.insert(col_id, SECONDARY_AXIS.into());
            }
        }
        added = true;
    }

    if added {
        data.columns.push(Column::new(x_id, downsample(&epochs.data, step)));
    }
}
