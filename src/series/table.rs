use indexmap::IndexMap;
use serde::{Serialize, Deserialize};

use crate::error::{Result, TaskError};
use crate::series::named_series::{NamedSeries, EPOCH_KIND};
use crate::series::row_value::RowValue;

/// Name of the series holding the epoch index of every row.
pub const EPOCH: &str = "epoch";
/// Name of the learning-rate series. It is not required for a row to be complete.
pub const LEARNING_RATE: &str = "learning_rate";

/// Insertion-ordered collection of metric series for one side of training
/// (train or validation). Order drives the order graphs are drawn in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesTable {
    series: IndexMap<String, NamedSeries>,
}

impl SeriesTable {
    pub fn new() -> Self {
        SeriesTable::default()
    }

    pub fn get(&self, name: &str) -> Option<&NamedSeries> {
        self.series.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Iterates `(name, series)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamedSeries)> {
        self.series.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Inserts (or replaces) a whole series, keeping its original position
    /// if the name already existed.
    pub fn insert(&mut self, name: impl Into<String>, series: NamedSeries) {
        self.series.insert(name.into(), series);
    }

    /// Length of the epoch series, or 0 before anything was recorded.
    pub fn epoch_len(&self) -> usize {
        self.series.get(EPOCH).map(NamedSeries::len).unwrap_or(0)
    }

    /// Records `value` for `name` in the row belonging to `current_epoch`.
    ///
    /// Opens a new epoch row when `current_epoch` differs from the last
    /// recorded one, then aligns the target series against the epoch series:
    ///
    /// - longer than the epoch series → `OutOfOrderUpdate`
    /// - same length                 → the value is merged into the last row
    /// - one shorter                 → the value becomes the new row
    /// - further behind              → `Missing` rows are padded in first
    ///
    /// Returns `true` once every series other than `epoch` and
    /// `learning_rate` has a value for the latest epoch.
    pub fn append(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        value: f64,
        current_epoch: f64,
    ) -> Result<bool> {
        let name = name.into();

        let epochs = self.series
            .entry(EPOCH.to_owned())
            .or_insert_with(|| NamedSeries::new(EPOCH_KIND));
        if epochs.last().and_then(RowValue::as_scalar) != Some(current_epoch) {
            epochs.data.push(RowValue::Scalar(current_epoch));
        }
        let epoch_len = epochs.len();

        let target = self.series
            .entry(name.clone())
            .or_insert_with(|| NamedSeries::new(kind));
        let name_len = target.len();

        if name_len > epoch_len {
            return Err(TaskError::OutOfOrderUpdate { name, name_len, epoch_len });
        } else if name_len == epoch_len {
            // name_len >= 1 here because epoch_len >= 1
            if let Some(last) = target.data.last_mut() {
                last.merge(value);
            }
        } else {
            target.data.resize(epoch_len - 1, RowValue::Missing);
            target.data.push(RowValue::Scalar(value));
        }

        Ok(self.row_complete())
    }

    /// `true` when every tracked metric has exactly one row per epoch.
    pub fn row_complete(&self) -> bool {
        let epoch_len = self.epoch_len();
        self.series
            .iter()
            .filter(|(name, _)| name.as_str() != EPOCH && name.as_str() != LEARNING_RATE)
            .all(|(_, s)| s.len() == epoch_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_append_opens_epoch_row() {
        let mut table = SeriesTable::new();
        let complete = table.append("loss", "SoftmaxWithLoss", 2.3, 0.0).unwrap();
        assert!(complete);
        assert_eq!(table.get(EPOCH).unwrap().data, vec![RowValue::Scalar(0.0)]);
        assert_eq!(table.get(EPOCH).unwrap().kind, "Epoch");
        assert_eq!(table.get("loss").unwrap().data, vec![RowValue::Scalar(2.3)]);
    }

    #[test]
    fn kind_is_fixed_at_creation() {
        let mut table = SeriesTable::new();
        table.append("out", "SoftmaxWithLoss", 1.0, 0.0).unwrap();
        table.append("out", "Accuracy", 0.5, 1.0).unwrap();
        assert_eq!(table.get("out").unwrap().kind, "SoftmaxWithLoss");
    }

    #[test]
    fn incomplete_until_every_metric_reports() {
        let mut table = SeriesTable::new();
        table.append("loss", "SoftmaxWithLoss", 1.0, 0.0).unwrap();
        table.append("accuracy", "Accuracy", 0.2, 0.0).unwrap();

        assert!(!table.append("loss", "SoftmaxWithLoss", 0.9, 1.0).unwrap());
        assert!(table.append("accuracy", "Accuracy", 0.3, 1.0).unwrap());
    }

    #[test]
    fn learning_rate_does_not_block_completion() {
        let mut table = SeriesTable::new();
        table.append("loss", "SoftmaxWithLoss", 1.0, 0.0).unwrap();
        table.append(LEARNING_RATE, "LearningRate", 0.01, 0.0).unwrap();
        assert!(table.append("loss", "SoftmaxWithLoss", 0.8, 1.0).unwrap());
        assert_eq!(table.get(LEARNING_RATE).unwrap().len(), 1);
    }

    #[test]
    fn series_longer_than_epochs_is_rejected() {
        let mut table = SeriesTable::new();
        table.insert(EPOCH, NamedSeries::from_values("Epoch", [0.0]));
        table.insert("loss", NamedSeries::from_values("SoftmaxWithLoss", [1.0, 0.9]));

        let err = table.append("loss", "SoftmaxWithLoss", 0.8, 0.0).unwrap_err();
        match err {
            TaskError::OutOfOrderUpdate { name, name_len, epoch_len } => {
                assert_eq!(name, "loss");
                assert_eq!(name_len, 2);
                assert_eq!(epoch_len, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
