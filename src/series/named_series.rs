use serde::{Serialize, Deserialize};

use crate::series::row_value::RowValue;

/// Kind tag given to the epoch index series.
pub const EPOCH_KIND: &str = "Epoch";

/// A tagged metric series, one row per recorded epoch.
///
/// `kind` is the backend's name for the producing layer (`"SoftmaxWithLoss"`,
/// `"Accuracy"`, `"LearningRate"`, ...). It is fixed when the series is
/// created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub kind: String,
    pub data: Vec<RowValue>,
}

impl NamedSeries {
    pub fn new(kind: impl Into<String>) -> Self {
        NamedSeries { kind: kind.into(), data: Vec::new() }
    }

    /// Builds a series of scalar rows.
    pub fn from_values<I>(kind: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        NamedSeries {
            kind: kind.into(),
            data: values.into_iter().map(RowValue::Scalar).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn last(&self) -> Option<&RowValue> {
        self.data.last()
    }

    /// Case-insensitive substring match on `kind`.
    pub fn kind_contains(&self, needle: &str) -> bool {
        self.kind.to_lowercase().contains(&needle.to_lowercase())
    }
}
