use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::series::RowValue;

/// One chart column. Serializes as `[id, v0, v1, ...]`, the layout the
/// browser charting code expects.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: String,
    pub values: Vec<RowValue>,
}

impl Column {
    pub fn new(id: impl Into<String>, values: Vec<RowValue>) -> Self {
        Column { id: id.into(), values }
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.values.len() + 1))?;
        seq.serialize_element(&self.id)?;
        for v in &self.values {
            seq.serialize_element(v)?;
        }
        seq.end()
    }
}

/// A chart payload: data columns, which x column each one plots against,
/// display names, and optionally a secondary-axis assignment.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct GraphData {
    pub columns: Vec<Column>,
    pub xs: IndexMap<String, String>,
    pub names: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axes: Option<IndexMap<String, String>>,
}

impl GraphData {
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn column_ids(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.id.as_str()).collect()
    }
}
