use std::path::{Path, PathBuf};

/// The parts of a dataset job a training task needs: where its files live
/// and which of them holds the class labels.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRef {
    pub dir: PathBuf,
    pub labels_file: Option<String>,
}

impl DatasetRef {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DatasetRef { dir: dir.into(), labels_file: None }
    }

    pub fn with_labels_file(mut self, name: impl Into<String>) -> Self {
        self.labels_file = Some(name.into());
        self
    }

    /// Resolves `name` relative to the dataset directory.
    pub fn path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.join(name)
    }
}
