//! Dataset trait and implementations

use std::sync::Arc;

use crate::error::Result;
use crate::value::Value;

/// Lazily produced sequence of records
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Value>> + Send + 'a>;

/// A dataset represents a re-iterable collection of records
///
/// Every call to [`Dataset::iter`] starts a fresh pass from the first record.
/// Nothing is read until the returned iterator is driven.
pub trait Dataset: Send + Sync {
    /// Start a new pass over the records of this dataset
    fn iter(&self) -> RecordIter<'_>;

    /// Get the number of records in this dataset, if known without scanning
    fn row_count(&self) -> Option<usize> {
        None
    }

    /// Drive a full pass and collect every record
    fn collect_records(&self) -> Result<Vec<Value>> {
        self.iter().collect()
    }
}

impl<D: Dataset + ?Sized> Dataset for Arc<D> {
    fn iter(&self) -> RecordIter<'_> {
        (**self).iter()
    }

    fn row_count(&self) -> Option<usize> {
        (**self).row_count()
    }
}

/// Pipeline-style adapters available on every owned dataset
pub trait DatasetExt: Dataset + Sized + 'static {
    /// Apply a record transformation lazily to every record
    fn map<F>(self, map_fn: F) -> MapDataset<F>
    where
        F: Fn(Value) -> Result<Value> + Send + Sync,
    {
        MapDataset::new(Arc::new(self), map_fn)
    }

    /// Apply a dataset-to-dataset transformation
    fn apply<D, F>(self, transformation: F) -> D
    where
        F: FnOnce(Arc<dyn Dataset>) -> D,
    {
        transformation(Arc::new(self))
    }
}

impl<T: Dataset + Sized + 'static> DatasetExt for T {}

/// An in-memory dataset backed by a vector of records
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    /// The records of the dataset
    records: Vec<Value>,
}

impl InMemoryDataset {
    /// Create a new in-memory dataset from existing records
    pub fn new(records: Vec<Value>) -> Self {
        Self { records }
    }

    /// Get the records in this dataset
    pub fn records(&self) -> &[Value] {
        &self.records
    }
}

impl<V: Into<Value>> FromIterator<V> for InMemoryDataset {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl Dataset for InMemoryDataset {
    fn iter(&self) -> RecordIter<'_> {
        Box::new(self.records.iter().cloned().map(Ok))
    }

    fn row_count(&self) -> Option<usize> {
        Some(self.records.len())
    }
}

/// A dataset whose records are produced by mapping another dataset
pub struct MapDataset<F> {
    /// The upstream dataset
    source: Arc<dyn Dataset>,

    /// Record transformation
    map_fn: F,
}

impl<F> MapDataset<F>
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    /// Create a new mapped dataset
    pub fn new(source: Arc<dyn Dataset>, map_fn: F) -> Self {
        Self { source, map_fn }
    }
}

impl<F> Dataset for MapDataset<F>
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    fn iter(&self) -> RecordIter<'_> {
        let map_fn = &self.map_fn;
        Box::new(self.source.iter().map(move |record| record.and_then(map_fn)))
    }

    fn row_count(&self) -> Option<usize> {
        self.source.row_count()
    }
}
