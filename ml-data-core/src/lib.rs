//! Core records, datasets, and abstractions for ML data pipelines
//!
//! This crate provides the foundational components the other `ml-data` crates
//! build upon: the [`Value`] record model, the re-iterable [`Dataset`]
//! abstraction, the [`Transform`] trait for per-record transformations, and the
//! [`DataSpec`] container that carries dataset metadata to user callbacks.

#![warn(missing_docs)]

pub mod data_spec;
pub mod dataset;
pub mod error;
pub mod transform;
pub mod value;

// Re-export key types for convenience
pub use data_spec::{DataSpec, DataSpecBuilder, SpecField};
pub use dataset::{Dataset, DatasetExt, InMemoryDataset, MapDataset, RecordIter};
pub use error::{Error, Result};
pub use transform::{BoxedTransform, Transform, TransformChain};
pub use value::Value;
