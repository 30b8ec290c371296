//! Random shard reordering for ML data pipelines
//!
//! Shuffling a large dataset record by record needs a buffer as large as the
//! dataset. This crate instead cuts the dataset into contiguous shards and
//! shuffles the order of the shards, keeping records inside a shard in their
//! original order.

#![warn(missing_docs)]

mod options;
mod shard;

pub use options::ShardOptions;
pub use shard::{
    random_shard_dataset, random_shard_dataset_with_options, shard_boundaries, ShardedDataset,
};

// Re-export core types
pub use ml_data_core::{Dataset, Error, Result};
