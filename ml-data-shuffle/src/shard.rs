//! Shard boundaries and the shard-shuffled dataset

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use ml_data_core::dataset::RecordIter;
use ml_data_core::{Dataset, Error, Result};

use crate::options::ShardOptions;

/// Start offsets of the shards of a dataset
///
/// The dataset is cut into `ceil(dataset_size / shard_size)` shards whose
/// offsets are spread evenly over `[0, dataset_size)`: offset `k` is
/// `floor(k * dataset_size / num_shards)`. When `dataset_size` is not a
/// multiple of `shard_size` the offsets are closer together than `shard_size`.
pub fn shard_boundaries(dataset_size: usize, shard_size: usize) -> Result<Vec<usize>> {
    if shard_size == 0 {
        return Err(Error::InvalidArgument(
            "shard_size must be greater than 0".into(),
        ));
    }

    let num_shards = dataset_size.div_ceil(shard_size);
    let boundaries = (0..num_shards)
        .map(|k| interpolate(k, dataset_size, num_shards))
        .collect();

    Ok(boundaries)
}

#[allow(clippy::cast_possible_truncation)]
fn interpolate(k: usize, dataset_size: usize, num_shards: usize) -> usize {
    // k < num_shards, so the result is below dataset_size
    ((k as u128 * dataset_size as u128) / num_shards as u128) as usize
}

/// Build a transformation that shuffles a dataset shard by shard
///
/// The returned function wraps a source dataset of `dataset_size` records
/// into a [`ShardedDataset`]. Each pass over it visits the shards in random
/// order and yields up to `shard_size` consecutive records starting at each
/// shard offset. With a `seed` the order is reproducible across runs.
///
/// Because shards start at interpolated offsets (see [`shard_boundaries`]),
/// neighbouring shards overlap when `dataset_size` is not a multiple of
/// `shard_size`, and the records in the overlap are emitted twice.
pub fn random_shard_dataset(
    dataset_size: usize,
    shard_size: usize,
    seed: Option<u64>,
) -> Result<impl Fn(Arc<dyn Dataset>) -> ShardedDataset + Send + Sync> {
    random_shard_dataset_with_options(
        dataset_size,
        shard_size,
        ShardOptions {
            seed,
            ..ShardOptions::default()
        },
    )
}

/// Same as [`random_shard_dataset`], with full control over the options
pub fn random_shard_dataset_with_options(
    dataset_size: usize,
    shard_size: usize,
    options: ShardOptions,
) -> Result<impl Fn(Arc<dyn Dataset>) -> ShardedDataset + Send + Sync> {
    let boundaries: Arc<[usize]> = shard_boundaries(dataset_size, shard_size)?.into();

    tracing::debug!(
        dataset_size,
        shard_size,
        num_shards = boundaries.len(),
        seeded = options.seed.is_some(),
        "built random shard transformation"
    );

    Ok(move |source: Arc<dyn Dataset>| {
        ShardedDataset::new(source, Arc::clone(&boundaries), shard_size, options)
    })
}

/// A dataset that yields the shards of its source in random order
///
/// Every shard starts its own pass over the source and skips to the shard
/// offset, so one pass over a `ShardedDataset` reads O(records × shards)
/// source records. A file-backed source is reopened once per shard.
pub struct ShardedDataset {
    /// The dataset being sharded
    source: Arc<dyn Dataset>,

    /// Shard start offsets in source order
    boundaries: Arc<[usize]>,

    /// Maximum number of records per shard
    shard_size: usize,

    /// Seed of the first pass
    seed: u64,

    /// Whether each pass draws a new order
    reshuffle_each_iteration: bool,

    /// Number of passes started so far
    epoch: AtomicU64,
}

impl ShardedDataset {
    /// Create a new sharded dataset over precomputed boundaries
    pub fn new(
        source: Arc<dyn Dataset>,
        boundaries: Arc<[usize]>,
        shard_size: usize,
        options: ShardOptions,
    ) -> Self {
        Self {
            source,
            boundaries,
            shard_size,
            seed: options.seed.unwrap_or_else(rand::random),
            reshuffle_each_iteration: options.reshuffle_each_iteration,
            epoch: AtomicU64::new(0),
        }
    }

    /// Shard start offsets in source order
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Maximum number of records per shard
    pub fn shard_size(&self) -> usize {
        self.shard_size
    }

    /// Number of passes started so far
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Relaxed)
    }

    /// Set the epoch counter (useful when resuming training)
    pub fn set_epoch(&self, epoch: u64) {
        self.epoch.store(epoch, Ordering::Relaxed);
    }

    /// Draw the shard order of the next pass
    fn next_shard_order(&self) -> Vec<usize> {
        let epoch = self.epoch.fetch_add(1, Ordering::Relaxed);
        let seed = if self.reshuffle_each_iteration {
            self.seed.wrapping_add(epoch)
        } else {
            self.seed
        };

        let mut order = self.boundaries.to_vec();
        order.shuffle(&mut StdRng::seed_from_u64(seed));

        tracing::trace!(epoch, ?order, "drew shard order");
        order
    }
}

impl Dataset for ShardedDataset {
    fn iter(&self) -> RecordIter<'_> {
        let order = self.next_shard_order();
        let source = &self.source;
        let shard_size = self.shard_size;

        Box::new(
            order
                .into_iter()
                .flat_map(move |offset| source.iter().skip(offset).take(shard_size)),
        )
    }

    fn row_count(&self) -> Option<usize> {
        let total = self.source.row_count()?;
        Some(
            self.boundaries
                .iter()
                .map(|&offset| total.saturating_sub(offset).min(self.shard_size))
                .sum(),
        )
    }
}
