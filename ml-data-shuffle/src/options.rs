//! Configuration for shard shuffling

use serde::{Deserialize, Serialize};

/// Options for shard shuffling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardOptions {
    /// Seed of the shard order; `None` draws one per dataset from OS entropy
    pub seed: Option<u64>,

    /// Whether every pass over the dataset uses a new shard order
    ///
    /// Pass `e` uses seed `seed + e`, so a seeded pipeline still reproduces
    /// the same sequence of orders across runs.
    pub reshuffle_each_iteration: bool,
}

impl Default for ShardOptions {
    fn default() -> Self {
        Self {
            seed: None,
            reshuffle_each_iteration: true,
        }
    }
}

impl ShardOptions {
    /// Default options with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_fills_defaults() {
        let options: ShardOptions = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(options, ShardOptions::seeded(7));
        assert!(options.reshuffle_each_iteration);

        let options: ShardOptions =
            serde_json::from_str(r#"{"reshuffle_each_iteration": false}"#).unwrap();
        assert_eq!(options.seed, None);
        assert!(!options.reshuffle_each_iteration);
    }
}
