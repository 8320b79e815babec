//! Train/test row partitioning.
//!
//! `n_test = ceil(n * test_fraction)`, `n_train = n - n_test`; both must be
//! non-zero. The chronological policy puts the trailing rows in the test
//! partition so no training row is later than any test row.

use crate::harness::FitError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Leading rows train, trailing rows test.
    #[default]
    Chronological,
    /// Seeded random permutation.
    Shuffled { seed: u64 },
}

/// Row indices of each partition, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

pub fn split_rows(rows: usize, test_fraction: f64, policy: SplitPolicy) -> Result<Split, FitError> {
    let invalid = || FitError::InvalidSplit {
        test_fraction,
        rows,
    };
    if !test_fraction.is_finite() || test_fraction <= 0.0 || test_fraction >= 1.0 {
        return Err(invalid());
    }

    let n_test = (rows as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= rows {
        return Err(invalid());
    }
    let n_train = rows - n_test;

    match policy {
        SplitPolicy::Chronological => Ok(Split {
            train: (0..n_train).collect(),
            test: (n_train..rows).collect(),
        }),
        SplitPolicy::Shuffled { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut order: Vec<usize> = (0..rows).collect();
            order.shuffle(&mut rng);

            let mut test = order[..n_test].to_vec();
            let mut train = order[n_test..].to_vec();
            test.sort_unstable();
            train.sort_unstable();
            Ok(Split { train, test })
        }
    }
}
