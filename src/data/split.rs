//! Train/test splitting and stratified cross-validation folds

use crate::core::{Result, SVMError, Sample};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Samples partitioned into a training and a held-out test set
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Vec<Sample>,
    pub test: Vec<Sample>,
}

impl TrainTestSplit {
    /// Share of all samples that ended up in the test set
    pub fn test_share(&self) -> f64 {
        let total = self.train.len() + self.test.len();
        if total == 0 {
            0.0
        } else {
            self.test.len() as f64 / total as f64
        }
    }
}

/// Shuffle with a fixed seed and split off `ceil(test_fraction * n)` test samples
///
/// The split is reproducible for a given seed. Both parts must be non-empty.
pub fn train_test_split(
    samples: &[Sample],
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(SVMError::InvalidParameter(format!(
            "Test fraction must be between 0 and 1, got: {test_fraction}"
        )));
    }

    let n = samples.len();
    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(SVMError::InvalidParameter(format!(
            "Splitting {n} samples with test fraction {test_fraction} leaves an empty part"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let (test_idx, train_idx) = order.split_at(n_test);
    Ok(TrainTestSplit {
        train: select(samples, train_idx),
        test: select(samples, test_idx),
    })
}

/// Clone the samples at `indices`, in that order
pub fn select(samples: &[Sample], indices: &[usize]) -> Vec<Sample> {
    indices.iter().map(|&i| samples[i].clone()).collect()
}

/// Indices of one cross-validation round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified k-fold splitter without shuffling
///
/// Each fold keeps roughly the class proportions of the whole set. Per class,
/// samples keep their original order and are handed to the folds in
/// contiguous blocks; block sizes come from dealing the sorted label sequence
/// round-robin over the folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StratifiedKFold {
    n_splits: usize,
}

impl StratifiedKFold {
    /// Create a splitter producing `n_splits` folds (at least 2)
    pub fn new(n_splits: usize) -> Result<Self> {
        if n_splits < 2 {
            return Err(SVMError::InvalidParameter(format!(
                "Number of folds must be at least 2, got: {n_splits}"
            )));
        }
        Ok(Self { n_splits })
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Compute the folds for the given labels
    pub fn split(&self, labels: &[f64]) -> Result<Vec<Fold>> {
        let mut classes = labels.to_vec();
        classes.sort_by(f64::total_cmp);
        classes.dedup();

        let encoded: Vec<usize> = labels
            .iter()
            .map(|&l| classes.partition_point(|&c| c.total_cmp(&l).is_lt()))
            .collect();

        let mut class_counts = vec![0usize; classes.len()];
        for &k in &encoded {
            class_counts[k] += 1;
        }
        if let Some((k, &count)) = class_counts
            .iter()
            .enumerate()
            .find(|(_, count)| **count < self.n_splits)
        {
            return Err(SVMError::InvalidDataset(format!(
                "Class {} has {count} members, fewer than the {} folds requested",
                classes[k], self.n_splits
            )));
        }

        // Deal the sorted labels round-robin to get per-fold class quotas
        let mut allocation = vec![vec![0usize; classes.len()]; self.n_splits];
        let mut sorted = encoded.clone();
        sorted.sort_unstable();
        for (position, &k) in sorted.iter().enumerate() {
            allocation[position % self.n_splits][k] += 1;
        }

        // Within each class, fill folds in order
        let mut test_fold = vec![0usize; labels.len()];
        let mut next_fold = vec![0usize; classes.len()];
        let mut used = vec![0usize; classes.len()];
        for (i, &k) in encoded.iter().enumerate() {
            while used[k] == allocation[next_fold[k]][k] {
                next_fold[k] += 1;
                used[k] = 0;
            }
            test_fold[i] = next_fold[k];
            used[k] += 1;
        }

        let folds = (0..self.n_splits)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..labels.len()).partition(|&i| test_fold[i] == fold);
                Fold { train, test }
            })
            .collect();

        Ok(folds)
    }
}
