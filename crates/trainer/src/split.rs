//! Deterministic shuffling and train/test partitioning
//!
//! Rows are ordered by a seeded hash of their feature vector, then split
//! 80/20. The same seed and data always yield the same partitions.

use churnlab_core::EncodedDataset;

use crate::deterministic::xxhash64_i64;

/// Fixed default seed for reproducible partitions.
pub const DEFAULT_SEED: i64 = 0;

/// Holdout fraction in micro units (20%).
pub const TEST_RATIO_MICRO: i64 = 200_000;

/// Train and held-out partitions of an encoded dataset.
#[derive(Clone, Debug)]
pub struct TrainTestSplit {
    pub train: EncodedDataset,
    pub test: EncodedDataset,
}

/// Reorder rows by seeded hash of their features. Equal rows keep their
/// source order (stable sort).
pub fn shuffle(data: &mut EncodedDataset, seed: i64) {
    let mut order: Vec<(i64, usize)> = data
        .features
        .iter()
        .enumerate()
        .map(|(i, row)| (xxhash64_i64(row, seed), i))
        .collect();
    order.sort_by_key(|&(hash, _)| hash);

    let n = data.features.len();
    let mut features = Vec::with_capacity(n);
    let mut targets = Vec::with_capacity(n);
    for &(_, idx) in &order {
        features.push(data.features[idx].clone());
        targets.push(data.targets[idx]);
    }

    data.features = features;
    data.targets = targets;
}

/// Shuffle with `seed` and carve off the trailing 20% as the held-out
/// partition. Small inputs may leave the test partition empty; the metrics
/// path rejects that case.
pub fn train_test_split(data: &EncodedDataset, seed: i64) -> TrainTestSplit {
    let mut shuffled = data.clone();
    shuffle(&mut shuffled, seed);

    let n = shuffled.len();
    let test_len = ((n as i64 * TEST_RATIO_MICRO) / 1_000_000) as usize;
    let train_len = n - test_len;

    let test_features = shuffled.features.split_off(train_len);
    let test_targets = shuffled.targets.split_off(train_len);

    TrainTestSplit {
        train: EncodedDataset {
            features: shuffled.features,
            targets: shuffled.targets,
            feature_count: data.feature_count,
        },
        test: EncodedDataset {
            features: test_features,
            targets: test_targets,
            feature_count: data.feature_count,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> EncodedDataset {
        let features: Vec<Vec<i64>> = (0..n).map(|i| vec![i as i64 * 1000, 7]).collect();
        let targets: Vec<i64> = (0..n).map(|i| (i % 2) as i64).collect();
        EncodedDataset {
            features,
            targets,
            feature_count: 2,
        }
    }

    #[test]
    fn test_shuffle_determinism() {
        let mut a = sample(20);
        let mut b = a.clone();

        shuffle(&mut a, 42);
        shuffle(&mut b, 42);

        assert_eq!(a.features, b.features);
        assert_eq!(a.targets, b.targets);
    }

    #[test]
    fn test_shuffle_keeps_rows_paired() {
        let original = sample(20);
        let mut shuffled = original.clone();
        shuffle(&mut shuffled, 7);

        // Every (row, target) pair must survive the reorder.
        for (row, &target) in shuffled.features.iter().zip(&shuffled.targets) {
            let src = original.features.iter().position(|r| r == row).unwrap();
            assert_eq!(original.targets[src], target);
        }
    }

    #[test]
    fn test_split_ratio() {
        let split = train_test_split(&sample(10), DEFAULT_SEED);
        assert_eq!(split.train.len(), 8);
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.feature_count, 2);
    }

    #[test]
    fn test_split_determinism() {
        let data = sample(25);
        let a = train_test_split(&data, DEFAULT_SEED);
        let b = train_test_split(&data, DEFAULT_SEED);

        assert_eq!(a.train.features, b.train.features);
        assert_eq!(a.test.targets, b.test.targets);
    }

    #[test]
    fn test_tiny_input_gets_empty_test_partition() {
        let split = train_test_split(&sample(2), DEFAULT_SEED);
        assert_eq!(split.train.len(), 2);
        assert!(split.test.is_empty());
    }
}
