//! Stratified train/test split with a fixed seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of holdout rows for a class of size `count`: at least 1, at most `count - 1`.
fn holdout_size(count: usize, test_fraction: f64) -> usize {
    let wanted = (count as f64 * test_fraction).round() as usize;
    wanted.clamp(1, count.saturating_sub(1))
}

/// Split row indices so every label keeps its share in both parts.
///
/// Each class is shuffled with a `StdRng` seeded from `seed`, then its first
/// `round(n * test_fraction)` members go to the test side. Both outputs are
/// sorted, so the result only depends on the labels, fraction and seed.
/// Classes with fewer than two rows all go to training.
pub fn stratified_split(labels: &[u8], test_fraction: f64, seed: u64) -> SplitIndices {
    let mut by_class: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (idx, label) in labels.iter().enumerate() {
        by_class.entry(*label).or_default().push(idx);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for (_, mut members) in by_class {
        if members.len() < 2 {
            train.extend(members);
            continue;
        }
        members.shuffle(&mut rng);
        let n_test = holdout_size(members.len(), test_fraction);
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    SplitIndices { train, test }
}
