//! Per-species allocation of pairs to train/val/test.

use serde::Serialize;
use std::fmt;

/// One of the three dataset splits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    /// All splits, in allocation order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value for each split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PerSplit<T> {
    pub train: T,
    pub val: T,
    pub test: T,
}

/// Pair counts per split.
pub type SplitCounts = PerSplit<usize>;

impl<T> PerSplit<T> {
    pub fn new(train: T, val: T, test: T) -> Self {
        Self { train, val, test }
    }

    pub fn get(&self, split: Split) -> &T {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    pub fn get_mut(&mut self, split: Split) -> &mut T {
        match split {
            Split::Train => &mut self.train,
            Split::Val => &mut self.val,
            Split::Test => &mut self.test,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerSplit<U> {
        PerSplit {
            train: f(&self.train),
            val: f(&self.val),
            test: f(&self.test),
        }
    }
}

impl SplitCounts {
    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }

    /// The split holding the most pairs; the earliest split wins ties.
    pub fn largest(&self) -> Split {
        first_max_by(&Split::ALL, |split| *self.get(split) as f64)
    }
}

impl fmt::Display for SplitCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "train={}, val={}, test={}",
            self.train, self.val, self.test
        )
    }
}

/// Fraction of all pairs each split should receive.
pub type SplitRatios = PerSplit<f64>;

impl SplitRatios {
    /// Ratios of `targets` to `total` pairs. `total` must be non-zero.
    pub fn from_targets(targets: &SplitCounts, total: usize) -> Self {
        targets.map(|&target| target as f64 / total as f64)
    }

    /// The split with the highest ratio; the earliest split wins ties.
    pub fn largest(&self) -> Split {
        first_max_by(&Split::ALL, |split| *self.get(split))
    }
}

/// Like `Iterator::max_by_key`, but returns the first maximum rather than
/// the last.
pub(crate) fn first_max_by(splits: &[Split], mut key: impl FnMut(Split) -> f64) -> Split {
    let mut best = splits[0];
    let mut best_key = key(best);
    for &split in &splits[1..] {
        let k = key(split);
        if k > best_key {
            best = split;
            best_key = k;
        }
    }
    best
}

/// Decide how many of a species' `n` pairs go to each split.
///
/// With three or more pairs every split receives at least one; smaller
/// species are dealt round-robin starting with train. The result always
/// sums to `n`.
pub fn allocate_species(n: usize, ratios: &SplitRatios) -> SplitCounts {
    if n < 3 {
        return round_robin(n);
    }

    let raw = ratios.map(|ratio| ratio * n as f64);
    let mut counts = raw.map(|value| value.floor() as usize);

    // Stable sort keeps train/val/test order among equal fractions.
    let mut by_fraction: Vec<(Split, f64)> = Split::ALL
        .iter()
        .map(|&split| {
            let value = *raw.get(split);
            (split, value - value.floor())
        })
        .collect();
    by_fraction.sort_by(|a, b| b.1.total_cmp(&a.1));

    let remainder = n.saturating_sub(counts.total());
    for i in 0..remainder {
        *counts.get_mut(by_fraction[i % by_fraction.len()].0) += 1;
    }

    for split in Split::ALL {
        if *counts.get(split) == 0 {
            let largest = counts.largest();
            if *counts.get(largest) > 1 {
                *counts.get_mut(largest) -= 1;
                *counts.get_mut(split) += 1;
            }
        }
    }

    while counts.total() < n {
        *counts.get_mut(ratios.largest()) += 1;
    }
    while counts.total() > n {
        let largest = counts.largest();
        *counts.get_mut(largest) -= 1;
    }

    counts
}

fn round_robin(n: usize) -> SplitCounts {
    let mut counts = SplitCounts::default();
    for i in 0..n {
        *counts.get_mut(Split::ALL[i % Split::ALL.len()]) += 1;
    }
    counts
}
