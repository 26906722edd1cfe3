use serde::Serialize;
use std::fmt;

/// Share of each category routed to `train/`, as numerator / denominator.
const TRAIN_SHARE: (usize, usize) = (4, 5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subset {
    Train,
    Test,
}

impl Subset {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Subset::Train => "train",
            Subset::Test => "test",
        }
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

impl<T> SplitPlan<T> {
    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries paired with their subset, train first.
    pub fn assignments(&self) -> impl Iterator<Item = (Subset, &T)> {
        self.train
            .iter()
            .map(|item| (Subset::Train, item))
            .chain(self.test.iter().map(|item| (Subset::Test, item)))
    }
}

/// floor(0.8 * total)
pub fn train_count(total: usize) -> usize {
    total / TRAIN_SHARE.1 * TRAIN_SHARE.0 + (total % TRAIN_SHARE.1) * TRAIN_SHARE.0 / TRAIN_SHARE.1
}

/// Splits `entries` in their given order: the first `train_count` go to
/// train, the remainder to test.
pub fn split_entries<T>(mut entries: Vec<T>) -> SplitPlan<T> {
    let num_train = train_count(entries.len());
    let test = entries.split_off(num_train);

    SplitPlan {
        train: entries,
        test,
    }
}
