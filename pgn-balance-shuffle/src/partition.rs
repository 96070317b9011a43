//! Split partitioner

use pgn_balance_core::{SplitName, SplitRatios};

/// Sizes of the train, validation and test slices for `len` items.
///
/// Train and validation are floored; rounding error lands on test, so the
/// three sizes always add up to `len`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn split_sizes(len: usize, ratios: &SplitRatios) -> [usize; 3] {
    let floor_of = |ratio: f64| ((len as f64) * ratio).floor().max(0.0) as usize;

    let train = floor_of(ratios.train).min(len);
    let validation = floor_of(ratios.validation).min(len - train);
    [train, validation, len - train - validation]
}

/// Three contiguous, disjoint views over one sampled sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition<'a, T> {
    /// Leading slice
    pub train: &'a [T],
    /// Middle slice
    pub validation: &'a [T],
    /// Remainder
    pub test: &'a [T],
}

impl<'a, T> Partition<'a, T> {
    /// The slice assigned to `split`
    pub fn get(&self, split: SplitName) -> &'a [T] {
        match split {
            SplitName::Train => self.train,
            SplitName::Validation => self.validation,
            SplitName::Test => self.test,
        }
    }

    /// Slice lengths in split order
    pub fn sizes(&self) -> [usize; 3] {
        [self.train.len(), self.validation.len(), self.test.len()]
    }
}

/// Cut `items` into train/validation/test slices without reordering.
///
/// The input is expected to be in random order already, which makes
/// contiguous slicing equivalent to random assignment.
pub fn partition<'a, T>(items: &'a [T], ratios: &SplitRatios) -> Partition<'a, T> {
    let [train, validation, _] = split_sizes(items.len(), ratios);
    let (train_slice, rest) = items.split_at(train);
    let (validation_slice, test_slice) = rest.split_at(validation);
    Partition {
        train: train_slice,
        validation: validation_slice,
        test: test_slice,
    }
}
