//! Class sampler
//!
//! Draws a fixed quota of records per outcome class without replacement.
//! Samples are index vectors into the class pool, so the pool itself is never
//! copied or reordered.

use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use tracing::warn;

use pgn_balance_core::{OutcomeLabel, PoolShortfall, RecordSpan};

/// Build the run's random generator: reproducible with a seed, OS-seeded otherwise.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Draw `min(pool_len, target)` distinct indices in `0..pool_len`, in random order.
///
/// When the pool holds at least `target` items every subset of that size is
/// equally likely; otherwise the whole pool is returned, shuffled.
pub fn sample_indices<R: Rng + ?Sized>(pool_len: usize, target: u64, rng: &mut R) -> Vec<usize> {
    let amount = usize::try_from(target).map_or(pool_len, |target| target.min(pool_len));
    if amount == pool_len {
        let mut all: Vec<usize> = (0..pool_len).collect();
        all.shuffle(rng);
        return all;
    }
    index::sample(rng, pool_len, amount).into_vec()
}

/// The sampled records of one outcome class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSample {
    /// Class the sample was drawn from
    pub label: OutcomeLabel,
    /// Positions in the class pool, in sampled order
    pub indices: Vec<usize>,
    /// Set when the pool was smaller than the quota
    pub shortfall: Option<PoolShortfall>,
}

impl ClassSample {
    /// Number of sampled records
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether nothing was sampled
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Sample one class pool, logging a warning when the pool falls short.
pub fn sample_class<R: Rng + ?Sized>(
    label: OutcomeLabel,
    pool: &[RecordSpan],
    target: u64,
    rng: &mut R,
) -> ClassSample {
    let available = pool.len() as u64;
    let shortfall = (available < target).then_some(PoolShortfall {
        label,
        available,
        requested: target,
    });
    if let Some(shortfall) = &shortfall {
        warn!("{shortfall}");
    }

    ClassSample {
        label,
        indices: sample_indices(pool.len(), target, rng),
        shortfall,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn pool(n: u64) -> Vec<RecordSpan> {
        (0..n).map(|i| RecordSpan::new(i * 10, 10)).collect()
    }

    #[test]
    fn test_shortfall_takes_everything() {
        let spans = pool(4);
        let mut rng = seeded_rng(Some(1));
        let sample = sample_class(OutcomeLabel::Draw, &spans, 10, &mut rng);

        assert_eq!(sample.len(), 4);
        assert_eq!(
            sample.shortfall,
            Some(PoolShortfall {
                label: OutcomeLabel::Draw,
                available: 4,
                requested: 10
            })
        );
        let drawn: HashSet<_> = sample.indices.iter().copied().collect();
        assert_eq!(drawn, (0..spans.len()).collect());
    }

    #[test]
    fn test_exact_quota_has_no_shortfall() {
        let spans = pool(3);
        let sample = sample_class(OutcomeLabel::WhiteWin, &spans, 3, &mut seeded_rng(Some(2)));
        assert_eq!(sample.len(), 3);
        assert!(sample.shortfall.is_none());
    }

    #[test]
    fn test_zero_target() {
        assert!(sample_indices(5, 0, &mut seeded_rng(Some(3))).is_empty());
        assert!(sample_indices(0, 5, &mut seeded_rng(Some(3))).is_empty());
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = sample_indices(1000, 50, &mut seeded_rng(Some(42)));
        let b = sample_indices(1000, 50, &mut seeded_rng(Some(42)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_class_does_not_mutate_pool() {
        let spans = pool(20);
        let before = spans.clone();
        let picked = sample_class(OutcomeLabel::BlackWin, &spans, 5, &mut seeded_rng(Some(9)));
        assert_eq!(spans, before);
        assert_eq!(picked.len(), 5);
        assert!(picked.indices.iter().all(|&i| i < spans.len()));
    }

    proptest! {
        #[test]
        fn prop_sample_size_and_uniqueness(n in 0usize..300, t in 0u64..400, seed: u64) {
            let indices = sample_indices(n, t, &mut seeded_rng(Some(seed)));
            let expected = n.min(usize::try_from(t).unwrap());
            prop_assert_eq!(indices.len(), expected);

            let unique: HashSet<_> = indices.iter().copied().collect();
            prop_assert_eq!(unique.len(), indices.len());
            prop_assert!(indices.iter().all(|&i| i < n));
            if (n as u64) < t {
                prop_assert_eq!(unique, (0..n).collect::<HashSet<_>>());
            }
        }
    }
}
