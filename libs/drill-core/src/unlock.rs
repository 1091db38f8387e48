//! Progressive unlocking of frequency-ranked content.
//!
//! A learner starts with the most frequent items and earns the next batch of
//! ranks by learning items. Unranked items are always available.

use crate::types::{Item, ReviewState};
use serde::{Deserialize, Serialize};

/// Consecutive successful reviews after which an item counts as learned.
pub const LEARNED_REPETITIONS: u32 = 3;

const LEARNED_PER_LEVEL: usize = 50;
const MAX_LEVEL: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockPolicy {
    /// Ranks available from the start.
    pub initial_ranks: u32,
    /// Ranks added per completed batch.
    pub ranks_per_batch: u32,
    /// Learned items needed to complete a batch.
    pub learned_per_batch: u32,
}

impl Default for UnlockPolicy {
    fn default() -> Self {
        Self {
            initial_ranks: 100,
            ranks_per_batch: 50,
            learned_per_batch: 20,
        }
    }
}

/// Where a learner stands in the unlock progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockProgress {
    pub learned: usize,
    /// Highest frequency rank the learner may be introduced to.
    pub unlocked_rank: u32,
    /// 1-10, one level per fifty learned items.
    pub level: u32,
    /// Learned items still needed for the next batch.
    pub to_next_unlock: usize,
}

impl UnlockPolicy {
    pub fn unlocked_rank(&self, learned: usize) -> u32 {
        let batches = (learned / self.batch_size()) as u64;
        let bonus = batches.saturating_mul(u64::from(self.ranks_per_batch));
        u64::from(self.initial_ranks)
            .saturating_add(bonus)
            .min(u64::from(u32::MAX)) as u32
    }

    pub fn progress(&self, learned: usize) -> UnlockProgress {
        let level = (1 + learned / LEARNED_PER_LEVEL).min(MAX_LEVEL as usize) as u32;
        UnlockProgress {
            learned,
            unlocked_rank: self.unlocked_rank(learned),
            level,
            to_next_unlock: self.batch_size() - learned % self.batch_size(),
        }
    }

    fn batch_size(&self) -> usize {
        self.learned_per_batch.max(1) as usize
    }
}

pub fn is_learned(state: &ReviewState) -> bool {
    state.repetitions >= LEARNED_REPETITIONS
}

/// Whether `item` may be introduced with ranks up to `unlocked_rank` open.
pub fn is_unlocked(item: &Item, unlocked_rank: u32) -> bool {
    item.frequency_rank.map_or(true, |rank| rank <= unlocked_rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_with_initial_ranks() {
        let policy = UnlockPolicy::default();
        assert_eq!(
            policy.progress(0),
            UnlockProgress {
                learned: 0,
                unlocked_rank: 100,
                level: 1,
                to_next_unlock: 20,
            }
        );
    }

    #[test]
    fn each_batch_opens_more_ranks() {
        let policy = UnlockPolicy::default();
        assert_eq!(policy.unlocked_rank(19), 100);
        assert_eq!(policy.unlocked_rank(20), 150);
        assert_eq!(policy.unlocked_rank(45), 200);
        assert_eq!(policy.progress(45).to_next_unlock, 15);
    }

    #[test]
    fn level_is_capped() {
        let policy = UnlockPolicy::default();
        assert_eq!(policy.progress(49).level, 1);
        assert_eq!(policy.progress(50).level, 2);
        assert_eq!(policy.progress(10_000).level, 10);
    }

    #[test]
    fn zero_batch_size_does_not_divide_by_zero() {
        let policy = UnlockPolicy {
            learned_per_batch: 0,
            ..UnlockPolicy::default()
        };
        assert_eq!(policy.unlocked_rank(3), 250);
        assert_eq!(policy.progress(3).to_next_unlock, 1);
    }

    #[test]
    fn rank_never_overflows() {
        let policy = UnlockPolicy {
            initial_ranks: u32::MAX,
            ..UnlockPolicy::default()
        };
        assert_eq!(policy.unlocked_rank(1_000), u32::MAX);
    }
}
