//! Per-user scheduling on top of a review state store and a content catalog.

use crate::algorithm::{algorithm_for, SpacedRepetitionAlgorithm};
use crate::catalog::ContentCatalog;
use crate::date_utils::study_day_start;
use crate::error::{Result, SchedulerError};
use crate::settings::EffectiveSettings;
use crate::stats::ProgressSummary;
use crate::store::{ReviewStateStore, SaveOutcome, StoredState};
use crate::types::{GradingOutcome, Item, ItemId, Quality, ReviewState, UserId};
use crate::unlock::UnlockPolicy;
use chrono::{DateTime, Utc};

pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// Applies grading events to review states and answers due/new queries.
///
/// Every state change is computed in memory and written with the version it
/// was read at. A conflicting write is retried from a fresh read, so a
/// double submit is applied twice in sequence, never twice to the same
/// snapshot.
pub struct Scheduler<S, C> {
    store: S,
    catalog: C,
    algorithm: Box<dyn SpacedRepetitionAlgorithm>,
    daily_reset_hour: u32,
    max_conflict_retries: u32,
    unlock: UnlockPolicy,
}

impl<S: ReviewStateStore, C: ContentCatalog> Scheduler<S, C> {
    pub fn new(store: S, catalog: C, settings: &EffectiveSettings) -> Self {
        Self {
            store,
            catalog,
            algorithm: algorithm_for(settings),
            daily_reset_hour: settings.daily_reset_hour,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
            unlock: UnlockPolicy::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: Box<dyn SpacedRepetitionAlgorithm>) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    pub fn with_unlock_policy(mut self, unlock: UnlockPolicy) -> Self {
        self.unlock = unlock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn algorithm(&self) -> &dyn SpacedRepetitionAlgorithm {
        self.algorithm.as_ref()
    }

    /// Apply a grading outcome and persist the new state.
    pub fn record_grading(
        &self,
        user_id: UserId,
        item_id: ItemId,
        outcome: &GradingOutcome,
        now: DateTime<Utc>,
    ) -> Result<ReviewState> {
        self.record_quality(user_id, item_id, outcome.quality, now)
    }

    pub fn record_quality(
        &self,
        user_id: UserId,
        item_id: ItemId,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> Result<ReviewState> {
        let next = self.update_state(user_id, item_id, now, |state| {
            self.algorithm.schedule(state, quality, now)
        })?;

        tracing::debug!(
            user_id,
            item_id,
            quality = quality.value(),
            stage = next.stage.as_str(),
            interval_days = next.interval_days,
            ease_factor = next.ease_factor,
            "recorded grading"
        );
        Ok(next)
    }

    /// Retire an item from the user's reviews. Archived states are never due.
    pub fn archive(&self, user_id: UserId, item_id: ItemId, now: DateTime<Utc>) -> Result<ReviewState> {
        self.update_state(user_id, item_id, now, |state| ReviewState {
            archived_at: state.archived_at.or(Some(now)),
            ..state.clone()
        })
    }

    /// Due states, oldest-overdue first, weakest (lowest ease) first on ties.
    pub fn list_due(&self, user_id: UserId, as_of: DateTime<Utc>) -> Result<Vec<StoredState>> {
        let mut due: Vec<StoredState> = self
            .store
            .due_states(user_id, as_of)?
            .into_iter()
            .filter(|stored| stored.state.is_due(as_of))
            .collect();
        due.sort_by(|a, b| {
            a.state
                .due_at
                .cmp(&b.state.due_at)
                .then_with(|| a.state.ease_factor.total_cmp(&b.state.ease_factor))
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        Ok(due)
    }

    /// Highest frequency rank the user may be introduced to.
    pub fn unlocked_rank(&self, user_id: UserId) -> Result<u32> {
        let learned = self.store.learned_count(user_id)?;
        Ok(self.unlock.unlocked_rank(learned))
    }

    /// Up to `daily_limit - already_introduced_today` items the user has
    /// never seen and has unlocked, in catalog priority order.
    pub fn list_new_candidates(
        &self,
        user_id: UserId,
        daily_limit: usize,
        already_introduced_today: usize,
    ) -> Result<Vec<Item>> {
        let remaining = daily_limit.saturating_sub(already_introduced_today);
        if remaining == 0 {
            return Ok(Vec::new());
        }

        let known = self.store.known_items(user_id)?;
        let max_rank = self.unlocked_rank(user_id)?;
        let mut candidates = self
            .catalog
            .new_item_candidates(user_id, &known, max_rank, remaining)?;
        candidates.retain(|item| !known.contains(&item.id));
        candidates.truncate(remaining);
        Ok(candidates)
    }

    /// Items first shown to the user during the current study day.
    pub fn introduced_today(&self, user_id: UserId, now: DateTime<Utc>) -> Result<usize> {
        let since = study_day_start(now, self.daily_reset_hour);
        Ok(self.store.introduced_since(user_id, since)?)
    }

    pub fn progress(&self, user_id: UserId, now: DateTime<Utc>) -> Result<ProgressSummary> {
        let states = self.store.states_for_user(user_id)?;
        Ok(ProgressSummary::from_states_with(
            states.iter().map(|stored| &stored.state),
            now,
            &self.unlock,
        ))
    }

    /// Read-modify-write with optimistic concurrency. Items without a state
    /// start from the algorithm's initial state; unknown items are rejected.
    fn update_state<F>(&self, user_id: UserId, item_id: ItemId, now: DateTime<Utc>, apply: F) -> Result<ReviewState>
    where
        F: Fn(&ReviewState) -> ReviewState,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;

            let (current, expected_version) = match self.store.load_state(user_id, item_id)? {
                Some(stored) => (stored.value, Some(stored.version)),
                None => {
                    if self.catalog.item(item_id)?.is_none() {
                        return Err(SchedulerError::UnknownItem(item_id));
                    }
                    (self.algorithm.initial_state(now), None)
                }
            };

            let next = apply(&current);
            match self.store.save_state(user_id, item_id, &next, expected_version)? {
                SaveOutcome::Saved(_) => return Ok(next),
                SaveOutcome::Conflict if attempts > self.max_conflict_retries => {
                    tracing::warn!(user_id, item_id, attempts, "review state conflict retries exhausted");
                    return Err(SchedulerError::Conflict {
                        user_id,
                        item_id,
                        attempts,
                    });
                }
                SaveOutcome::Conflict => {
                    tracing::warn!(user_id, item_id, attempts, "review state changed concurrently, retrying");
                }
            }
        }
    }
}
