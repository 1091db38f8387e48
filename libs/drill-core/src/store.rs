//! Persistence contract for per-user review states.
//!
//! Writes are optimistic: each stored state carries a version, and a save
//! names the version it was computed from. A store rejects the write with
//! [`SaveOutcome::Conflict`] when the record changed in between, so two
//! grading events for the same (user, item) can never both apply to the
//! same snapshot.

use crate::error::StoreError;
use crate::types::{ItemId, ReviewState, UserId};
use crate::unlock::is_learned;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

type Result<T> = std::result::Result<T, StoreError>;

/// A review state together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// A stored state keyed by item.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredState {
    pub item_id: ItemId,
    pub state: ReviewState,
    pub version: u64,
}

/// Result of a versioned write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written; carries the new version.
    Saved(u64),
    /// The stored record no longer matches the expected version.
    Conflict,
}

/// Repository for review state operations.
pub trait ReviewStateStore {
    fn load_state(&self, user_id: UserId, item_id: ItemId) -> Result<Option<Versioned<ReviewState>>>;

    /// Write `state` if the stored version still equals `expected_version`.
    /// `None` means the record must not exist yet.
    fn save_state(
        &self,
        user_id: UserId,
        item_id: ItemId,
        state: &ReviewState,
        expected_version: Option<u64>,
    ) -> Result<SaveOutcome>;

    /// Every state the user has, archived ones included.
    fn states_for_user(&self, user_id: UserId) -> Result<Vec<StoredState>>;

    /// Unarchived states with `due_at <= as_of`, in no particular order.
    fn due_states(&self, user_id: UserId, as_of: DateTime<Utc>) -> Result<Vec<StoredState>> {
        Ok(self
            .states_for_user(user_id)?
            .into_iter()
            .filter(|stored| stored.state.is_due(as_of))
            .collect())
    }

    /// Items the user has already been shown.
    fn known_items(&self, user_id: UserId) -> Result<HashSet<ItemId>> {
        Ok(self
            .states_for_user(user_id)?
            .into_iter()
            .map(|stored| stored.item_id)
            .collect())
    }

    /// Number of items first introduced at or after `since`.
    fn introduced_since(&self, user_id: UserId, since: DateTime<Utc>) -> Result<usize> {
        Ok(self
            .states_for_user(user_id)?
            .iter()
            .filter(|stored| stored.state.introduced_at >= since)
            .count())
    }

    /// Number of learned items, archived ones included.
    fn learned_count(&self, user_id: UserId) -> Result<usize> {
        Ok(self
            .states_for_user(user_id)?
            .iter()
            .filter(|stored| is_learned(&stored.state))
            .count())
    }
}

impl<S: ReviewStateStore + ?Sized> ReviewStateStore for &S {
    fn load_state(&self, user_id: UserId, item_id: ItemId) -> Result<Option<Versioned<ReviewState>>> {
        (**self).load_state(user_id, item_id)
    }

    fn save_state(
        &self,
        user_id: UserId,
        item_id: ItemId,
        state: &ReviewState,
        expected_version: Option<u64>,
    ) -> Result<SaveOutcome> {
        (**self).save_state(user_id, item_id, state, expected_version)
    }

    fn states_for_user(&self, user_id: UserId) -> Result<Vec<StoredState>> {
        (**self).states_for_user(user_id)
    }

    fn due_states(&self, user_id: UserId, as_of: DateTime<Utc>) -> Result<Vec<StoredState>> {
        (**self).due_states(user_id, as_of)
    }

    fn known_items(&self, user_id: UserId) -> Result<HashSet<ItemId>> {
        (**self).known_items(user_id)
    }

    fn introduced_since(&self, user_id: UserId, since: DateTime<Utc>) -> Result<usize> {
        (**self).introduced_since(user_id, since)
    }

    fn learned_count(&self, user_id: UserId) -> Result<usize> {
        (**self).learned_count(user_id)
    }
}

/// Process-local store, for tests and embedders without a database.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    states: Mutex<HashMap<(UserId, ItemId), Versioned<ReviewState>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<(UserId, ItemId), Versioned<ReviewState>>>> {
        self.states
            .lock()
            .map_err(|_| StoreError::Backend("review state lock poisoned".to_string()))
    }
}

impl ReviewStateStore for InMemoryStore {
    fn load_state(&self, user_id: UserId, item_id: ItemId) -> Result<Option<Versioned<ReviewState>>> {
        Ok(self.lock()?.get(&(user_id, item_id)).cloned())
    }

    fn save_state(
        &self,
        user_id: UserId,
        item_id: ItemId,
        state: &ReviewState,
        expected_version: Option<u64>,
    ) -> Result<SaveOutcome> {
        let mut states = self.lock()?;
        let current = states.get(&(user_id, item_id)).map(|stored| stored.version);
        if current != expected_version {
            return Ok(SaveOutcome::Conflict);
        }

        let version = current.map_or(1, |v| v + 1);
        states.insert(
            (user_id, item_id),
            Versioned {
                value: state.clone(),
                version,
            },
        );
        Ok(SaveOutcome::Saved(version))
    }

    fn states_for_user(&self, user_id: UserId) -> Result<Vec<StoredState>> {
        let states = self.lock()?;
        let mut found: Vec<StoredState> = states
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .map(|((_, item_id), stored)| StoredState {
                item_id: *item_id,
                state: stored.value.clone(),
                version: stored.version,
            })
            .collect();
        found.sort_by_key(|stored| stored.item_id);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn first_save_requires_absent_record() {
        let store = InMemoryStore::new();
        let state = ReviewState::new(2.5, now());
        assert_eq!(store.save_state(1, 10, &state, None).unwrap(), SaveOutcome::Saved(1));
        assert_eq!(store.save_state(1, 10, &state, None).unwrap(), SaveOutcome::Conflict);
    }

    #[test]
    fn stale_version_is_rejected() {
        let store = InMemoryStore::new();
        let state = ReviewState::new(2.5, now());
        store.save_state(1, 10, &state, None).unwrap();
        assert_eq!(store.save_state(1, 10, &state, Some(1)).unwrap(), SaveOutcome::Saved(2));
        assert_eq!(store.save_state(1, 10, &state, Some(1)).unwrap(), SaveOutcome::Conflict);

        let loaded = store.load_state(1, 10).unwrap().unwrap();
        assert_eq!(loaded.version, 2);
    }

    #[test]
    fn users_are_isolated() {
        let store = InMemoryStore::new();
        let state = ReviewState::new(2.5, now());
        store.save_state(1, 10, &state, None).unwrap();
        store.save_state(2, 10, &state, None).unwrap();
        store.save_state(2, 11, &state, None).unwrap();

        assert_eq!(store.states_for_user(1).unwrap().len(), 1);
        assert_eq!(
            store.known_items(2).unwrap(),
            HashSet::from([10, 11])
        );
        assert!(store.load_state(3, 10).unwrap().is_none());
    }

    #[test]
    fn due_states_skip_future_and_archived() {
        let store = InMemoryStore::new();
        let due = ReviewState::new(2.5, now() - Duration::days(2));
        let later = ReviewState {
            due_at: now() + Duration::days(3),
            ..ReviewState::new(2.5, now())
        };
        let archived = ReviewState {
            archived_at: Some(now()),
            ..ReviewState::new(2.5, now() - Duration::days(5))
        };
        store.save_state(1, 1, &due, None).unwrap();
        store.save_state(1, 2, &later, None).unwrap();
        store.save_state(1, 3, &archived, None).unwrap();

        let ids: Vec<ItemId> = store
            .due_states(1, now())
            .unwrap()
            .into_iter()
            .map(|stored| stored.item_id)
            .collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn counts_introductions_since() {
        let store = InMemoryStore::new();
        store
            .save_state(1, 1, &ReviewState::new(2.5, now() - Duration::days(1)), None)
            .unwrap();
        store.save_state(1, 2, &ReviewState::new(2.5, now()), None).unwrap();
        assert_eq!(store.introduced_since(1, now() - Duration::hours(1)).unwrap(), 1);
    }

    #[test]
    fn learned_items_include_archived() {
        let store = InMemoryStore::new();
        let learned = ReviewState {
            repetitions: 3,
            ..ReviewState::new(2.5, now())
        };
        let archived = ReviewState {
            archived_at: Some(now()),
            ..learned.clone()
        };
        let learning = ReviewState {
            repetitions: 2,
            ..ReviewState::new(2.5, now())
        };
        store.save_state(1, 1, &learned, None).unwrap();
        store.save_state(1, 2, &archived, None).unwrap();
        store.save_state(1, 3, &learning, None).unwrap();
        store.save_state(2, 1, &learned, None).unwrap();
        assert_eq!(store.learned_count(1).unwrap(), 2);
        assert_eq!(store.learned_count(2).unwrap(), 1);
    }
}
