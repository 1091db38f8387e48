//! Session composition: due reviews first, then budgeted new items.

use crate::catalog::ContentCatalog;
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::store::ReviewStateStore;
use crate::types::{Item, UserId};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Why an item is in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Review,
    New,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub item: Item,
    pub origin: Origin,
}

/// Ordered practice queue for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionQueue {
    pub entries: Vec<SessionEntry>,
    /// Due reviews at composition time, including ones that did not fit.
    pub due_total: usize,
    /// New items still allowed today after this session.
    pub new_remaining: usize,
    /// Nothing due and no new items left to introduce.
    pub caught_up: bool,
}

impl SessionQueue {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.entries.iter().map(|entry| &entry.item)
    }

    pub fn count(&self, origin: Origin) -> usize {
        self.entries.iter().filter(|entry| entry.origin == origin).count()
    }
}

/// Build a session of at most `target_size` items for `user_id`.
///
/// Due items come first and are never displaced: when they fill the session
/// no new items are added. Otherwise the free slots take new items, limited
/// by what is left of `daily_new_limit` today. New items are interleaved at
/// random positions while due items keep their oldest-overdue-first order.
/// A short or empty queue is returned when there is not enough to practise.
pub fn compose_session<S, C, R>(
    scheduler: &Scheduler<S, C>,
    user_id: UserId,
    target_size: usize,
    daily_new_limit: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<SessionQueue>
where
    S: ReviewStateStore,
    C: ContentCatalog,
    R: Rng + ?Sized,
{
    let due = scheduler.list_due(user_id, now)?;
    let due_total = due.len();

    let mut seen = HashSet::new();
    let mut reviews = Vec::with_capacity(due_total.min(target_size));
    for stored in due {
        if reviews.len() == target_size {
            break;
        }
        match scheduler.catalog().item(stored.item_id)? {
            Some(item) if seen.insert(item.id) => reviews.push(item),
            Some(_) => {}
            None => tracing::warn!(user_id, item_id = stored.item_id, "due item missing from catalog"),
        }
    }

    let introduced = scheduler.introduced_today(user_id, now)?;
    let budget = daily_new_limit.saturating_sub(introduced);
    let free_slots = target_size - reviews.len();
    let new_items: Vec<Item> = if free_slots == 0 || budget == 0 {
        Vec::new()
    } else {
        scheduler
            .list_new_candidates(user_id, daily_new_limit.min(introduced + free_slots), introduced)?
            .into_iter()
            .filter(|item| seen.insert(item.id))
            .collect()
    };

    let new_remaining = budget - new_items.len();
    let caught_up = due_total == 0 && new_items.is_empty();

    tracing::debug!(
        user_id,
        due_total,
        reviews = reviews.len(),
        new = new_items.len(),
        new_remaining,
        "composed session"
    );

    Ok(SessionQueue {
        entries: interleave(reviews, new_items, rng),
        due_total,
        new_remaining,
        caught_up,
    })
}

/// Insert new items at random positions without reordering the reviews.
fn interleave<R: Rng + ?Sized>(reviews: Vec<Item>, new_items: Vec<Item>, rng: &mut R) -> Vec<SessionEntry> {
    let mut entries: Vec<SessionEntry> = reviews
        .into_iter()
        .map(|item| SessionEntry {
            item,
            origin: Origin::Review,
        })
        .collect();

    for item in new_items {
        let position = rng.random_range(0..=entries.len());
        entries.insert(
            position,
            SessionEntry {
                item,
                origin: Origin::New,
            },
        );
    }
    entries
}
