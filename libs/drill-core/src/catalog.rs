//! Read-only access to practiceable content.

use crate::error::StoreError;
use crate::types::{Item, ItemId, ItemKind, UserId};
use crate::unlock::is_unlocked;
use std::collections::{BTreeMap, HashSet};

type Result<T> = std::result::Result<T, StoreError>;

/// Source of items, sibling forms and new-item priority.
pub trait ContentCatalog {
    fn item(&self, item_id: ItemId) -> Result<Option<Item>>;

    /// Answers that could be confused with this item's answer: other forms of
    /// the same lexeme, or other translations in the same category. Empty
    /// when the item is unknown or has no siblings.
    fn sibling_forms(&self, item_id: ItemId) -> Result<Vec<String>>;

    /// Items not in `exclude`, in the catalog's natural priority order.
    /// Ranked items beyond `max_rank` are still locked; unranked items are
    /// always eligible.
    fn new_item_candidates(
        &self,
        user_id: UserId,
        exclude: &HashSet<ItemId>,
        max_rank: u32,
        limit: usize,
    ) -> Result<Vec<Item>>;
}

impl<C: ContentCatalog + ?Sized> ContentCatalog for &C {
    fn item(&self, item_id: ItemId) -> Result<Option<Item>> {
        (**self).item(item_id)
    }

    fn sibling_forms(&self, item_id: ItemId) -> Result<Vec<String>> {
        (**self).sibling_forms(item_id)
    }

    fn new_item_candidates(
        &self,
        user_id: UserId,
        exclude: &HashSet<ItemId>,
        max_rank: u32,
        limit: usize,
    ) -> Result<Vec<Item>> {
        (**self).new_item_candidates(user_id, exclude, max_rank, limit)
    }
}

/// Whether `other` is a sibling of `item` for distractor purposes.
pub fn is_sibling(item: &Item, other: &Item) -> bool {
    if item.id == other.id {
        return false;
    }
    match (&item.kind, &other.kind) {
        (ItemKind::Form(_), ItemKind::Form(_)) => item.lexeme_id == other.lexeme_id,
        (ItemKind::Vocabulary(a), ItemKind::Vocabulary(b)) => {
            item.category == other.category && a.direction == b.direction
        }
        _ => false,
    }
}

/// Catalog held in memory, ordered by frequency rank then id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    items: BTreeMap<ItemId, Item>,
}

impl InMemoryCatalog {
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
        }
    }

    pub fn insert(&mut self, item: Item) {
        self.items.insert(item.id, item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ContentCatalog for InMemoryCatalog {
    fn item(&self, item_id: ItemId) -> Result<Option<Item>> {
        Ok(self.items.get(&item_id).cloned())
    }

    fn sibling_forms(&self, item_id: ItemId) -> Result<Vec<String>> {
        let Some(item) = self.items.get(&item_id) else {
            return Ok(Vec::new());
        };
        Ok(self
            .items
            .values()
            .filter(|other| is_sibling(item, other))
            .map(|other| other.expected_answer().to_string())
            .collect())
    }

    fn new_item_candidates(
        &self,
        _user_id: UserId,
        exclude: &HashSet<ItemId>,
        max_rank: u32,
        limit: usize,
    ) -> Result<Vec<Item>> {
        let mut candidates: Vec<&Item> = self
            .items
            .values()
            .filter(|item| !exclude.contains(&item.id) && is_unlocked(item, max_rank))
            .collect();
        // Ranked items first, then unranked, ties by id
        candidates.sort_by_key(|item| (item.frequency_rank.is_none(), item.frequency_rank, item.id));
        Ok(candidates.into_iter().take(limit).cloned().collect())
    }
}
