//! Snapshot data structure.

use chrono::{DateTime, Utc};

use super::Item;

/// One fully-fetched generation of items.
///
/// Items are kept in remote index order. Ids whose detail fetch failed are
/// absent; there are no placeholder entries.
#[derive(Debug, Clone)]
pub struct Snapshot {
    items: Vec<Item>,
    fetched_at: DateTime<Utc>,
    requested: usize,
}

impl Snapshot {
    pub fn new(items: Vec<Item>, fetched_at: DateTime<Utc>, requested: usize) -> Self {
        Self {
            items,
            fetched_at,
            requested,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Number of ids in the index this snapshot was built from.
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Fetched successfully, but zero items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids that were requested but dropped.
    pub fn dropped(&self) -> usize {
        self.requested.saturating_sub(self.items.len())
    }
}
