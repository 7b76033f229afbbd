// src/services/ranking.rs

//! Top-N ranking over the current snapshot.

use std::sync::Arc;

use crate::models::{Item, ItemView, Snapshot};
use crate::storage::SnapshotStore;

/// Answer to a top-N query.
#[derive(Debug, Clone, PartialEq)]
pub enum TopItems {
    /// Nothing has been published yet.
    NotReady,
    /// Items sorted by descending score.
    Ready(Vec<ItemView>),
}

impl TopItems {
    /// Text shown to callers while the first refresh is still running.
    pub const NOT_READY_MESSAGE: &'static str =
        "No stories in the store yet! Please try again in a few seconds.";

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn items(&self) -> Option<&[ItemView]> {
        match self {
            Self::NotReady => None,
            Self::Ready(items) => Some(items),
        }
    }
}

/// Read side of the engine.
#[derive(Clone)]
pub struct RankedQuery {
    store: Arc<SnapshotStore>,
}

impl RankedQuery {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self { store }
    }

    /// Top `count` items by score. Non-positive counts yield an empty list.
    pub fn query(&self, count: i64) -> TopItems {
        let Some(entry) = self.store.entry() else {
            return TopItems::NotReady;
        };
        let snapshot = entry.snapshot();
        if entry.is_expired_at(self.store.now()) {
            log::debug!(
                "Serving stale snapshot fetched at {}",
                snapshot.fetched_at()
            );
        }

        let count = usize::try_from(count).unwrap_or(0);
        TopItems::Ready(
            rank(snapshot)
                .into_iter()
                .take(count)
                .map(ItemView::from)
                .collect(),
        )
    }
}

/// Items by descending score. Equal scores keep snapshot (index) order.
pub fn rank(snapshot: &Snapshot) -> Vec<&Item> {
    let mut ranked: Vec<&Item> = snapshot.items().iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}
