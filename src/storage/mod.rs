//! In-memory snapshot storage.
//!
//! Holds at most one current [`Snapshot`] behind a TTL:
//!
//! ```text
//! SnapshotStore
//!   └── current: ArcSwapOption<CachedSnapshot>
//!         ├── snapshot: Arc<Snapshot>   (immutable once published)
//!         └── expires_at                (publish time + ttl)
//! ```
//!
//! Publishing swaps the whole entry in one atomic store, so readers see either
//! the old generation or the new one. Expiry never hides a snapshot: a stale
//! snapshot is still returned by [`SnapshotStore::read`] until a newer one
//! replaces it.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Snapshot;
use crate::utils::Clock;

/// A published snapshot with its expiry.
#[derive(Debug)]
pub struct CachedSnapshot {
    snapshot: Arc<Snapshot>,
    expires_at: DateTime<Utc>,
}

impl CachedSnapshot {
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Summary of the current cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub item_count: usize,
    pub requested: usize,
    pub stale: bool,
}

/// Single-slot, TTL-tagged snapshot cache.
pub struct SnapshotStore {
    current: ArcSwapOption<CachedSnapshot>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new(ttl: chrono::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Replace the current snapshot and restart the expiry clock.
    ///
    /// Last write wins when several refreshes publish concurrently.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let expires_at = self.clock.now() + self.ttl;
        self.current.store(Some(Arc::new(CachedSnapshot {
            snapshot: Arc::clone(&snapshot),
            expires_at,
        })));
        log::debug!(
            "Published snapshot with {} items, expires at {}",
            snapshot.len(),
            expires_at
        );
        snapshot
    }

    /// The current snapshot, expired or not. `None` before the first publish.
    pub fn read(&self) -> Option<Arc<Snapshot>> {
        self.entry().map(|entry| Arc::clone(&entry.snapshot))
    }

    /// The current entry including its expiry.
    pub fn entry(&self) -> Option<Arc<CachedSnapshot>> {
        self.current.load_full()
    }

    /// Current time according to the store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Whether a snapshot exists and its TTL has elapsed.
    pub fn is_stale(&self) -> bool {
        self.entry()
            .is_some_and(|entry| entry.is_expired_at(self.clock.now()))
    }

    pub fn status(&self) -> Option<CacheStatus> {
        let entry = self.entry()?;
        Some(CacheStatus {
            fetched_at: entry.snapshot.fetched_at(),
            expires_at: entry.expires_at,
            item_count: entry.snapshot.len(),
            requested: entry.snapshot.requested(),
            stale: entry.is_expired_at(self.clock.now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use super::*;
    use crate::models::Item;
    use crate::utils::clock::ManualClock;

    fn make_items(count: usize, score: i64) -> Vec<Item> {
        (0..count)
            .map(|i| Item {
                id: i.to_string(),
                title: format!("Story {}", i),
                url: None,
                author: None,
                score,
                comment_count: None,
                posted_at: None,
                kids: Vec::new(),
            })
            .collect()
    }

    fn store_with(clock: Arc<ManualClock>) -> SnapshotStore {
        SnapshotStore::new(chrono::Duration::minutes(10), clock)
    }

    #[test]
    fn test_empty_before_publish() {
        let store = store_with(Arc::new(ManualClock::new()));
        assert!(store.read().is_none());
        assert!(store.status().is_none());
        assert!(!store.is_stale());
    }

    #[test]
    fn test_empty_snapshot_is_present() {
        let clock = Arc::new(ManualClock::new());
        let store = store_with(clock.clone());
        store.publish(Snapshot::new(Vec::new(), clock.now(), 0));

        let snapshot = store.read().expect("published snapshot");
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_expired_snapshot_still_readable() {
        let clock = Arc::new(ManualClock::new());
        let store = store_with(clock.clone());
        store.publish(Snapshot::new(make_items(3, 1), clock.now(), 3));

        clock.advance(chrono::Duration::minutes(9));
        assert!(!store.is_stale());

        clock.advance(chrono::Duration::minutes(2));
        assert!(store.is_stale());
        assert_eq!(store.read().unwrap().len(), 3);
        assert!(store.status().unwrap().stale);
    }

    #[test]
    fn test_publish_resets_expiry() {
        let clock = Arc::new(ManualClock::new());
        let store = store_with(clock.clone());
        store.publish(Snapshot::new(make_items(1, 1), clock.now(), 1));

        clock.advance(chrono::Duration::minutes(15));
        assert!(store.is_stale());

        store.publish(Snapshot::new(make_items(2, 2), clock.now(), 2));
        let status = store.status().unwrap();
        assert!(!status.stale);
        assert_eq!(status.item_count, 2);
        assert_eq!(status.expires_at, clock.now() + chrono::Duration::minutes(10));
    }

    #[test]
    fn test_concurrent_readers_never_see_mixed_generations() {
        let clock = Arc::new(ManualClock::new());
        let store = Arc::new(store_with(clock.clone()));
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    while !done.load(Ordering::Relaxed) {
                        if let Some(snapshot) = store.read() {
                            let generation = snapshot.items()[0].score;
                            assert_eq!(snapshot.len(), generation as usize);
                            assert!(snapshot.items().iter().all(|i| i.score == generation));
                        }
                    }
                })
            })
            .collect();

        for generation in 1..=200 {
            let count = generation as usize;
            let items = make_items(count, generation);
            store.publish(Snapshot::new(items, clock.now(), count));
        }
        done.store(true, Ordering::Relaxed);

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.read().unwrap().len(), 200);
    }
}
