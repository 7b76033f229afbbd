// src/services/fetcher.rs

//! Concurrent item fetcher.
//!
//! Fans an id list out to the remote source with bounded parallelism and
//! builds a [`Snapshot`] from whatever succeeded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{ClientConfig, Item, Snapshot};
use crate::services::RemoteItemSource;
use crate::utils::Clock;

/// Service for fetching item details in parallel.
pub struct ConcurrentFetcher {
    source: Arc<dyn RemoteItemSource>,
    clock: Arc<dyn Clock>,
    concurrency: usize,
    timeout: Duration,
}

impl ConcurrentFetcher {
    /// Create a fetcher with explicit limits.
    pub fn new(
        source: Arc<dyn RemoteItemSource>,
        clock: Arc<dyn Clock>,
        concurrency: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            clock,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    /// Create a fetcher using the client limits from configuration.
    pub fn from_config(
        source: Arc<dyn RemoteItemSource>,
        clock: Arc<dyn Clock>,
        config: &ClientConfig,
    ) -> Self {
        Self::new(source, clock, config.max_concurrent, config.timeout())
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetch every id and build a snapshot in index order.
    ///
    /// Never fails: ids whose fetch errors or times out are dropped. An empty
    /// id list yields an empty snapshot.
    pub async fn fetch(&self, ids: Vec<String>) -> Snapshot {
        let started = Instant::now();
        let requested = ids.len();

        let mut results = stream::iter(ids.into_iter().enumerate())
            .map(|(position, id)| async move {
                let result = self.fetch_one(&id).await;
                (position, id, result)
            })
            .buffer_unordered(self.concurrency);

        let mut fetched: Vec<(usize, Item)> = Vec::with_capacity(requested);
        let mut not_found = 0;
        let mut failures = 0;
        while let Some((position, id, result)) = results.next().await {
            match result {
                Ok(item) => fetched.push((position, item)),
                Err(error) if error.is_not_found() => {
                    not_found += 1;
                    log::debug!("Item {} not found, skipping", id);
                }
                Err(error) => {
                    failures += 1;
                    log::warn!("Failed to fetch item {}: {}", id, error);
                }
            }
        }

        fetched.sort_unstable_by_key(|(position, _)| *position);
        let items: Vec<Item> = fetched.into_iter().map(|(_, item)| item).collect();

        log::info!(
            "Fetched {}/{} items ({} not found, {} failed) in {:?}",
            items.len(),
            requested,
            not_found,
            failures,
            started.elapsed()
        );

        Snapshot::new(items, self.clock.now(), requested)
    }

    async fn fetch_one(&self, id: &str) -> Result<Item> {
        match tokio::time::timeout(self.timeout, self.source.fetch_details(id)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::fetch(
                id,
                format!("timed out after {:?}", self.timeout),
            )),
        }
    }
}
