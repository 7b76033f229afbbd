// src/pipeline/refresh.rs

//! Fetch-and-publish refresh chain.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{AppError, Result};
use crate::services::{ConcurrentFetcher, RemoteItemSource};
use crate::storage::SnapshotStore;

use super::retry::RetryPolicy;

/// Summary of one successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub requested: usize,
    pub fetched: usize,
    pub dropped: usize,
    pub elapsed: Duration,
    pub attempts: u32,
}

/// Runs `fetch_index -> fetch details -> publish`.
pub struct Refresher {
    source: Arc<dyn RemoteItemSource>,
    fetcher: ConcurrentFetcher,
    store: Arc<SnapshotStore>,
    index_timeout: Duration,
}

impl Refresher {
    pub fn new(
        source: Arc<dyn RemoteItemSource>,
        fetcher: ConcurrentFetcher,
        store: Arc<SnapshotStore>,
        index_timeout: Duration,
    ) -> Self {
        Self {
            source,
            fetcher,
            store,
            index_timeout,
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Run the chain once.
    ///
    /// Fails only when the index cannot be fetched; individual item failures
    /// shrink the snapshot instead. Nothing is published on failure.
    pub async fn refresh(&self) -> Result<RefreshReport> {
        let started = Instant::now();
        log::debug!("Loading item index");

        let ids = match tokio::time::timeout(self.index_timeout, self.source.fetch_index()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(AppError::fetch(
                    "index",
                    format!("timed out after {:?}", self.index_timeout),
                ));
            }
        };
        log::debug!("Index lists {} ids", ids.len());

        let snapshot = self.fetcher.fetch(ids).await;
        let report = RefreshReport {
            requested: snapshot.requested(),
            fetched: snapshot.len(),
            dropped: snapshot.dropped(),
            elapsed: started.elapsed(),
            attempts: 1,
        };
        self.store.publish(snapshot);

        Ok(report)
    }

    /// Run the chain under a retry policy.
    pub async fn refresh_with_retry(&self, policy: &RetryPolicy) -> Result<RefreshReport> {
        let attempted = policy.run("Full refresh", || self.refresh()).await?;
        Ok(RefreshReport {
            attempts: attempted.attempts,
            ..attempted.value
        })
    }
}
