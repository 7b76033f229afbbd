// src/engine.rs

//! Wiring for the whole refresh engine.
//!
//! ```text
//! Engine
//!   ├── RefreshScheduler ──► Refresher ──► ConcurrentFetcher ──► RemoteItemSource
//!   │                            └────────► SnapshotStore ◄── RankedQuery
//!   └── RankedQuery
//! ```

use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::{RefreshReport, RefreshScheduler, Refresher, RetryPolicy, Schedule};
use crate::services::{
    ConcurrentFetcher, HackerNewsSource, RankedQuery, RemoteItemSource, TopItems,
};
use crate::storage::{CacheStatus, SnapshotStore};
use crate::utils::http::create_async_client;
use crate::utils::{Clock, SystemClock};

/// A fully wired engine: store, refresh chain, scheduler and query side.
pub struct Engine {
    store: Arc<SnapshotStore>,
    refresher: Arc<Refresher>,
    query: RankedQuery,
    scheduler: RefreshScheduler,
    retry: RetryPolicy,
}

impl Engine {
    /// Build an engine against the Hacker News API described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let client = create_async_client(&config.client)?;
        let source = HackerNewsSource::new(client, &config.source)?;
        Ok(Self::with_source(
            config,
            Arc::new(source),
            Arc::new(SystemClock),
        ))
    }

    /// Build an engine around any item source.
    pub fn with_source(
        config: &Config,
        source: Arc<dyn RemoteItemSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = Arc::new(SnapshotStore::new(
            config.caching.snapshot_ttl(),
            Arc::clone(&clock),
        ));
        let fetcher = ConcurrentFetcher::from_config(Arc::clone(&source), clock, &config.client);
        let refresher = Arc::new(Refresher::new(
            source,
            fetcher,
            Arc::clone(&store),
            config.client.timeout(),
        ));
        let schedule = Schedule::from_config(&config.caching);
        let retry = schedule.retry.clone();

        Self {
            query: RankedQuery::new(Arc::clone(&store)),
            scheduler: RefreshScheduler::new(Arc::clone(&refresher), schedule),
            store,
            refresher,
            retry,
        }
    }

    pub fn query(&self) -> &RankedQuery {
        &self.query
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn status(&self) -> Option<CacheStatus> {
        self.store.status()
    }

    /// Shorthand for `query().query(count)`.
    pub fn top(&self, count: i64) -> TopItems {
        self.query.query(count)
    }

    /// Run one full refresh now, with the configured retry policy.
    pub async fn refresh_now(&self) -> Result<RefreshReport> {
        self.refresher.refresh_with_retry(&self.retry).await
    }

    /// Start the background cycles.
    pub fn start(&mut self) {
        self.scheduler.start();
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Stop the background cycles. Reads keep working afterwards.
    pub async fn stop(&mut self) {
        self.scheduler.stop().await;
    }
}
