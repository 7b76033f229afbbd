// src/pipeline/scheduler.rs

//! Background refresh scheduler.
//!
//! Two independent cycles share one [`Refresher`]:
//!
//! | cycle    | first fire     | cadence                      | on failure             |
//! |----------|----------------|------------------------------|------------------------|
//! | periodic | after warm-up  | `refresh_interval_secs`      | log, wait for next tick |
//! | full     | immediately    | `full_refresh_frequency - 5m`| retry, then log        |
//!
//! Neither cycle coordinates with the other; the store keeps whichever
//! snapshot was published last. [`RefreshScheduler::stop`] cancels both
//! cycles, including a refresh that is still in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::models::CachingConfig;

use super::refresh::Refresher;
use super::retry::RetryPolicy;

/// Timing for both cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub warmup_delay: Duration,
    pub refresh_interval: Duration,
    pub full_refresh_interval: Duration,
    pub retry: RetryPolicy,
}

impl Schedule {
    pub fn from_config(config: &CachingConfig) -> Self {
        Self {
            warmup_delay: config.warmup_delay(),
            refresh_interval: config.refresh_interval(),
            full_refresh_interval: config.full_refresh_interval(),
            retry: RetryPolicy::from_config(config),
        }
    }
}

#[derive(Debug, Clone)]
enum Cycle {
    Periodic,
    Full(RetryPolicy),
}

impl Cycle {
    fn name(&self) -> &'static str {
        match self {
            Cycle::Periodic => "Periodic refresh",
            Cycle::Full(_) => "Full refresh",
        }
    }

    /// Run one tick. Failures are logged and swallowed here.
    async fn run_once(&self, refresher: &Refresher) {
        match self {
            Cycle::Periodic => {
                log::debug!("Periodic refresh starting");
                match refresher.refresh().await {
                    Ok(report) => log::debug!(
                        "Periodic refresh finished: {}/{} items in {:?}",
                        report.fetched,
                        report.requested,
                        report.elapsed
                    ),
                    Err(e) => log::error!("Periodic refresh failed: {}", e),
                }
            }
            Cycle::Full(policy) => {
                log::info!("Full refresh starting");
                match refresher.refresh_with_retry(policy).await {
                    Ok(report) => log::info!(
                        "Full refresh finished: {}/{} items after {} attempt(s)",
                        report.fetched,
                        report.requested,
                        report.attempts
                    ),
                    Err(e) => log::error!("Full refresh abandoned: {}", e),
                }
            }
        }
    }
}

/// Drives the periodic and full refresh cycles.
pub struct RefreshScheduler {
    refresher: Arc<Refresher>,
    schedule: Schedule,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(refresher: Arc<Refresher>, schedule: Schedule) -> Self {
        Self {
            refresher,
            schedule,
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Spawn both cycles on the current tokio runtime.
    pub fn start(&mut self) {
        if self.is_running() {
            log::warn!("Refresh scheduler already running");
            return;
        }
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }

        log::info!(
            "Refresh scheduler starting: periodic every {:?} after {:?}, full every {:?}",
            self.schedule.refresh_interval,
            self.schedule.warmup_delay,
            self.schedule.full_refresh_interval
        );

        self.tasks.push(tokio::spawn(run_cycle(
            Cycle::Periodic,
            Arc::clone(&self.refresher),
            self.schedule.warmup_delay,
            self.schedule.refresh_interval,
            self.cancel.child_token(),
        )));
        self.tasks.push(tokio::spawn(run_cycle(
            Cycle::Full(self.schedule.retry.clone()),
            Arc::clone(&self.refresher),
            Duration::ZERO,
            self.schedule.full_refresh_interval,
            self.cancel.child_token(),
        )));
    }

    /// Cancel both cycles and wait for their tasks to finish.
    pub async fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                log::error!("Refresh task ended abnormally: {}", e);
            }
        }
        log::info!("Refresh scheduler stopped");
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_cycle(
    cycle: Cycle,
    refresher: Arc<Refresher>,
    first_delay: Duration,
    period: Duration,
    cancel: CancellationToken,
) {
    // `interval_at` panics on a zero period.
    let period = period.max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + first_delay, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            _ = cancel.cancelled() => {
                log::info!("{} cancelled while in flight", cycle.name());
                break;
            }
            _ = cycle.run_once(&refresher) => {}
        }
    }
    log::debug!("{} cycle exited", cycle.name());
}
