//! Refresh pipeline.
//!
//! - `refresh`: One fetch-and-publish pass (`Refresher`)
//! - `retry`: Bounded retry with backoff (`RetryPolicy`)
//! - `scheduler`: Periodic and full refresh cycles (`RefreshScheduler`)

pub mod refresh;
pub mod retry;
pub mod scheduler;

pub use refresh::{RefreshReport, Refresher};
pub use retry::{Attempted, RetryPolicy};
pub use scheduler::{RefreshScheduler, Schedule};
