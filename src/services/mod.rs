//! Service layer for the refresh engine.
//!
//! This module contains the business logic for:
//! - Talking to the remote API (`RemoteItemSource`, `HackerNewsSource`)
//! - Fan-out detail fetching (`ConcurrentFetcher`)
//! - Top-N ranking (`RankedQuery`)

mod fetcher;
mod ranking;
pub(crate) mod source;

pub use fetcher::ConcurrentFetcher;
pub use ranking::{RankedQuery, TopItems, rank};
pub use source::{HackerNewsSource, RemoteItemSource};
