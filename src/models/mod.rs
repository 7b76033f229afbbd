// src/models/mod.rs

//! Domain models for the refresh engine.
//!
//! This module contains the data structures shared across the engine,
//! organized by their primary purpose.

mod config;
mod item;
mod snapshot;

// Re-export all public types
pub use config::{CachingConfig, ClientConfig, Config, LoggingConfig, SourceConfig};
pub use item::{Item, ItemView, parse_index};
pub use snapshot::Snapshot;
