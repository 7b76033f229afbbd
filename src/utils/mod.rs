//! Utility functions and helpers.

pub mod clock;
pub mod http;
#[cfg(test)]
pub(crate) mod log_capture;

pub use clock::{Clock, SystemClock};
