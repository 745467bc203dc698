//! Lightweight in-process metrics for the HTTP admin front end.
//!
//! Counters are plain atomics, read only when the `stats` command asks the
//! dispatcher to report them.

pub mod metrics;

pub use metrics::{HttpCounters, LatencyHistogram};
