//! tsdadmin core: transport-agnostic primitives for the admin command router.
//!
//! This crate defines the error taxonomy, the routing-key extraction rule,
//! the stats line collector and the build metadata shared by the server and
//! its collaborators. It carries no HTTP or runtime dependencies so the same
//! rules can be reused by any front end.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `AdminError`/`Result` so a malformed
//! request can never take the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod build_info;
pub mod endpoint;
pub mod error;
pub mod stats;

pub use build_info::{BuildInfo, RepoStatus};
pub use endpoint::{escape_html, extract_endpoint};
pub use error::{AdminError, ClientCode, Result};
pub use stats::StatsCollector;
