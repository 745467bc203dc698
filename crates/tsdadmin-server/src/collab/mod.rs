//! Collaborators administered by the command router.
//!
//! The traits are the only surface the commands see. The concrete types are
//! the in-process implementations wired by [`crate::app_state::AppState`].

pub mod connections;
pub mod rpc;
pub mod storage;

use tsdadmin_core::{Result, StatsCollector};

pub use connections::{ConnGuard, ConnHandle, ConnectionRegistry};
pub use rpc::NoTextRpc;
pub use storage::{DataPoint, MemoryStore};

/// Anything that can report its own metrics into a collector.
pub trait StatsSource: Send + Sync {
    fn collect_stats(&self, collector: &mut StatsCollector<'_>);
}

/// The time-series storage engine.
pub trait StorageEngine: StatsSource {
    /// Persist whatever is still only buffered in memory.
    fn flush(&self) -> Result<()>;
}

pub trait ConnectionManager: StatsSource {
    fn close_all_connections(&self);
}

/// Network-event-processing resources of the running server.
///
/// `release` may block and must never be called from a task that is itself
/// driven by those resources.
pub trait NetworkResources: Send + Sync {
    fn release(&self);
}
