//! Stats slot of the line-oriented text protocol handler.
//!
//! The text protocol is served by a separate component that reports its own
//! counters through [`StatsSource`]; it is handed to
//! [`crate::app_state::AppState::with_text_rpc`]. A standalone admin listener
//! has none and uses [`NoTextRpc`].

use tsdadmin_core::StatsCollector;

use super::StatsSource;

/// Stands in for an absent text protocol handler: reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTextRpc;

impl StatsSource for NoTextRpc {
    fn collect_stats(&self, _collector: &mut StatsCollector<'_>) {}
}
