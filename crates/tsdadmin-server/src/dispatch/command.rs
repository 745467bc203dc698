use std::sync::Arc;

use async_trait::async_trait;

use tsdadmin_core::{BuildInfo, Result};

use crate::collab::{ConnectionManager, NetworkResources, StatsSource, StorageEngine};
use crate::obs::HttpCounters;
use crate::query::HttpQuery;

/// A stateless admin command bound to one routing key.
///
/// One instance serves every request for its key, concurrently; it must not
/// keep per-request state. The command answers through `query`; returning
/// [`tsdadmin_core::AdminError::BadRequest`] yields a 400, any other error a 500.
#[async_trait]
pub trait Command: Send + Sync {
    /// Routing key, i.e. the first path segment this command answers.
    fn name(&self) -> &'static str;
    async fn process(&self, svc: &Services, query: &mut HttpQuery) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSettings {
    pub prefix: String,
    pub host: String,
}

/// Collaborators the commands act upon.
#[derive(Clone)]
pub struct Services {
    pub storage: Arc<dyn StorageEngine>,
    pub connections: Arc<dyn ConnectionManager>,
    /// Text protocol handler stats.
    pub rpc: Arc<dyn StatsSource>,
    pub counters: Arc<HttpCounters>,
    pub network: Arc<dyn NetworkResources>,
    pub build: Arc<BuildInfo>,
    pub stats: StatsSettings,
}
