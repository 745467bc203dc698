//! Shared application state for the tsdadmin server.
//!
//! Owns the in-process collaborators and the request dispatcher; startup
//! errors are returned instead of panicking.

use std::sync::Arc;

use tsdadmin_core::{BuildInfo, Result};

use crate::collab::{ConnectionRegistry, MemoryStore, NoTextRpc, StatsSource};
use crate::config::AdminConfig;
use crate::dispatch::{CommandTable, RequestDispatcher, Services, StatsSettings};
use crate::obs::HttpCounters;
use crate::server::ServerHandle;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    dispatcher: Arc<RequestDispatcher>,
}

struct AppStateInner {
    cfg: AdminConfig,
    connections: Arc<ConnectionRegistry>,
    storage: Arc<MemoryStore>,
    server: ServerHandle,
}

impl AppState {
    /// State for a standalone admin listener without a text protocol handler.
    pub fn new(cfg: AdminConfig) -> Result<Self> {
        Self::with_text_rpc(cfg, Arc::new(NoTextRpc))
    }

    /// `rpc` reports the text protocol handler's counters on `/stats`.
    pub fn with_text_rpc(cfg: AdminConfig, rpc: Arc<dyn StatsSource>) -> Result<Self> {
        // 1) Collaborators
        let connections = Arc::new(ConnectionRegistry::new());
        let storage = Arc::new(MemoryStore::new());
        let server = ServerHandle::new();

        // 2) Command table + dispatcher
        let services = Services {
            storage: storage.clone(),
            connections: connections.clone(),
            rpc,
            counters: Arc::new(HttpCounters::new()),
            network: Arc::new(server.clone()),
            build: Arc::new(BuildInfo::current().clone()),
            stats: StatsSettings {
                prefix: cfg.stats.prefix.clone(),
                host: cfg.stats.resolved_host(),
            },
        };
        let table = CommandTable::builtin()?;
        tracing::debug!(commands = ?table.names(), "command table built");
        let dispatcher = RequestDispatcher::new(table, services);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                connections,
                storage,
                server,
            }),
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn cfg(&self) -> &AdminConfig {
        &self.inner.cfg
    }

    pub fn dispatcher(&self) -> Arc<RequestDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn connections(&self) -> Arc<ConnectionRegistry> {
        Arc::clone(&self.inner.connections)
    }

    pub fn storage(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.inner.storage)
    }

    pub fn server_handle(&self) -> ServerHandle {
        self.inner.server.clone()
    }
}
