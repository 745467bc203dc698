//! Connection bookkeeping for the admin listener.
//!
//! Every accepted TCP connection holds one [`ConnGuard`] for as long as it
//! stays open, shared by all requests it carries; dropping the guard
//! unregisters it. `close_all_connections` flips a watch signal that the
//! server uses as its graceful-shutdown trigger: the listener stops accepting
//! and open connections are drained.

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use tsdadmin_core::StatsCollector;

use super::{ConnectionManager, StatsSource};

/// Identity of the connection a request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnHandle {
    pub id: u64,
    pub peer: Option<SocketAddr>,
}

impl fmt::Display for ConnHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.peer {
            Some(peer) => write!(f, "[id: {:#010x}, {}]", self.id, peer),
            None => write!(f, "[id: {:#010x}, unknown peer]", self.id),
        }
    }
}

pub struct ConnectionRegistry {
    open: DashMap<u64, Option<SocketAddr>>,
    next_id: AtomicU64,
    established: AtomicU64,
    closing: watch::Sender<bool>,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        let (closing, _) = watch::channel(false);
        Self {
            open: DashMap::new(),
            next_id: AtomicU64::new(1),
            established: AtomicU64::new(0),
            closing,
        }
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(self: &Arc<Self>, peer: Option<SocketAddr>) -> ConnGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.open.insert(id, peer);
        self.established.fetch_add(1, Ordering::Relaxed);
        ConnGuard {
            registry: Arc::clone(self),
            handle: ConnHandle { id, peer },
        }
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn is_closing(&self) -> bool {
        *self.closing.borrow()
    }

    /// Resolves once `close_all_connections` has been called.
    pub fn closed(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.closing.subscribe();
        async move {
            let _ = rx.wait_for(|closing| *closing).await;
        }
    }
}

impl StatsSource for ConnectionRegistry {
    fn collect_stats(&self, collector: &mut StatsCollector<'_>) {
        collector.record("connectionmgr.connections", self.open_count() as u64);
        collector.record("connectionmgr.established", self.established.load(Ordering::Relaxed));
    }
}

impl ConnectionManager for ConnectionRegistry {
    fn close_all_connections(&self) {
        if self.closing.send_replace(true) {
            return;
        }
        let open = self.open.len();
        self.open.clear();
        tracing::info!(open, "closing all connections");
    }
}

/// Registration of one open connection; unregisters on drop.
pub struct ConnGuard {
    registry: Arc<ConnectionRegistry>,
    handle: ConnHandle,
}

impl ConnGuard {
    pub fn handle(&self) -> ConnHandle {
        self.handle
    }
}

impl Drop for ConnGuard {
    fn drop(&mut self) {
        self.registry.open.remove(&self.handle.id);
    }
}
