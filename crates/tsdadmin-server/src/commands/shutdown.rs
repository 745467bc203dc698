use std::sync::Arc;
use std::thread;

use async_trait::async_trait;

use tsdadmin_core::Result;

use crate::collab::{ConnectionManager, NetworkResources, StorageEngine};
use crate::dispatch::{Command, Services};
use crate::query::HttpQuery;

/// `/diediedie`: graceful shutdown.
pub struct Shutdown;

#[async_trait]
impl Command for Shutdown {
    fn name(&self) -> &'static str {
        "diediedie"
    }

    async fn process(&self, svc: &Services, query: &mut HttpQuery) -> Result<()> {
        tracing::warn!(conn = %query.connection(), "shutdown requested");
        let page = query.make_page(
            "TSD Exiting",
            "You killed me",
            "Cleaning up and exiting now.",
        );
        query.send_html(page);

        svc.connections.close_all_connections();
        // Commit whatever is still only in RAM.
        svc.storage.flush()?;

        // Releasing the network resources from a task they drive deadlocks,
        // so hand it to a fresh OS thread and don't wait for it.
        let network = Arc::clone(&svc.network);
        thread::Builder::new()
            .name("release-network".into())
            .spawn(move || network.release())?;
        Ok(())
    }
}
