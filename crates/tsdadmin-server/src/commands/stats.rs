use async_trait::async_trait;

use tsdadmin_core::{Result, StatsCollector};

use crate::collab::StatsSource;
use crate::dispatch::{Command, Services};
use crate::query::HttpQuery;

/// `/stats`: every component's metrics, one line each.
pub struct Stats;

#[async_trait]
impl Command for Stats {
    fn name(&self) -> &'static str {
        "stats"
    }

    async fn process(&self, svc: &Services, query: &mut HttpQuery) -> Result<()> {
        let mut buf = String::with_capacity(2048);
        {
            let mut collector = StatsCollector::new(&svc.stats.prefix, &svc.stats.host, &mut buf);
            collector.add_host_tag();
            // Order is part of the output contract.
            svc.connections.collect_stats(&mut collector);
            svc.rpc.collect_stats(&mut collector);
            svc.counters.collect_stats(&mut collector);
            svc.storage.collect_stats(&mut collector);
        }
        query.send_reply(buf);
        Ok(())
    }
}
