use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tsdadmin_core::{AdminError, Result, StatsCollector};

use super::{StatsSource, StorageEngine};

#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub metric: String,
    pub timestamp: u64,
    pub value: f64,
}

/// Write-behind store: points are buffered until [`StorageEngine::flush`].
#[derive(Default)]
pub struct MemoryStore {
    buffered: Mutex<Vec<DataPoint>>,
    points_flushed: AtomicU64,
    flushes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&self, metric: &str, timestamp: u64, value: f64) -> Result<()> {
        if metric.is_empty() {
            return Err(AdminError::bad_request("metric name must not be empty"));
        }
        let mut buf = self
            .buffered
            .lock()
            .map_err(|_| AdminError::internal("storage buffer poisoned"))?;
        buf.push(DataPoint {
            metric: metric.to_string(),
            timestamp,
            value,
        });
        Ok(())
    }

    pub fn buffered_len(&self) -> usize {
        self.buffered.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn points_flushed(&self) -> u64 {
        self.points_flushed.load(Ordering::Relaxed)
    }
}

impl StatsSource for MemoryStore {
    fn collect_stats(&self, collector: &mut StatsCollector<'_>) {
        collector.record("storage.points_buffered", self.buffered_len() as u64);
        collector.record("storage.points_flushed", self.points_flushed());
        collector.record("storage.flushes", self.flushes.load(Ordering::Relaxed));
    }
}

impl StorageEngine for MemoryStore {
    fn flush(&self) -> Result<()> {
        let drained = {
            let mut buf = self
                .buffered
                .lock()
                .map_err(|_| AdminError::internal("storage buffer poisoned"))?;
            std::mem::take(&mut *buf)
        };
        self.points_flushed.fetch_add(drained.len() as u64, Ordering::Relaxed);
        self.flushes.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(points = drained.len(), "storage flushed");
        Ok(())
    }
}
