//! Request counters and latency histogram of the request dispatcher.
//!
//! Counters only ever grow: there is no decrement and no reset. Histogram
//! buckets are fixed in microseconds to avoid floating point math.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tsdadmin_core::StatsCollector;

use crate::collab::StatsSource;

// Fixed bucket upper bounds in microseconds:
// 100us, 500us, 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s, 5s, 10s, 60s
const BUCKETS_MICROS: [u64; 12] = [
    100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000, 5_000_000, 10_000_000,
    60_000_000,
];

const REPORTED_PERCENTILES: [u64; 4] = [50, 75, 90, 95];

/// Non-cumulative bucket counts; anything above the last bound lands in
/// `overflow`.
pub struct LatencyHistogram {
    buckets: [AtomicU64; BUCKETS_MICROS.len()],
    overflow: AtomicU64,
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self {
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
            overflow: AtomicU64::new(0),
        }
    }
}

impl LatencyHistogram {
    pub fn observe(&self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        match BUCKETS_MICROS.iter().position(|&b| micros <= b) {
            Some(i) => self.buckets[i].fetch_add(1, Ordering::Relaxed),
            None => self.overflow.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Upper bound (microseconds) of the bucket holding the `pct`th
    /// percentile, or 0 when nothing was observed. Observations beyond the
    /// last bucket report the last bound.
    pub fn percentile_micros(&self, pct: u64) -> u64 {
        let total: u64 = self
            .buckets
            .iter()
            .map(|b| b.load(Ordering::Relaxed))
            .sum::<u64>()
            + self.overflow.load(Ordering::Relaxed);
        if total == 0 {
            return 0;
        }
        let rank = (total * pct.min(100)).div_ceil(100).max(1);
        let mut seen = 0;
        for (i, bucket) in self.buckets.iter().enumerate() {
            seen += bucket.load(Ordering::Relaxed);
            if seen >= rank {
                return BUCKETS_MICROS[i];
            }
        }
        BUCKETS_MICROS[BUCKETS_MICROS.len() - 1]
    }
}

/// Process-wide dispatcher counters, shared by reference with whoever needs
/// to bump or report them.
#[derive(Default)]
pub struct HttpCounters {
    queries_received: AtomicU64,
    exceptions_caught: AtomicU64,
    latency: LatencyHistogram,
}

impl HttpCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn query_received(&self, elapsed: Duration) {
        self.queries_received.fetch_add(1, Ordering::Relaxed);
        self.latency.observe(elapsed);
    }

    pub(crate) fn exception_caught(&self) {
        self.exceptions_caught.fetch_add(1, Ordering::Relaxed);
    }
}

impl StatsSource for HttpCounters {
    fn collect_stats(&self, collector: &mut StatsCollector<'_>) {
        collector.record("http.queries", self.queries_received.load(Ordering::Relaxed));
        collector.record("http.exceptions", self.exceptions_caught.load(Ordering::Relaxed));
        for pct in REPORTED_PERCENTILES {
            let millis = self.latency.percentile_micros(pct).div_ceil(1000);
            collector.record_tagged(&format!("http.latency_{pct}pct"), millis, ("type", "all"));
        }
    }
}
