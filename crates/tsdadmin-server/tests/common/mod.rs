#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use tsdadmin_core::{AdminError, BuildInfo, RepoStatus, Result, StatsCollector};
use tsdadmin_server::collab::{
    ConnHandle, ConnectionManager, NetworkResources, StatsSource, StorageEngine,
};
use tsdadmin_server::dispatch::{Command, CommandTable, RequestDispatcher, Services, StatsSettings};
use tsdadmin_server::obs::HttpCounters;
use tsdadmin_server::query::HttpQuery;

#[derive(Default)]
pub struct FakeStorage {
    pub flushes: AtomicU64,
    pub fail: bool,
}

impl StatsSource for FakeStorage {
    fn collect_stats(&self, collector: &mut StatsCollector<'_>) {
        collector.record("storage.fake", self.flushes.load(Ordering::SeqCst));
    }
}

impl StorageEngine for FakeStorage {
    fn flush(&self) -> Result<()> {
        if self.fail {
            return Err(AdminError::internal("storage unreachable"));
        }
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeConnections {
    pub closed: AtomicU64,
}

impl StatsSource for FakeConnections {
    fn collect_stats(&self, collector: &mut StatsCollector<'_>) {
        collector.record("connectionmgr.fake", self.closed.load(Ordering::SeqCst));
    }
}

impl ConnectionManager for FakeConnections {
    fn close_all_connections(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeRpc;

impl StatsSource for FakeRpc {
    fn collect_stats(&self, collector: &mut StatsCollector<'_>) {
        collector.record_tagged("rpc.fake", 0, ("type", "telnet"));
    }
}

/// Records the releasing thread, then blocks until the test opens the gate.
pub struct GatedRelease {
    pub thread: Mutex<Option<(ThreadId, Option<String>)>>,
    pub done: AtomicBool,
    gate: Mutex<mpsc::Receiver<()>>,
}

impl GatedRelease {
    pub fn new() -> (Arc<Self>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let release = Arc::new(Self {
            thread: Mutex::new(None),
            done: AtomicBool::new(false),
            gate: Mutex::new(rx),
        });
        (release, tx)
    }

    pub fn was_called(&self) -> bool {
        self.thread.lock().unwrap().is_some()
    }
}

impl NetworkResources for GatedRelease {
    fn release(&self) {
        let current = std::thread::current();
        *self.thread.lock().unwrap() = Some((current.id(), current.name().map(str::to_owned)));
        let _ = self.gate.lock().unwrap().recv_timeout(Duration::from_secs(5));
        self.done.store(true, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub storage: Arc<FakeStorage>,
    pub connections: Arc<FakeConnections>,
    pub release: Arc<GatedRelease>,
    pub gate: mpsc::Sender<()>,
    pub dispatcher: RequestDispatcher,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: "1.2.3",
        short_revision: "abc1234",
        full_revision: "abc1234abc1234abc1234abc1234abc1234abc12",
        timestamp: 1_700_000_000,
        repo_status: RepoStatus::Modified,
        user: "builder",
        host: "buildhost",
        repo: "/src/tsdadmin",
    }
}

pub fn harness(extra: Vec<Arc<dyn Command>>) -> Harness {
    harness_with_storage(FakeStorage::default(), extra)
}

pub fn harness_with_storage(storage: FakeStorage, extra: Vec<Arc<dyn Command>>) -> Harness {
    let storage = Arc::new(storage);
    let connections = Arc::new(FakeConnections::default());
    let (release, gate) = GatedRelease::new();
    let services = Services {
        storage: storage.clone(),
        connections: connections.clone(),
        rpc: Arc::new(FakeRpc),
        counters: Arc::new(HttpCounters::new()),
        network: release.clone(),
        build: Arc::new(build_info()),
        stats: StatsSettings {
            prefix: "tsd".into(),
            host: "testhost".into(),
        },
    };
    let mut commands: Vec<Arc<dyn Command>> = vec![
        Arc::new(tsdadmin_server::commands::Shutdown),
        Arc::new(tsdadmin_server::commands::Stats),
        Arc::new(tsdadmin_server::commands::Version),
    ];
    commands.extend(extra);
    let table = CommandTable::new(commands).expect("table");
    Harness {
        storage,
        connections,
        release,
        gate,
        dispatcher: RequestDispatcher::new(table, services),
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

pub fn chunked(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("transfer-encoding", "chunked")
        .body(Body::from("5\r\nhello\r\n0\r\n\r\n"))
        .expect("request")
}

pub fn conn() -> ConnHandle {
    ConnHandle {
        id: 7,
        peer: "127.0.0.1:40000".parse().ok(),
    }
}

pub async fn body_string(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

/// Value of the first `<prefix>.<name>` line in a stats dump.
pub fn stat(dump: &str, name: &str) -> Option<u64> {
    dump.lines().find_map(|line| {
        let mut parts = line.split(' ');
        let metric = parts.next()?;
        if metric.split_once('.').map(|(_, m)| m) != Some(name) {
            return None;
        }
        let _ts = parts.next()?;
        parts.next()?.parse().ok()
    })
}

/// `(http.queries, http.exceptions)` as reported by the stats export.
pub fn counters(d: &RequestDispatcher) -> (u64, u64) {
    let mut buf = String::new();
    let mut c = StatsCollector::new("tsd", "h", &mut buf);
    d.services().counters.collect_stats(&mut c);
    (
        stat(&buf, "http.queries").expect("queries"),
        stat(&buf, "http.exceptions").expect("exceptions"),
    )
}

// ---- test commands ----

pub struct Failing;

#[async_trait]
impl Command for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }
    async fn process(&self, _svc: &Services, _query: &mut HttpQuery) -> Result<()> {
        Err(AdminError::internal("backend exploded"))
    }
}

pub struct Rejecting;

#[async_trait]
impl Command for Rejecting {
    fn name(&self) -> &'static str {
        "rejecting"
    }
    async fn process(&self, _svc: &Services, query: &mut HttpQuery) -> Result<()> {
        query.send_reply("partial");
        Err(AdminError::bad_request("Missing parameter <code>m</code>"))
    }
}

pub struct Panicking;

#[async_trait]
impl Command for Panicking {
    fn name(&self) -> &'static str {
        "panicking"
    }
    async fn process(&self, _svc: &Services, _query: &mut HttpQuery) -> Result<()> {
        panic!("handler bug");
    }
}

pub struct Silent;

#[async_trait]
impl Command for Silent {
    fn name(&self) -> &'static str {
        "silent"
    }
    async fn process(&self, _svc: &Services, _query: &mut HttpQuery) -> Result<()> {
        Ok(())
    }
}

pub fn misbehaving() -> Vec<Arc<dyn Command>> {
    vec![
        Arc::new(Failing),
        Arc::new(Rejecting),
        Arc::new(Panicking),
        Arc::new(Silent),
    ]
}
