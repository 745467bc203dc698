#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;

use axum::http::{header, StatusCode};
use futures_util::future::join_all;

use common::*;

#[tokio::test]
async fn version_text_is_two_lines() {
    let h = harness(vec![]);
    let resp = h.dispatcher.dispatch(get("/version"), conn()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
    let body = body_string(resp).await;
    assert!(body.ends_with('\n'));
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| !l.is_empty()));
    assert_eq!(lines[0], "tsdadmin 1.2.3 built at revision abc1234 (MODIFIED)");
    assert_eq!(lines[1], "Built on 1700000000 by builder@buildhost:/src/tsdadmin");
}

#[tokio::test]
async fn version_json_has_exactly_seven_fields() {
    let h = harness(vec![]);
    for uri in ["/version?json", "/version/json", "/version?format=json"] {
        let resp = h.dispatcher.dispatch(get(uri), conn()).await;
        assert_eq!(resp.status(), StatusCode::OK, "uri={uri}");
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let body = body_string(resp).await;
        assert_eq!(body.lines().count(), 1);
        let v: serde_json::Value = serde_json::from_str(&body).expect("json");
        let obj = v.as_object().expect("object");
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["full_revision", "host", "repo", "repo_status", "short_revision", "timestamp", "user"]
        );
        assert!(obj["timestamp"].is_u64());
        for k in ["full_revision", "host", "repo", "repo_status", "short_revision", "user"] {
            assert!(obj[k].is_string(), "{k}");
        }
        assert_eq!(obj["repo_status"], "MODIFIED");
    }
}

#[tokio::test]
async fn unregistered_key_is_404_and_not_an_exception() {
    let h = harness(vec![]);
    for uri in ["/nope", "/", "/?stats", "/statsx/y"] {
        let resp = h.dispatcher.dispatch(get(uri), conn()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "uri={uri}");
    }
    assert_eq!(counters(&h.dispatcher), (4, 0));
}

#[tokio::test]
async fn chunked_request_is_400_for_any_key() {
    let h = harness(vec![]);
    for uri in ["/stats", "/version", "/diediedie", "/nope"] {
        let resp = h.dispatcher.dispatch(chunked(uri), conn()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "uri={uri}");
        assert!(body_string(resp).await.contains("Chunked request not supported."));
    }
    assert_eq!(counters(&h.dispatcher), (4, 0));
    // the guard runs before routing: shutdown never started
    assert_eq!(h.connections.closed.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn uri_without_leading_slash_is_400() {
    let h = harness(vec![]);
    let resp = h.dispatcher.dispatch(get("http://example.com/stats"), conn()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_string(resp).await;
    assert!(body.contains("doesn't start with a slash"));
    assert!(body.contains("<code>http://example.com/stats</code>"));
    assert_eq!(counters(&h.dispatcher), (1, 0));
}

#[tokio::test]
async fn command_client_error_overrides_partial_reply() {
    let h = harness(misbehaving());
    let resp = h.dispatcher.dispatch(get("/rejecting"), conn()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_string(resp).await;
    assert!(body.contains("Missing parameter <code>m</code>"));
    assert!(!body.contains("partial"));
    assert_eq!(counters(&h.dispatcher), (1, 0));
}

#[tokio::test]
async fn unclassified_failures_are_500_and_counted_once() {
    let h = harness(misbehaving());
    for (uri, needle) in [
        ("/failing", "backend exploded"),
        ("/panicking", "handler bug"),
        ("/silent", "without a reply"),
    ] {
        let resp = h.dispatcher.dispatch(get(uri), conn()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "uri={uri}");
        let body = body_string(resp).await;
        assert!(body.contains(needle), "uri={uri} body={body}");
        assert!(body.contains("INTERNAL"));
    }
    assert_eq!(counters(&h.dispatcher), (3, 3));
}

#[tokio::test]
async fn every_outcome_counts_one_query() {
    let h = harness(misbehaving());
    let plan = [
        ("/version", 0),
        ("/nope", 0),
        ("/rejecting", 0),
        ("/failing", 1),
        ("/stats", 0),
        ("/panicking", 1),
    ];
    let mut expected = (0, 0);
    for (uri, exc) in plan {
        h.dispatcher.dispatch(get(uri), conn()).await;
        expected.0 += 1;
        expected.1 += exc;
        assert_eq!(counters(&h.dispatcher), expected, "after {uri}");
    }
    h.dispatcher.dispatch(chunked("/version"), conn()).await;
    assert_eq!(counters(&h.dispatcher), (7, 2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_table_and_counters() {
    let h = Arc::new(harness(misbehaving()));
    let uris = ["/version", "/stats", "/failing", "/nope", "/rejecting"];
    let futs = (0..100).map(|i| {
        let h = Arc::clone(&h);
        let uri = uris[i % uris.len()];
        tokio::spawn(async move { h.dispatcher.dispatch(get(uri), conn()).await.status() })
    });
    let statuses: Vec<StatusCode> = join_all(futs)
        .await
        .into_iter()
        .map(|r| r.expect("join"))
        .collect();
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 40);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::NOT_FOUND).count(), 20);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count(), 20);
    assert_eq!(counters(&h.dispatcher), (100, 20));
}

#[tokio::test]
async fn stats_lists_collaborators_in_fixed_order() {
    let h = harness(misbehaving());
    h.dispatcher.dispatch(get("/version"), conn()).await;
    h.dispatcher.dispatch(get("/failing"), conn()).await;

    let first = body_string(h.dispatcher.dispatch(get("/stats"), conn()).await).await;
    let metrics: Vec<&str> = first
        .lines()
        .map(|l| l.split(' ').next().unwrap())
        .collect();
    assert_eq!(
        metrics,
        [
            "tsd.connectionmgr.fake",
            "tsd.rpc.fake",
            "tsd.http.queries",
            "tsd.http.exceptions",
            "tsd.http.latency_50pct",
            "tsd.http.latency_75pct",
            "tsd.http.latency_90pct",
            "tsd.http.latency_95pct",
            "tsd.storage.fake",
        ]
    );
    assert!(first.lines().all(|l| l.ends_with(" host=testhost")));
    assert!(first.contains(" type=telnet host=testhost"));
    assert_eq!(stat(&first, "http.queries"), Some(2));
    assert_eq!(stat(&first, "http.exceptions"), Some(1));

    let second = body_string(h.dispatcher.dispatch(get("/stats"), conn()).await).await;
    let again: Vec<&str> = second.lines().map(|l| l.split(' ').next().unwrap()).collect();
    assert_eq!(metrics, again);
    assert_eq!(stat(&second, "http.queries"), Some(3));
}

#[tokio::test]
async fn lookups_are_stable() {
    let h = harness(vec![]);
    let table = h.dispatcher.table();
    for key in ["diediedie", "stats", "version"] {
        let a = table.get(key).expect(key);
        let b = table.get(key).expect(key);
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(a.name(), key);
    }
    assert_eq!(table.names().len(), 3);
}
