//! Integration tests for the feed adapters over real HTTP.
//!
//! A local Axum server on an ephemeral port plays every upstream feed,
//! including a slow one, a failing one and one that returns garbage.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::{Value, json};
use shdwnet_feeds::{EndpointsConfig, FeedSet, FeedsConfig, LexiconConfig};
use shdwnet_types::{FeedStatus, FlareClass, RawMetrics, SourceId};

async fn xrays() -> Json<Value> {
    Json(json!([
        {"time_tag": "2024-05-10T21:00:00Z", "flux": 3.1e-6, "energy": "0.1-0.8nm"},
        {"time_tag": "2024-05-10T21:01:00Z", "flux": 2.4e-5, "energy": "0.1-0.8nm"}
    ]))
}

async fn kindex() -> Json<Value> {
    Json(json!([
        ["time_tag", "Kp", "a_running", "station_count"],
        ["2024-05-10 18:00:00.000", "5.33", "56", "8"],
        ["2024-05-10 21:00:00.000", "6.00", "80", "8"]
    ]))
}

async fn plasma() -> Json<Value> {
    Json(json!([
        ["time_tag", "density", "speed", "temperature"],
        ["2024-05-10 21:00:00.000", "4.50", "500.0", "150000"]
    ]))
}

async fn quakes() -> Json<Value> {
    Json(json!({
        "type": "FeatureCollection",
        "features": [
            {"properties": {"mag": 2.1}},
            {"properties": {"mag": 6.0}},
            {"properties": {"mag": 4.4}}
        ]
    }))
}

async fn listing() -> Json<Value> {
    Json(json!({
        "data": {"children": [
            {"data": {"title": "Breaking: storm hits grid", "score": 12000}},
            {"data": {"title": "Local bakery wins award", "score": 800}}
        ]}
    }))
}

async fn ids() -> Json<Value> {
    Json(json!([41_000_001, 41_000_002, 41_000_003]))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!([["t", "9"]]))
}

async fn unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

async fn garbage() -> &'static str {
    "<html>maintenance</html>"
}

async fn spawn_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/xrays", get(xrays))
        .route("/kindex", get(kindex))
        .route("/plasma", get(plasma))
        .route("/quakes", get(quakes))
        .route("/listing", get(listing))
        .route("/ids", get(ids))
        .route("/slow", get(slow))
        .route("/unavailable", get(unavailable))
        .route("/garbage", get(garbage));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn healthy_endpoints(addr: SocketAddr) -> EndpointsConfig {
    EndpointsConfig {
        solar_xray: format!("http://{addr}/xrays"),
        kindex: format!("http://{addr}/kindex"),
        plasma: format!("http://{addr}/plasma"),
        seismic: format!("http://{addr}/quakes"),
        social: format!("http://{addr}/listing"),
        discussion: format!("http://{addr}/ids"),
    }
}

fn feed_set(endpoints: EndpointsConfig, enabled: Vec<SourceId>, timeout_ms: u64) -> FeedSet {
    let feeds = FeedsConfig {
        timeout_ms,
        enabled,
        endpoints,
        ..FeedsConfig::default()
    };
    FeedSet::from_config(&feeds, &LexiconConfig::default()).unwrap()
}

#[tokio::test]
async fn healthy_feeds_read_in_configured_order() {
    let addr = spawn_upstream().await;
    let set = feed_set(healthy_endpoints(addr), SourceId::ALL.to_vec(), 2_000);

    let readings = set.collect().await;

    let sources: Vec<SourceId> = readings.iter().map(|r| r.source).collect();
    assert_eq!(sources, SourceId::ALL.to_vec());
    for reading in &readings {
        assert_eq!(reading.status, FeedStatus::Ok, "{:?}", reading.failure);
        assert!((0.0..=1.0).contains(&reading.normalized_signal));
        assert!(reading.failure.is_none());
    }

    let solar = &readings[0];
    assert!((solar.normalized_signal - 0.8).abs() < f64::EPSILON);
    assert!(matches!(
        solar.raw_metrics,
        Some(RawMetrics::SolarXray { flare_class: FlareClass::M, .. })
    ));

    let kindex = &readings[1];
    assert!((kindex.normalized_signal - 6.0 / 9.0).abs() < 1e-12);

    let seismic = &readings[3];
    assert!((seismic.normalized_signal - 0.69).abs() < 1e-9);
}

#[tokio::test]
async fn slow_feed_falls_back_on_deadline() {
    let addr = spawn_upstream().await;
    let endpoints = EndpointsConfig {
        kindex: format!("http://{addr}/slow"),
        ..healthy_endpoints(addr)
    };
    let set = feed_set(endpoints, vec![SourceId::KIndex, SourceId::Seismic], 150);

    let readings = set.collect().await;

    assert_eq!(readings.len(), 2);
    let kindex = &readings[0];
    assert_eq!(kindex.status, FeedStatus::Unavailable);
    assert!((kindex.normalized_signal - 0.2).abs() < f64::EPSILON);
    assert!(kindex.failure.as_deref().unwrap().contains("timed out"));
    assert_eq!(readings[1].status, FeedStatus::Ok);
}

#[tokio::test]
async fn error_status_falls_back() {
    let addr = spawn_upstream().await;
    let endpoints = EndpointsConfig {
        social: format!("http://{addr}/unavailable"),
        ..healthy_endpoints(addr)
    };
    let set = feed_set(endpoints, vec![SourceId::Social], 2_000);

    let readings = set.collect().await;

    let social = &readings[0];
    assert_eq!(social.status, FeedStatus::Unavailable);
    assert!((social.normalized_signal - 0.3).abs() < f64::EPSILON);
    assert!(social.failure.as_deref().unwrap().contains("503"));
    assert!(social.raw_metrics.is_none());
}

#[tokio::test]
async fn non_json_body_falls_back() {
    let addr = spawn_upstream().await;
    let endpoints = EndpointsConfig {
        plasma: format!("http://{addr}/garbage"),
        ..healthy_endpoints(addr)
    };
    let set = feed_set(endpoints, vec![SourceId::Plasma], 2_000);

    let readings = set.collect().await;

    let plasma = &readings[0];
    assert_eq!(plasma.status, FeedStatus::Unavailable);
    assert!((plasma.normalized_signal - 0.4).abs() < f64::EPSILON);
    assert!(matches!(
        plasma.raw_metrics,
        Some(RawMetrics::Plasma { sample: None, .. })
    ));
}

#[tokio::test]
async fn unreachable_host_falls_back() {
    let closed = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let set = feed_set(healthy_endpoints(closed), SourceId::ALL.to_vec(), 2_000);

    let readings = set.collect().await;

    assert_eq!(readings.len(), SourceId::ALL.len());
    for reading in readings {
        assert_eq!(reading.status, FeedStatus::Unavailable);
        assert!(
            (reading.normalized_signal - reading.source.fallback_signal()).abs() < f64::EPSILON
        );
    }
}
