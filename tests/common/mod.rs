// tests/common/mod.rs
// Shared test utilities: in-memory app, request helpers, fake upstream server

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use stockroom::inventory::SqliteInventoryStore;
use stockroom::upstream::UpstreamClient;
use stockroom::{db, AppState, StockroomConfig};

/// Nothing listens here; upstream calls fail fast with a connection error.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Router over a fresh in-memory database, with upstreams at `upstream_base`.
pub async fn create_test_app_with_upstream(upstream_base: &str) -> Router {
    let pool = db::create_memory_pool().await.expect("create in-memory sqlite");
    db::run_migrations(&pool).await.expect("run migrations");

    let config = StockroomConfig {
        exchange_rate_url: format!("{upstream_base}/v6/latest/USD"),
        weather_url: format!("{upstream_base}/v1/forecast"),
        ..StockroomConfig::default()
    };

    let store = Arc::new(SqliteInventoryStore::new(pool));
    let upstream = UpstreamClient::new(
        config.exchange_rate_url.clone(),
        config.weather_url.clone(),
        Duration::from_secs(2),
    );
    let app_state = Arc::new(AppState::new(config, store.clone(), store, upstream));

    stockroom::api::create_router(app_state)
}

pub async fn create_test_app() -> Router {
    create_test_app_with_upstream(UNREACHABLE).await
}

/// Send one request and decode the JSON body (`Value::Null` when empty).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "DELETE", uri, None).await
}

/// Create a project and return its id.
pub async fn create_project(app: &Router, name: &str) -> i64 {
    let (status, body) = post(
        app,
        "/projects",
        serde_json::json!({ "name": name, "latitude": 11.5449, "longitude": 104.9135 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create project failed: {body}");
    body["id"].as_i64().unwrap()
}

/// Serve `router` on an ephemeral local port; returns its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
