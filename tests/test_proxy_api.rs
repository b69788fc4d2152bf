// tests/test_proxy_api.rs
// Exchange-rate and weather pass-through against a local fake upstream

mod common;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get as get_route;
use axum::{Json, Router};
use common::{create_test_app, create_test_app_with_upstream, get, spawn_upstream};
use serde_json::{json, Value};
use std::collections::HashMap;

fn fake_upstream() -> Router {
    Router::new()
        .route(
            "/v6/latest/USD",
            get_route(|| async {
                Json(json!({
                    "result": "success",
                    "base_code": "USD",
                    "rates": { "USD": 1, "KHR": 4100, "EUR": 0.92 }
                }))
            }),
        )
        .route(
            "/v1/forecast",
            get_route(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("latitude").map(String::as_str) == Some("") {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "error": true, "reason": "Latitude must be a number" })),
                    );
                }
                (
                    StatusCode::OK,
                    Json(json!({
                        "latitude": params.get("latitude"),
                        "longitude": params.get("longitude"),
                        "current_weather_flag": params.get("current_weather"),
                        "current_weather": { "temperature": 31.2, "weathercode": 2, "windspeed": 7.4 }
                    })),
                )
            }),
        )
}

#[tokio::test]
async fn test_exchange_rate_passes_body_through() {
    let base = spawn_upstream(fake_upstream()).await;
    let app = create_test_app_with_upstream(&base).await;

    let (status, body) = get(&app, "/exchange-rate").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base_code"], "USD");
    assert_eq!(body["rates"]["KHR"], 4100);
}

#[tokio::test]
async fn test_weather_forwards_coordinates() {
    let base = spawn_upstream(fake_upstream()).await;
    let app = create_test_app_with_upstream(&base).await;

    let (status, body) = get(&app, "/api/weather?lat=11.5449&lng=104.9135").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["latitude"], "11.5449");
    assert_eq!(body["longitude"], "104.9135");
    assert_eq!(body["current_weather_flag"], "true");
    assert_eq!(body["current_weather"]["weathercode"], 2);
}

#[tokio::test]
async fn test_weather_upstream_error_status_is_relayed() {
    let base = spawn_upstream(fake_upstream()).await;
    let app = create_test_app_with_upstream(&base).await;

    let (status, body) = get(&app, "/weather").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "Latitude must be a number");
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let app = create_test_app().await;

    let (status, body) = get(&app, "/exchange-rate").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error_code"], "UPSTREAM_UNAVAILABLE");

    let (status, _) = get(&app, "/weather?lat=1&lng=2").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_non_json_upstream_is_bad_gateway() {
    let upstream = Router::new().route("/v6/latest/USD", get_route(|| async { "<html>maintenance</html>" }));
    let base = spawn_upstream(upstream).await;
    let app = create_test_app_with_upstream(&base).await;

    let (status, body): (StatusCode, Value) = get(&app, "/exchange-rate").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error_code"], "UPSTREAM_INVALID_RESPONSE");
}

#[tokio::test]
async fn test_malformed_weather_query_is_json_error() {
    let app = create_test_app().await;

    let (status, body) = get(&app, "/weather?lat=1&lat=2&lng=3").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    assert_eq!(body["error_code"], "BAD_REQUEST");
}
