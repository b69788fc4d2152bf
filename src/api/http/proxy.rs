// src/api/http/proxy.rs
// Pass-through routes to the exchange-rate and weather APIs

use axum::{
    extract::{FromRequestParts, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::upstream::UpstreamResponse;

#[derive(Debug, Default, Deserialize, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct WeatherQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/// Relay the upstream status and JSON body as-is.
fn passthrough(upstream: UpstreamResponse) -> Response {
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(upstream.body)).into_response()
}

pub async fn exchange_rate(State(app_state): State<Arc<AppState>>) -> ApiResult<Response> {
    let upstream = app_state.upstream.exchange_rates().await?;
    Ok(passthrough(upstream))
}

pub async fn weather(
    State(app_state): State<Arc<AppState>>,
    query: WeatherQuery,
) -> ApiResult<Response> {
    let lat = query.lat.as_deref().unwrap_or("");
    let lng = query.lng.as_deref().unwrap_or("");
    let upstream = app_state.upstream.weather(lat, lng).await?;
    Ok(passthrough(upstream))
}
