// src/api/http/mod.rs
// HTTP router composition for the REST API

use axum::{
    extract::FromRequest,
    http::{HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::api::error::{ApiError, ApiResult};
use crate::inventory::validation::Payload;
use crate::state::AppState;

pub mod health;
pub mod products;
pub mod projects;
pub mod proxy;

/// A JSON object body; malformed bodies are rejected with an `ApiError`.
#[derive(Debug, Deserialize, FromRequest)]
#[serde(transparent)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonPayload(pub Payload);

/// Path ids that are not integers cannot name a record.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> ApiResult<i64> {
    raw.parse::<i64>().map_err(|_| ApiError::not_found(not_found))
}

/// Method + path table for every resource and proxy route.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_handler))
        // Projects
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{id}",
            get(projects::show_project)
                .put(projects::update_project)
                .patch(projects::update_project)
                .delete(projects::delete_project),
        )
        // Products
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/{id}",
            get(products::show_product)
                .put(products::update_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
        // Third-party proxies
        .route("/exchange-rate", get(proxy::exchange_rate))
        .route("/weather", get(proxy::weather))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = if origin == "*" {
        AllowOrigin::from(Any)
    } else {
        match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!("Invalid CORS origin '{}', allowing any origin", origin);
                AllowOrigin::from(Any)
            }
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
}

/// Full application router. Routes are served at the root and under `/api`.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let routes = api_routes();

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .fallback(|| async { ApiError::not_found("Route not found") })
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    app_state.config.request_timeout(),
                ))
                .layer(cors_layer(&app_state.config.cors_origin)),
        )
        .with_state(app_state)
}
