// src/api/http/products.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{parse_id, JsonPayload};
use crate::api::error::{ApiError, ApiResult, IntoApiErrorOption};
use crate::inventory::validation;
use crate::state::AppState;

const NOT_FOUND: &str = "Product not found";

pub async fn list_products(State(app_state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let products = app_state.products.list_products().await?;
    Ok(Json(products))
}

pub async fn create_product(
    State(app_state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload,
) -> ApiResult<impl IntoResponse> {
    let input = validation::new_product(&payload, app_state.projects.as_ref()).await?;
    let product = app_state.products.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn show_product(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let product = app_state
        .products
        .get_product(id)
        .await?
        .ok_or_not_found(NOT_FOUND)?;
    Ok(Json(product))
}

pub async fn update_product(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonPayload(payload): JsonPayload,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    app_state
        .products
        .get_product(id)
        .await?
        .ok_or_not_found(NOT_FOUND)?;
    let patch = validation::product_patch(&payload, app_state.projects.as_ref()).await?;
    let product = app_state
        .products
        .update_product(id, patch)
        .await?
        .ok_or_not_found(NOT_FOUND)?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    if app_state.products.delete_product(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(NOT_FOUND))
    }
}
