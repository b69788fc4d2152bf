// src/api/http/projects.rs
// Project resource: list, create, show (with products), update, delete

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
use crate::inventory::DeleteOutcome;
use crate::state::AppState;

const NOT_FOUND: &str = "Project not found";

pub async fn list_projects(State(app_state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let projects = app_state.projects.list_projects().await?;
    Ok(Json(projects))
}

pub async fn create_project(
    State(app_state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload,
) -> ApiResult<impl IntoResponse> {
    let input = validation::new_project(&payload)?;
    let project = app_state.projects.create_project(input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn show_project(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let project = app_state
        .projects
        .get_project_with_products(id)
        .await?
        .ok_or_not_found(NOT_FOUND)?;
    Ok(Json(project))
}

pub async fn update_project(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonPayload(payload): JsonPayload,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    app_state
        .projects
        .get_project(id)
        .await?
        .ok_or_not_found(NOT_FOUND)?;
    let patch = validation::project_patch(&payload)?;
    let project = app_state
        .projects
        .update_project(id, patch)
        .await?
        .ok_or_not_found(NOT_FOUND)?;
    Ok(Json(project))
}

pub async fn delete_project(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    match app_state.projects.delete_project(id).await? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::NotFound => Err(ApiError::not_found(NOT_FOUND)),
        DeleteOutcome::Restricted { products } => Err(ApiError::conflict(format!(
            "Project still has {products} product(s); delete them first"
        ))),
    }
}
