//! Category CRUD endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::pagination::Page;
use storefront_core::validation::validate_category_input;
use storefront_core::{Category, CategoryInput};

use super::PageQuery;
use crate::error::ApiError;
use crate::AppState;

/// GET /api/categories
#[tracing::instrument(skip(state, query))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Page<Category>>, ApiError> {
    let Query(query) = query?;
    let page = state.db.categories().list(query.to_request()).await?;
    Ok(Json(page))
}

/// GET /api/categories/{id}
#[tracing::instrument(skip(state, id))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Category>, ApiError> {
    let Path(id) = id?;
    state
        .db
        .categories()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Category", id))
}

/// POST /api/categories
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let Json(input) = payload?;
    validate_category_input(&input)?;

    let category = state.db.categories().create(&input).await?;
    tracing::info!(category_id = category.id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id}
#[tracing::instrument(skip(state, id, payload))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> Result<Json<Category>, ApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    validate_category_input(&input)?;

    let category = state.db.categories().update(id, &input).await?;
    Ok(Json(category))
}

/// DELETE /api/categories/{id}
#[tracing::instrument(skip(state, id))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.db.categories().soft_delete(id).await?;
    tracing::info!(category_id = id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
