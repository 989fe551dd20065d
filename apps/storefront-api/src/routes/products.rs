//! Product CRUD endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use storefront_core::pagination::{Page, PageRequest};
use storefront_core::validation::validate_product_input;
use storefront_core::{Product, ProductInput};
use storefront_db::DbError;

use crate::error::ApiError;
use crate::AppState;

/// `?name=&page=&limit=`
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub name: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/products
#[tracing::instrument(skip(state, query))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<Page<Product>>, ApiError> {
    let Query(query) = query?;
    let name = query
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let page = state
        .db
        .products()
        .list(name, PageRequest::new(query.page, query.limit))
        .await?;
    Ok(Json(page))
}

/// GET /api/products/{id}
#[tracing::instrument(skip(state, id))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id?;
    state
        .db
        .products()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", id))
}

/// POST /api/products
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(input) = payload?;
    validate_product_input(&input)?;

    let product = state
        .db
        .products()
        .create(&input)
        .await
        .map_err(category_reference)?;
    tracing::info!(product_id = product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id}
#[tracing::instrument(skip(state, id, payload))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    validate_product_input(&input)?;

    let product = state
        .db
        .products()
        .update(id, &input)
        .await
        .map_err(category_reference)?;
    Ok(Json(product))
}

/// DELETE /api/products/{id}
#[tracing::instrument(skip(state, id))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.db.products().soft_delete(id).await?;
    tracing::info!(product_id = id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// A missing category is a bad reference in the body, not a missing route
/// resource.
fn category_reference(err: DbError) -> ApiError {
    match err {
        DbError::NotFound { entity, id } if entity == "Category" => {
            ApiError::validation(format!("category_id {} does not exist", id))
        }
        other => other.into(),
    }
}
