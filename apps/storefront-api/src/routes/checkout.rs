//! Checkout endpoint.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use storefront_core::{CheckoutRequest, Transaction};

use crate::error::ApiError;
use crate::AppState;

/// POST /api/checkout
///
/// ```json
/// { "items": [{ "product_id": 1, "quantity": 2 }], "total_cents": 3000 }
/// ```
///
/// `total_cents` is optional and only compared against the computed total.
/// Responds `201` with the committed transaction.
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let Json(request) = payload?;

    let transaction = state.checkout.checkout(request).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}
