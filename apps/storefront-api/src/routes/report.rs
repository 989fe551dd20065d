//! Sales report endpoints.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use storefront_core::period::parse_date;
use storefront_core::SalesReport;

use crate::error::ApiError;
use crate::AppState;

/// `?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD`
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/report/today
#[tracing::instrument(skip(state))]
pub async fn today(State(state): State<Arc<AppState>>) -> Result<Json<SalesReport>, ApiError> {
    let report = state.reports.report_today().await?;
    Ok(Json(report))
}

/// GET /api/report
///
/// Both dates are whole days in the report offset, inclusive.
#[tracing::instrument(skip(state, query))]
pub async fn range(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<SalesReport>, ApiError> {
    let Query(query) = query?;
    let start = parse_date("start_date", query.start_date.as_deref().unwrap_or_default())?;
    let end = parse_date("end_date", query.end_date.as_deref().unwrap_or_default())?;

    let report = state.reports.report_dates(start, end).await?;
    Ok(Json(report))
}
