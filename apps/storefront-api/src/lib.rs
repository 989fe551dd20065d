//! HTTP API for the storefront.
//!
//! Exposes the catalog, the checkout and sales reports over JSON. All
//! business rules live in `storefront-core` and `storefront-db`; handlers
//! only parse, call a service and map errors.

pub mod config;
pub mod error;
pub mod routes;

use std::any::Any;
use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use storefront_db::{CheckoutService, Database, ReportService};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Default upper bound for request bodies.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Shared application state accessible from all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub checkout: CheckoutService,
    pub reports: ReportService,
}

impl AppState {
    pub fn new(db: Database, reports: ReportService) -> Self {
        AppState {
            checkout: db.checkout(),
            db,
            reports,
        }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/api/categories",
            get(routes::categories::list).post(routes::categories::create),
        )
        .route(
            "/api/categories/{id}",
            get(routes::categories::get)
                .put(routes::categories::update)
                .delete(routes::categories::delete),
        )
        .route(
            "/api/products",
            get(routes::products::list).post(routes::products::create),
        )
        .route(
            "/api/products/{id}",
            get(routes::products::get)
                .put(routes::products::update)
                .delete(routes::products::delete),
        )
        .route("/api/checkout", post(routes::checkout::create))
        .route("/api/report/today", get(routes::report::today))
        .route("/api/report", get(routes::report::range))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods(AnyOrigin)
                .allow_headers(AnyOrigin),
        )
        .layer(TraceLayer::new_for_http())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(%detail, "Handler panicked");

    error::ApiError::internal("Internal Server Error").into_response()
}
