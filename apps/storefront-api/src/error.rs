//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Storefront                             │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                           │
//! │         │                                                               │
//! │         ├── ValidationError / CoreError ───────► 400 VALIDATION_ERROR   │
//! │         ├── CheckoutError ── client fault ─────► 400 / 409 / 422        │
//! │         │                └── server fault ─────► 503                    │
//! │         ├── ReportError::InvalidRange ─────────► 400 INVALID_RANGE      │
//! │         ├── JSON body rejection ───────────────► 400 / 413              │
//! │         ├── DbError::NotFound ─────────────────► 404 NOT_FOUND          │
//! │         └── DbError (anything else) ───────────► 500 / 503              │
//! │                                                                         │
//! │  Body: { "code": "INSUFFICIENT_STOCK", "error": "..." }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Infrastructure detail is logged, never returned to the client.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use storefront_core::{CoreError, ValidationError};
use storefront_db::{CheckoutError, DbError, ReportError};

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "error": "Product not found: 42"
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Checkout with no lines (400)
    EmptyCart,

    /// Same product twice in one cart (400)
    DuplicateLineItem,

    /// Report start after end (400)
    InvalidRange,

    /// Resource not found (404)
    NotFound,

    /// Checkout names a product that does not exist (422)
    ProductNotFound,

    /// Not enough stock to cover a line (409)
    InsufficientStock,

    /// A product stayed locked longer than the lock timeout (503)
    LockTimeout,

    /// Store could not complete the checkout (503)
    StoreUnavailable,

    /// Request body over the configured limit (413)
    PayloadTooLarge,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError
            | ErrorCode::EmptyCart
            | ErrorCode::DuplicateLineItem
            | ErrorCode::InvalidRange => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ProductNotFound => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::LockTimeout | ErrorCode::StoreUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "code": self.code,
            "error": self.message,
        });
        (self.code.status(), axum::Json(body)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let code = match &err {
            CheckoutError::EmptyCart => ErrorCode::EmptyCart,
            CheckoutError::InvalidQuantity { .. }
            | CheckoutError::CartTooLarge { .. }
            | CheckoutError::AmountOverflow { .. } => ErrorCode::ValidationError,
            CheckoutError::DuplicateLineItem { .. } => ErrorCode::DuplicateLineItem,
            CheckoutError::ProductNotFound { .. } => ErrorCode::ProductNotFound,
            CheckoutError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CheckoutError::LockTimeout => ErrorCode::LockTimeout,
            CheckoutError::StoreUnavailable(detail) => {
                tracing::error!(%detail, "Checkout failed in the store");
                return ApiError::new(
                    ErrorCode::StoreUnavailable,
                    "Store temporarily unavailable, please retry",
                );
            }
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::InvalidRange { .. } => ApiError::new(ErrorCode::InvalidRange, err.to_string()),
            ReportError::Database(e) => e.into(),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Foreign key violation");
                ApiError::validation("Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::warn!(%message, "Check constraint violation");
                ApiError::validation("Value out of range")
            }
            e if e.is_unavailable() => {
                tracing::error!(error = %e, "Database unavailable");
                ApiError::new(ErrorCode::StoreUnavailable, "Database temporarily unavailable")
            }
            e => {
                // Log the actual error but return a generic message
                tracing::error!(error = %e, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRange { .. } => ApiError::new(ErrorCode::InvalidRange, err.to_string()),
            CoreError::ProductNotFound { product_id } => ApiError::not_found("Product", product_id),
            other => ApiError::validation(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::new(ErrorCode::PayloadTooLarge, "Request body too large");
        }
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}
