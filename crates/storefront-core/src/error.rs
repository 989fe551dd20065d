//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Cart and stock rule violations                 │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  ├── DbError          - Database operation failures                    │
//! │  ├── CheckoutError    - What a checkout attempt reports                │
//! │  └── ReportError      - What a report query reports                    │
//! │                                                                         │
//! │  storefront-api errors (in app)                                        │
//! │  └── ApiError         - What HTTP clients see (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending identifier in every message
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations detected by the cart validator or the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A checkout was submitted without any line.
    #[error("Cart is empty")]
    EmptyCart,

    /// The same product appears on more than one line of a checkout.
    ///
    /// ## Policy
    /// One line per product per checkout. A client wanting more units must
    /// raise `quantity` instead of repeating the line.
    #[error("Product {product_id} appears more than once in the cart")]
    DuplicateLineItem { product_id: i64 },

    /// Product cannot be found (never existed or was soft-deleted).
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: i64 },

    /// Insufficient stock to complete the checkout.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (product 3, qty: 5)
    ///      │
    ///      ▼
    /// Lock product 3: stock=3
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 3, requested: 5, available: 3 }
    ///      │
    ///      ▼
    /// Whole checkout rolled back, nothing decremented
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// A line asks for fewer than one unit, or more than the per-line cap.
    #[error("Quantity {quantity} for product {product_id} must be between 1 and {max}")]
    InvalidQuantity {
        product_id: i64,
        quantity: i64,
        max: i64,
    },

    /// A line subtotal or the order total does not fit in `i64` cents.
    /// `product_id` is the line at which the amount ran out of range.
    #[error("Order amount exceeds the supported range at product {product_id}")]
    AmountOverflow { product_id: i64 },

    /// Report interval starts after it ends.
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true when the error is caused by the request itself rather
    /// than by the state of the catalog.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CoreError::EmptyCart
                | CoreError::DuplicateLineItem { .. }
                | CoreError::CartTooLarge { .. }
                | CoreError::InvalidQuantity { .. }
                | CoreError::AmountOverflow { .. }
                | CoreError::InvalidRange { .. }
                | CoreError::Validation(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any store access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 3,
            requested: 5,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 3: available 2, requested 5"
        );

        let err = CoreError::DuplicateLineItem { product_id: 9 };
        assert_eq!(err.to_string(), "Product 9 appears more than once in the cart");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(core_err.is_input_error());
    }

    #[test]
    fn test_stock_errors_are_not_input_errors() {
        assert!(!CoreError::ProductNotFound { product_id: 1 }.is_input_error());
        assert!(!CoreError::InsufficientStock {
            product_id: 1,
            requested: 2,
            available: 1
        }
        .is_input_error());
        assert!(CoreError::EmptyCart.is_input_error());
    }
}
