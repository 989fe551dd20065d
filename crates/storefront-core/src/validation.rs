//! # Validation Module
//!
//! Input validation for Storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (axum)                                          │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Cart rules: non-empty, one line per product, quantity ≥ 1        │
//! │  └── Catalog fields: names, prices, stock                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (price_cents >= 0)                      │
//! │  ├── UNIQUE (transaction_id, product_id)                               │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything in layer 2 runs before the store is touched, so a rejected
//! request never opens a transaction.

use std::collections::HashSet;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{CartLine, CategoryInput, ProductInput};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_NAME_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product or category).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LENGTH`] characters
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_name;
///
/// assert!(validate_name("name", "Es Teh").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity of one checkout line.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(product_id: i64, quantity: i64) -> CoreResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
        return Err(CoreError::InvalidQuantity {
            product_id,
            quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price_cents".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock level set through the catalog.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an id supplied by a client.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id < 1 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Catalog Inputs
// =============================================================================

/// Validates a category create/update payload.
pub fn validate_category_input(input: &CategoryInput) -> ValidationResult<()> {
    validate_name("name", &input.name)
}

/// Validates a product create/update payload.
pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_price_cents(input.price_cents)?;
    validate_stock(input.stock)?;
    validate_id("category_id", input.category_id)?;
    Ok(())
}

// =============================================================================
// Cart Validation
// =============================================================================

/// Validates a checkout cart before any store access.
///
/// ## Checks (in order)
/// ```text
/// lines empty?              → EmptyCart
/// more than MAX_CART_ITEMS? → CartTooLarge
/// for each line:
///   product_id < 1?         → ProductNotFound (no row can have that id)
///   quantity outside 1..max → InvalidQuantity
///   product seen before?    → DuplicateLineItem { product_id }
/// ```
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_cart;
/// use storefront_core::{CartLine, CoreError};
///
/// let cart = [CartLine::new(1, 2), CartLine::new(1, 1)];
/// assert_eq!(
///     validate_cart(&cart),
///     Err(CoreError::DuplicateLineItem { product_id: 1 })
/// );
/// ```
pub fn validate_cart(lines: &[CartLine]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    if lines.len() > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }

    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if line.product_id < 1 {
            return Err(CoreError::ProductNotFound {
                product_id: line.product_id,
            });
        }
        validate_quantity(line.product_id, line.quantity)?;

        if !seen.insert(line.product_id) {
            return Err(CoreError::DuplicateLineItem {
                product_id: line.product_id,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
