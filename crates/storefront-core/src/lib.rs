//! # storefront-core: Pure Business Logic for Storefront
//!
//! This crate holds every rule of the checkout engine that can be expressed
//! without touching a database: money arithmetic, cart validation, the stock
//! ledger and report period math.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    storefront-api (axum)                        │   │
//! │  │    /api/checkout ── /api/report ── /api/products ── ...        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           storefront-db (CheckoutService, ReportService)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │validation│ │ ledger │ │ period  │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, Transaction, SalesReport)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation, including the cart rules
//! - [`ledger`] - Stock debits and the checkout plan computed under lock
//! - [`period`] - Report intervals ("today", date ranges)
//! - [`pagination`] - Page/limit clamping for catalog listings
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::ledger::{debit, LockedProduct};
//! use storefront_core::money::Money;
//!
//! let locked = LockedProduct {
//!     id: 7,
//!     name: "Kopi Susu".to_string(),
//!     price: Money::from_cents(1500),
//!     stock: 10,
//! };
//!
//! let entry = debit(&locked, 3).unwrap();
//! assert_eq!(entry.stock_after, 7);
//! assert_eq!(entry.subtotal.cents(), 4500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod pagination;
pub mod period;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single checkout.
///
/// ## Business Reason
/// Bounds the number of rows locked by one transaction.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Catches accidental over-ordering (an extra zero typed by the client).
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Maximum length of product and category names.
pub const MAX_NAME_LENGTH: usize = 255;
