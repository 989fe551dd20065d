//! # Domain Types
//!
//! Core domain types used throughout Storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │    Category     │◄──│    Product      │◄──│  TransactionDetail   │  │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────────  │  │
//! │  │  id             │   │  id             │   │  product_id (ref)    │  │
//! │  │  name           │   │  category_id    │   │  quantity            │  │
//! │  │  description    │   │  price_cents    │   │  unit_price_cents    │  │
//! │  └─────────────────┘   │  stock (≥ 0)    │   │  subtotal_cents      │  │
//! │                        └─────────────────┘   └──────────┬───────────┘  │
//! │                                                         │ owned by     │
//! │                                              ┌──────────▼───────────┐  │
//! │                                              │    Transaction       │  │
//! │                                              │  id, created_at,     │  │
//! │                                              │  total_cents         │  │
//! │                                              └──────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity is keyed by its SQLite row id (`i64`). The numeric order of
//! product ids is the lock order used by checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Row id.
    pub id: i64,

    /// Owning category.
    pub category_id: i64,

    /// Category name, filled when the product is read with its category.
    #[cfg_attr(feature = "sqlx", sqlx(default))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,

    /// Display name.
    pub name: String,

    /// Free-form description, empty when not provided.
    pub description: String,

    /// Unit price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Fields accepted when creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    pub stock: i64,
    pub category_id: i64,
}

// =============================================================================
// Checkout Input
// =============================================================================

/// One `{product_id, quantity}` line of a checkout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        CartLine {
            product_id,
            quantity,
        }
    }
}

/// A checkout request.
///
/// `client_total` is what the client believes the order costs. It is only
/// compared against the server total for anomaly logging; the persisted
/// total is always recomputed from locked prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    #[serde(rename = "total_cents", default)]
    pub client_total: Money,
}

impl CheckoutRequest {
    pub fn new(items: Vec<CartLine>, client_total: Money) -> Self {
        CheckoutRequest {
            items,
            client_total,
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed checkout. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    /// Sum of the detail subtotals.
    pub total_cents: i64,
    /// Lines in the order they were submitted.
    pub details: Vec<TransactionDetail>,
}

impl Transaction {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line of a transaction.
/// Uses snapshot pattern: the unit price is frozen at the moment of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionDetail {
    pub id: i64,
    pub transaction_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price in cents read under the product lock.
    pub unit_price_cents: i64,
    /// unit_price_cents × quantity.
    pub subtotal_cents: i64,
}

impl TransactionDetail {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Reporting
// =============================================================================

/// Aggregated sales over a reporting interval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub total_revenue_cents: i64,
    pub total_transactions: i64,
    /// Absent when no transaction falls in the interval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_seller: Option<BestSeller>,
}

impl SalesReport {
    #[inline]
    pub fn total_revenue(&self) -> Money {
        Money::from_cents(self.total_revenue_cents)
    }
}

/// The product with the highest sold quantity in an interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BestSeller {
    pub product_id: i64,
    pub name: String,
    pub sold_qty: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_request_reads_total_cents() {
        let json = r#"{"items":[{"product_id":1,"quantity":2}],"total_cents":3000}"#;
        let req: CheckoutRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.items, vec![CartLine::new(1, 2)]);
        assert_eq!(req.client_total.cents(), 3000);
    }

    #[test]
    fn test_empty_report_omits_best_seller() {
        let json = serde_json::to_value(SalesReport::default()).unwrap();
        assert_eq!(json["total_revenue_cents"], 0);
        assert_eq!(json["total_transactions"], 0);
        assert!(json.get("best_seller").is_none());
    }

    #[test]
    fn test_category_input_description_defaults_to_empty() {
        let input: CategoryInput = serde_json::from_str(r#"{"name":"Drinks"}"#).unwrap();
        assert_eq!(input.description, "");
    }
}
