//! # Stock Ledger
//!
//! Stock sufficiency checks and decrements, computed from product rows
//! that the store has already locked.
//!
//! ## Where the Ledger Sits in a Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── lock_order(lines)          ids sorted ascending, deduplicated   │
//! │    │                                                                    │
//! │    ├── for id in order:                                                 │
//! │    │     get_for_update(id) ──► LockedProduct   (store, blocks)        │
//! │    │                                                                    │
//! │    ├── CheckoutPlan::build(lines, locked)        ◄── THIS MODULE       │
//! │    │     └── debit(locked, qty) per line         (pure, no writes)     │
//! │    │                                                                    │
//! │    ├── save_stock(id, debit.stock_after) per line (store)              │
//! │    ├── insert transaction + details               (store)              │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger never writes. Its results are applied inside the enclosing
//! store transaction, so a failure on any later line rolls back every
//! decrement computed here.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::CartLine;
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Locked Product
// =============================================================================

/// A product row read under an exclusive lock.
///
/// Only the store's locking read should construct this; the stock value is
/// authoritative until the enclosing transaction ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedProduct {
    pub id: i64,
    pub name: String,
    pub price: Money,
    pub stock: i64,
}

// =============================================================================
// Debit
// =============================================================================

/// The outcome of debiting one line against its locked product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDebit {
    pub product_id: i64,
    pub quantity: i64,
    /// Price captured under the lock.
    pub unit_price: Money,
    pub subtotal: Money,
    pub stock_before: i64,
    pub stock_after: i64,
}

/// Verifies `stock ≥ quantity` and returns the decremented value.
///
/// ## Errors
/// - `InsufficientStock` when the locked stock cannot cover the quantity
/// - `InvalidQuantity` when the quantity is not positive
/// - `AmountOverflow` when price × quantity does not fit in `i64` cents
///
/// ## Example
/// ```rust
/// use storefront_core::ledger::{debit, LockedProduct};
/// use storefront_core::{CoreError, Money};
///
/// let locked = LockedProduct { id: 1, name: "Teh".into(), price: Money::from_cents(500), stock: 2 };
/// assert_eq!(
///     debit(&locked, 3),
///     Err(CoreError::InsufficientStock { product_id: 1, requested: 3, available: 2 })
/// );
/// ```
pub fn debit(locked: &LockedProduct, quantity: i64) -> CoreResult<StockDebit> {
    if quantity < 1 {
        return Err(CoreError::InvalidQuantity {
            product_id: locked.id,
            quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }

    if locked.stock < quantity {
        return Err(CoreError::InsufficientStock {
            product_id: locked.id,
            requested: quantity,
            available: locked.stock,
        });
    }

    let subtotal = locked
        .price
        .checked_multiply_quantity(quantity)
        .ok_or(CoreError::AmountOverflow {
            product_id: locked.id,
        })?;

    Ok(StockDebit {
        product_id: locked.id,
        quantity,
        unit_price: locked.price,
        subtotal,
        stock_before: locked.stock,
        stock_after: locked.stock - quantity,
    })
}

// =============================================================================
// Lock Ordering
// =============================================================================

/// Returns the distinct product ids of a cart in ascending order.
///
/// Every checkout acquires its locks in this order, so two checkouts that
/// share products always contend on the lowest shared id first and cannot
/// wait on each other in a cycle.
///
/// ## Example
/// ```rust
/// use storefront_core::ledger::lock_order;
/// use storefront_core::CartLine;
///
/// let lines = [CartLine::new(9, 1), CartLine::new(2, 1), CartLine::new(5, 1)];
/// assert_eq!(lock_order(&lines), vec![2, 5, 9]);
/// ```
pub fn lock_order(lines: &[CartLine]) -> Vec<i64> {
    let mut ids: Vec<i64> = lines.iter().map(|line| line.product_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

// =============================================================================
// Checkout Plan
// =============================================================================

/// All debits of a checkout plus the authoritative total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    /// One debit per cart line, in cart order.
    pub debits: Vec<StockDebit>,
    /// Σ subtotal.
    pub total: Money,
}

impl CheckoutPlan {
    /// Debits every line against its locked product.
    ///
    /// Fails on the first line that cannot be satisfied, or on the line whose
    /// subtotal pushes the total out of range. Nothing is applied in that
    /// case because nothing has been written yet.
    pub fn build(lines: &[CartLine], locked: &HashMap<i64, LockedProduct>) -> CoreResult<Self> {
        let mut debits = Vec::with_capacity(lines.len());
        let mut total = Money::zero();

        for line in lines {
            let product = locked
                .get(&line.product_id)
                .ok_or(CoreError::ProductNotFound {
                    product_id: line.product_id,
                })?;
            let entry = debit(product, line.quantity)?;
            total = total
                .checked_add(entry.subtotal)
                .ok_or(CoreError::AmountOverflow {
                    product_id: line.product_id,
                })?;
            debits.push(entry);
        }

        Ok(CheckoutPlan { debits, total })
    }

    /// Difference between what the client declared and what the order
    /// actually costs. Zero when they agree; saturates at the `i64` bounds
    /// since the client value is unchecked input.
    pub fn client_total_delta(&self, client_total: Money) -> Money {
        Money::from_cents(client_total.cents().saturating_sub(self.total.cents()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
