//! # Transaction Repository
//!
//! Persistence of committed checkouts.
//!
//! ## Write Path
//! ```text
//! CheckoutPlan (core, computed under lock)
//!      │
//!      ▼
//! NewTransaction::from_plan(&plan, now)
//!      │
//!      ▼
//! TransactionRepository::insert(&mut *tx, &new)
//!      ├── INSERT transactions         → id
//!      └── INSERT transaction_details  × n (cart order)
//!      │
//!      ▼
//! Transaction { id, created_at, total_cents, details }
//! ```
//!
//! Rows are never updated after insert.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use storefront_core::ledger::CheckoutPlan;
use storefront_core::{Money, Transaction, TransactionDetail};

// =============================================================================
// Insert Payload
// =============================================================================

/// A transaction about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub created_at: DateTime<Utc>,
    pub total: Money,
    pub lines: Vec<NewTransactionLine>,
}

/// One detail row about to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTransactionLine {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl NewTransaction {
    /// Builds the insert payload from a checkout plan.
    pub fn from_plan(plan: &CheckoutPlan, created_at: DateTime<Utc>) -> Self {
        NewTransaction {
            created_at,
            total: plan.total,
            lines: plan
                .debits
                .iter()
                .map(|debit| NewTransactionLine {
                    product_id: debit.product_id,
                    quantity: debit.quantity,
                    unit_price: debit.unit_price,
                    subtotal: debit.subtotal,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Inserts a transaction and its details on the caller's connection.
    ///
    /// Meant to run inside the checkout transaction; nothing is visible to
    /// other connections until that transaction commits.
    pub async fn insert(conn: &mut SqliteConnection, new: &NewTransaction) -> DbResult<Transaction> {
        debug!(
            total_cents = new.total.cents(),
            lines = new.lines.len(),
            "Inserting transaction"
        );

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transactions (total_cents, created_at)
            VALUES (?1, ?2)
            RETURNING id
            "#,
        )
        .bind(new.total.cents())
        .bind(new.created_at)
        .fetch_one(&mut *conn)
        .await?;

        let mut details = Vec::with_capacity(new.lines.len());
        for line in &new.lines {
            let detail = sqlx::query_as::<_, TransactionDetail>(
                r#"
                INSERT INTO transaction_details (
                    transaction_id, product_id, quantity,
                    unit_price_cents, subtotal_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                RETURNING id, transaction_id, product_id, quantity,
                          unit_price_cents, subtotal_cents
                "#,
            )
            .bind(id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price.cents())
            .bind(line.subtotal.cents())
            .fetch_one(&mut *conn)
            .await?;

            details.push(detail);
        }

        Ok(Transaction {
            id,
            created_at: new.created_at,
            total_cents: new.total.cents(),
            details,
        })
    }

    /// Gets a committed transaction with its details in insertion order.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Transaction>> {
        let header: Option<(i64, DateTime<Utc>, i64)> = sqlx::query_as(
            "SELECT id, created_at, total_cents FROM transactions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, created_at, total_cents)) = header else {
            return Ok(None);
        };

        let details = sqlx::query_as::<_, TransactionDetail>(
            r#"
            SELECT id, transaction_id, product_id, quantity,
                   unit_price_cents, subtotal_cents
            FROM transaction_details
            WHERE transaction_id = ?1
            ORDER BY id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Transaction {
            id,
            created_at,
            total_cents,
            details,
        }))
    }

    /// Counts committed transactions.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use storefront_core::ledger::LockedProduct;
    use storefront_core::CartLine;

    #[test]
    fn test_from_plan_keeps_cart_order() {
        let locked: HashMap<i64, LockedProduct> = [
            LockedProduct {
                id: 1,
                name: "a".into(),
                price: Money::from_cents(100),
                stock: 5,
            },
            LockedProduct {
                id: 2,
                name: "b".into(),
                price: Money::from_cents(250),
                stock: 5,
            },
        ]
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

        let plan =
            CheckoutPlan::build(&[CartLine::new(2, 2), CartLine::new(1, 1)], &locked).unwrap();
        let new = NewTransaction::from_plan(&plan, Utc::now());

        assert_eq!(new.total.cents(), 600);
        assert_eq!(new.lines[0].product_id, 2);
        assert_eq!(new.lines[0].subtotal.cents(), 500);
        assert_eq!(new.lines[1].product_id, 1);
    }
}
