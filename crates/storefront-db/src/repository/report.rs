//! # Report Repository
//!
//! Aggregation queries over committed transactions.
//!
//! Both queries take the caller's connection so the report service can run
//! them inside one read transaction: in WAL mode that pins a single
//! snapshot, and the revenue total can never disagree with the best seller.
//!
//! ## Range Semantics
//! `created_at BETWEEN start AND end`, inclusive on both ends. Timestamps
//! are bound with the same encoding they were stored with, so comparison
//! is exact to the nanosecond.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use storefront_core::{BestSeller, Money};

/// Namespace for report queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportRepository;

impl ReportRepository {
    /// Returns `(Σ total, count)` over transactions in `[start, end]`.
    /// An empty range yields `(0, 0)`.
    pub async fn sum_revenue_and_count(
        conn: &mut SqliteConnection,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<(Money, i64)> {
        let (revenue, count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_cents), 0), COUNT(*)
            FROM transactions
            WHERE created_at BETWEEN ?1 AND ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&mut *conn)
        .await?;

        debug!(revenue_cents = revenue, count, "Summed revenue");

        Ok((Money::from_cents(revenue), count))
    }

    /// Returns the product with the highest total quantity sold in
    /// `[start, end]`; ties go to the lowest product id.
    ///
    /// Soft-deleted products still count, the name is read from the row as
    /// it is now.
    pub async fn top_selling_product(
        conn: &mut SqliteConnection,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Option<BestSeller>> {
        let best = sqlx::query_as::<_, BestSeller>(
            r#"
            SELECT d.product_id AS product_id,
                   p.name AS name,
                   SUM(d.quantity) AS sold_qty
            FROM transaction_details d
            JOIN transactions t ON t.id = d.transaction_id
            JOIN products p ON p.id = d.product_id
            WHERE t.created_at BETWEEN ?1 AND ?2
            GROUP BY d.product_id, p.name
            ORDER BY sold_qty DESC, d.product_id ASC
            LIMIT 1
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(best)
    }
}
