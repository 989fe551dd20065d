//! # Reporting Aggregator
//!
//! Sales totals and best seller over an inclusive time range.
//!
//! ## "Today"
//! ```text
//! reference offset (REPORT_UTC_OFFSET, default: host offset)
//!        │
//!        ▼
//! ReportPeriod::today(offset, Utc::now())
//!        │  [local 00:00:00.000000000, local 23:59:59.999999999] in UTC
//!        ▼
//! report_range(start, end)
//! ```
//!
//! Only committed transactions are visible: a checkout still holding its
//! locks contributes nothing until it commits.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use thiserror::Error;
use tracing::debug;

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::report::ReportRepository;
use storefront_core::period::ReportPeriod;
use storefront_core::{CoreError, SalesReport};

/// Why a report could not be produced.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<CoreError> for ReportError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRange { start, end } => ReportError::InvalidRange { start, end },
            other => ReportError::Database(DbError::Internal(other.to_string())),
        }
    }
}

/// Read-only report handle bound to a reference offset.
#[derive(Debug, Clone)]
pub struct ReportService {
    db: Database,
    offset: FixedOffset,
}

impl ReportService {
    pub fn new(db: Database, offset: FixedOffset) -> Self {
        ReportService { db, offset }
    }

    /// The offset that decides where a reporting day begins.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Report over the current local day.
    pub async fn report_today(&self) -> Result<SalesReport, ReportError> {
        self.report_today_at(Utc::now()).await
    }

    /// Report over the local day containing `now`.
    pub async fn report_today_at(&self, now: DateTime<Utc>) -> Result<SalesReport, ReportError> {
        let today = ReportPeriod::today(self.offset, now);
        self.report_range(today.start, today.end).await
    }

    /// Report over whole local days, `start_date` through `end_date`.
    pub async fn report_dates(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<SalesReport, ReportError> {
        let period = ReportPeriod::from_dates(start_date, end_date, self.offset)?;
        self.report_range(period.start, period.end).await
    }

    /// Report over `[start, end]`, both ends inclusive.
    ///
    /// ## Returns
    /// * `Ok(SalesReport)` - zeros and no best seller for an empty range
    /// * `Err(ReportError::InvalidRange)` - `start > end`
    #[tracing::instrument(skip(self))]
    pub async fn report_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<SalesReport, ReportError> {
        let period = ReportPeriod::new(start, end)?;

        // one read transaction = one snapshot for both queries
        let mut tx = self.db.begin().await?;

        let (revenue, count) =
            ReportRepository::sum_revenue_and_count(&mut tx, period.start, period.end).await?;

        let best_seller = if count == 0 {
            None
        } else {
            ReportRepository::top_selling_product(&mut tx, period.start, period.end).await?
        };

        tx.commit().await.map_err(DbError::from)?;

        debug!(
            revenue_cents = revenue.cents(),
            transactions = count,
            best_seller = ?best_seller.as_ref().map(|b| b.product_id),
            "Report computed"
        );

        Ok(SalesReport {
            total_revenue_cents: revenue.cents(),
            total_transactions: count,
            best_seller,
        })
    }
}
