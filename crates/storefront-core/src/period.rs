//! # Report Periods
//!
//! Closed time intervals for sales reporting.
//!
//! ## Day Boundaries
//! ```text
//! reference offset +07:00, date 2026-03-14
//!
//!   start = 2026-03-14T00:00:00.000000000+07:00  (2026-03-13T17:00:00Z)
//!   end   = 2026-03-14T23:59:59.999999999+07:00  (2026-03-14T16:59:59.999999999Z)
//!
//! Both ends are inclusive: a transaction stamped exactly at `end` counts.
//! ```
//!
//! All intervals are stored in UTC; the offset only decides where a local
//! day begins.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::error::{CoreError, CoreResult, ValidationError};

/// Format accepted for date-only report input.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive `[start, end]` reporting interval in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportPeriod {
    /// Builds a period from explicit instants.
    ///
    /// ## Errors
    /// `InvalidRange` when `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvalidRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(ReportPeriod { start, end })
    }

    /// The whole local day `date` in the given offset.
    pub fn for_day(date: NaiveDate, offset: FixedOffset) -> Self {
        let start = start_of_day(date, offset);
        ReportPeriod {
            start,
            end: end_of_day(start),
        }
    }

    /// The local day containing `now`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{FixedOffset, TimeZone, Utc};
    /// use storefront_core::period::ReportPeriod;
    ///
    /// let offset = FixedOffset::east_opt(7 * 3600).unwrap();
    /// // 20:00 UTC is already the next day at +07:00
    /// let now = Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap();
    /// let today = ReportPeriod::today(offset, now);
    /// assert_eq!(today.start, Utc.with_ymd_and_hms(2026, 3, 14, 17, 0, 0).unwrap());
    /// ```
    pub fn today(offset: FixedOffset, now: DateTime<Utc>) -> Self {
        let local_date = now.with_timezone(&offset).date_naive();
        ReportPeriod::for_day(local_date, offset)
    }

    /// Date-only range: from the start of `start_date` to the last instant
    /// of `end_date`.
    ///
    /// ## Errors
    /// `InvalidRange` when `start_date` is after `end_date`.
    pub fn from_dates(
        start_date: NaiveDate,
        end_date: NaiveDate,
        offset: FixedOffset,
    ) -> CoreResult<Self> {
        if start_date > end_date {
            return Err(CoreError::InvalidRange {
                start: start_date.to_string(),
                end: end_date.to_string(),
            });
        }

        Ok(ReportPeriod {
            start: start_of_day(start_date, offset),
            end: end_of_day(start_of_day(end_date, offset)),
        })
    }

    /// Returns true when `instant` lies in `[start, end]`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Parses a `YYYY-MM-DD` date supplied by a client.
///
/// ## Example
/// ```rust
/// use storefront_core::period::parse_date;
///
/// assert!(parse_date("start_date", "2026-02-28").is_ok());
/// assert!(parse_date("start_date", "28/02/2026").is_err());
/// ```
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "expected YYYY-MM-DD".to_string(),
    })
}

fn start_of_day(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local_midnight = date.and_time(NaiveTime::MIN);
    let utc = local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, Utc)
}

fn end_of_day(start: DateTime<Utc>) -> DateTime<Utc> {
    start + Duration::days(1) - Duration::nanoseconds(1)
}

// =============================================================================
// Unit Tests
// =============================================================================
