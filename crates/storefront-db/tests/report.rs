//! Report integration tests: aggregation, best seller, range boundaries.

mod common;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};

use common::{catalog, memory_db, TempDb};
use storefront_core::period::ReportPeriod;
use storefront_core::Money;
use storefront_db::{
    Database, NewTransaction, NewTransactionLine, ReportError, TransactionRepository,
};

fn jakarta() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap()
}

fn local(offset: FixedOffset, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    offset
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

/// Commits a transaction at a fixed timestamp. `lines` are
/// `(product_id, quantity, unit_price_cents)`.
async fn record(db: &Database, at: DateTime<Utc>, lines: &[(i64, i64, i64)]) {
    let lines: Vec<NewTransactionLine> = lines
        .iter()
        .map(|&(product_id, quantity, price)| NewTransactionLine {
            product_id,
            quantity,
            unit_price: Money::from_cents(price),
            subtotal: Money::from_cents(price * quantity),
        })
        .collect();
    let total = lines.iter().map(|l| l.subtotal).sum();

    let mut tx = db.begin().await.unwrap();
    TransactionRepository::insert(
        &mut tx,
        &NewTransaction {
            created_at: at,
            total,
            lines,
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_report_today_aggregates_the_local_day() {
    let db = memory_db().await;
    let products = catalog(&db, &[("Product A", 50, 100), ("Product B", 50, 100)]).await;
    let (a, b) = (products[0].id, products[1].id);
    let offset = jakarta();

    // T1: 2 × A at 09:00, T2: 1 × B at 23:00, same local day
    record(&db, local(offset, 2026, 3, 14, 9, 0), &[(a, 2, 50)]).await;
    record(&db, local(offset, 2026, 3, 14, 23, 0), &[(b, 1, 50)]).await;
    // previous local day, must not count
    record(&db, local(offset, 2026, 3, 13, 23, 59), &[(b, 5, 50)]).await;

    let report = db
        .report_service(offset)
        .report_today_at(local(offset, 2026, 3, 14, 12, 0))
        .await
        .unwrap();

    assert_eq!(report.total_revenue_cents, 150);
    assert_eq!(report.total_transactions, 2);
    let best = report.best_seller.unwrap();
    assert_eq!(best.product_id, a);
    assert_eq!(best.name, "Product A");
    assert_eq!(best.sold_qty, 2);
}

#[tokio::test]
async fn test_empty_range_reports_zeros() {
    let db = memory_db().await;
    catalog(&db, &[("Product A", 50, 100)]).await;

    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let report = db
        .report_service(jakarta())
        .report_range(start, start + Duration::days(1))
        .await
        .unwrap();

    assert_eq!(report.total_revenue_cents, 0);
    assert_eq!(report.total_transactions, 0);
    assert!(report.best_seller.is_none());
}

#[tokio::test]
async fn test_end_of_day_instant_is_included() {
    let db = memory_db().await;
    let products = catalog(&db, &[("Product A", 100, 100)]).await;
    let a = products[0].id;
    let utc = FixedOffset::east_opt(0).unwrap();
    let day = ReportPeriod::for_day(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(), utc);

    record(&db, day.end, &[(a, 1, 100)]).await;
    record(&db, day.start, &[(a, 1, 100)]).await;
    record(&db, day.end + Duration::nanoseconds(1), &[(a, 1, 100)]).await;
    record(&db, day.start - Duration::nanoseconds(1), &[(a, 1, 100)]).await;

    let report = db
        .report_service(utc)
        .report_range(day.start, day.end)
        .await
        .unwrap();

    assert_eq!(report.total_transactions, 2);
    assert_eq!(report.total_revenue_cents, 200);
}

#[tokio::test]
async fn test_best_seller_tie_goes_to_lowest_id() {
    let db = memory_db().await;
    let products = catalog(&db, &[("First", 10, 100), ("Second", 10, 100)]).await;
    let (first, second) = (products[0].id, products[1].id);
    let at = Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap();

    record(&db, at, &[(second, 3, 10)]).await;
    record(&db, at + Duration::minutes(1), &[(first, 1, 10), (second, 1, 10)]).await;
    record(&db, at + Duration::minutes(2), &[(first, 3, 10)]).await;

    let report = db
        .report_service(FixedOffset::east_opt(0).unwrap())
        .report_dates(
            NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
        )
        .await
        .unwrap();

    let best = report.best_seller.unwrap();
    assert_eq!(best.sold_qty, 4);
    assert_eq!(best.product_id, first);
}

#[tokio::test]
async fn test_report_dates_spans_several_days() {
    let db = memory_db().await;
    let products = catalog(&db, &[("Product A", 100, 100)]).await;
    let a = products[0].id;
    let offset = jakarta();

    record(&db, local(offset, 2026, 4, 1, 0, 0), &[(a, 1, 100)]).await;
    record(&db, local(offset, 2026, 4, 3, 23, 59), &[(a, 2, 100)]).await;
    record(&db, local(offset, 2026, 4, 4, 0, 0), &[(a, 4, 100)]).await;

    let report = db
        .report_service(offset)
        .report_dates(
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 4, 3).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(report.total_transactions, 2);
    assert_eq!(report.total_revenue_cents, 300);
    assert_eq!(report.best_seller.unwrap().sold_qty, 3);
}

#[tokio::test]
async fn test_inverted_range_rejected() {
    let db = memory_db().await;
    let start = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();

    let err = db
        .report_service(jakarta())
        .report_range(start, start - Duration::seconds(1))
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::InvalidRange { .. }));

    let err = db
        .report_service(jakarta())
        .report_dates(
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::InvalidRange { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_uncommitted_checkout_is_invisible() {
    let temp = TempDb::new().await;
    let products = catalog(&temp.db, &[("Product A", 100, 100)]).await;
    let a = products[0].id;
    let at = Utc::now();

    let mut open = temp.db.begin().await.unwrap();
    TransactionRepository::insert(
        &mut open,
        &NewTransaction {
            created_at: at,
            total: Money::from_cents(100),
            lines: vec![NewTransactionLine {
                product_id: a,
                quantity: 1,
                unit_price: Money::from_cents(100),
                subtotal: Money::from_cents(100),
            }],
        },
    )
    .await
    .unwrap();

    let service = temp.db.report_service(FixedOffset::east_opt(0).unwrap());
    let window = (at - Duration::hours(1), at + Duration::hours(1));

    let before = service.report_range(window.0, window.1).await.unwrap();
    assert_eq!(before.total_transactions, 0);

    open.commit().await.unwrap();

    let after = service.report_range(window.0, window.1).await.unwrap();
    assert_eq!(after.total_transactions, 1);
    assert_eq!(after.total_revenue_cents, 100);
}
