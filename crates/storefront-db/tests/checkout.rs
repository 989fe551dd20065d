//! Checkout integration tests: atomicity, stock arithmetic, concurrency.

mod common;

use std::time::Duration;

use common::{catalog, memory_db, stock_of, TempDb};
use storefront_core::{CartLine, CheckoutRequest, Money, ProductInput, MAX_ITEM_QUANTITY};
use storefront_db::{CheckoutError, ProductRepository};

fn cart(lines: &[(i64, i64)]) -> CheckoutRequest {
    CheckoutRequest::new(
        lines.iter().map(|&(id, qty)| CartLine::new(id, qty)).collect(),
        Money::zero(),
    )
}

// =============================================================================
// Single checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_totals_and_stock_deltas() {
    let db = memory_db().await;
    let products = catalog(&db, &[("Kopi", 1500, 10), ("Roti", 2500, 5)]).await;
    let (kopi, roti) = (products[0].id, products[1].id);

    let transaction = db
        .checkout()
        .checkout(cart(&[(roti, 1), (kopi, 2)]))
        .await
        .unwrap();

    assert_eq!(transaction.total_cents, 2 * 1500 + 2500);
    assert_eq!(transaction.details.len(), 2);
    // submitted order, not lock order
    assert_eq!(transaction.details[0].product_id, roti);
    assert_eq!(transaction.details[0].subtotal_cents, 2500);
    assert_eq!(transaction.details[1].product_id, kopi);
    assert_eq!(transaction.details[1].unit_price_cents, 1500);
    assert_eq!(transaction.details[1].subtotal_cents, 3000);
    assert_eq!(
        transaction.total(),
        transaction.details.iter().map(|d| d.subtotal()).sum::<Money>()
    );

    assert_eq!(stock_of(&db, kopi).await, 8);
    assert_eq!(stock_of(&db, roti).await, 4);

    let stored = db
        .transactions()
        .get_by_id(transaction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total_cents, transaction.total_cents);
    assert_eq!(stored.details, transaction.details);
}

#[tokio::test]
async fn test_checkout_can_take_all_stock() {
    let db = memory_db().await;
    let products = catalog(&db, &[("Kopi", 1000, 3)]).await;

    db.checkout()
        .checkout(cart(&[(products[0].id, 3)]))
        .await
        .unwrap();

    assert_eq!(stock_of(&db, products[0].id).await, 0);
}

#[tokio::test]
async fn test_client_total_is_ignored() {
    let db = memory_db().await;
    let products = catalog(&db, &[("Kopi", 1000, 3)]).await;

    let request = CheckoutRequest::new(vec![CartLine::new(products[0].id, 2)], Money::from_cents(1));
    let transaction = db.checkout().checkout(request).await.unwrap();

    assert_eq!(transaction.total_cents, 2000);
}

#[tokio::test]
async fn test_unit_price_is_captured_at_sale() {
    let db = memory_db().await;
    let products = catalog(&db, &[("Kopi", 1000, 10)]).await;
    let product = &products[0];

    let transaction = db
        .checkout()
        .checkout(cart(&[(product.id, 1)]))
        .await
        .unwrap();

    db.products()
        .update(
            product.id,
            &ProductInput {
                name: product.name.clone(),
                description: String::new(),
                price_cents: 9999,
                stock: 9,
                category_id: product.category_id,
            },
        )
        .await
        .unwrap();

    let stored = db
        .transactions()
        .get_by_id(transaction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.details[0].unit_price_cents, 1000);
    assert_eq!(stored.total_cents, 1000);
}

// =============================================================================
// Rejections leave no trace
// =============================================================================

#[tokio::test]
async fn test_empty_cart_rejected() {
    let db = memory_db().await;

    let err = db.checkout().checkout(cart(&[])).await.unwrap_err();

    assert_eq!(err, CheckoutError::EmptyCart);
    assert_eq!(db.transactions().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_quantity_rejected() {
    let db = memory_db().await;
    let products = catalog(&db, &[("Kopi", 1000, 10)]).await;
    let id = products[0].id;

    for quantity in [0, -2, MAX_ITEM_QUANTITY + 1] {
        let err = db
            .checkout()
            .checkout(cart(&[(id, quantity)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InvalidQuantity { product_id, .. } if product_id == id
        ));
    }

    assert_eq!(stock_of(&db, id).await, 10);
}

#[tokio::test]
async fn test_duplicate_line_rejected_without_stock_change() {
    let db = memory_db().await;
    let products = catalog(&db, &[("Kopi", 1000, 10), ("Roti", 500, 10)]).await;
    let (kopi, roti) = (products[0].id, products[1].id);

    let err = db
        .checkout()
        .checkout(cart(&[(kopi, 1), (roti, 1), (kopi, 2)]))
        .await
        .unwrap_err();

    assert_eq!(err, CheckoutError::DuplicateLineItem { product_id: kopi });
    assert_eq!(stock_of(&db, kopi).await, 10);
    assert_eq!(stock_of(&db, roti).await, 10);
    assert_eq!(db.transactions().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_insufficient_stock_rolls_back_every_line() {
    let db = memory_db().await;
    let products = catalog(&db, &[("Kopi", 1000, 10), ("Roti", 500, 5)]).await;
    let (kopi, roti) = (products[0].id, products[1].id);

    let err = db
        .checkout()
        .checkout(cart(&[(kopi, 2), (roti, 6)]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        CheckoutError::InsufficientStock {
            product_id: roti,
            requested: 6,
            available: 5
        }
    );
    assert!(err.is_client_fault());
    assert_eq!(stock_of(&db, kopi).await, 10);
    assert_eq!(stock_of(&db, roti).await, 5);
    assert_eq!(db.transactions().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_overflowing_total_rejected_as_client_fault() {
    let db = memory_db().await;
    let price = 5_000_000_000_000_000_000;
    let products = catalog(&db, &[("Berlian", price, 2), ("Emas", price, 2)]).await;
    let (a, b) = (products[0].id, products[1].id);

    let err = db
        .checkout()
        .checkout(cart(&[(a, 1), (b, 1)]))
        .await
        .unwrap_err();

    assert_eq!(err, CheckoutError::AmountOverflow { product_id: b });
    assert!(err.is_client_fault());
    assert_eq!(stock_of(&db, a).await, 2);
    assert_eq!(stock_of(&db, b).await, 2);
    assert_eq!(db.transactions().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_product_rolls_back() {
    let db = memory_db().await;
    let products = catalog(&db, &[("Kopi", 1000, 10)]).await;
    let kopi = products[0].id;

    let err = db
        .checkout()
        .checkout(cart(&[(kopi, 1), (9_999, 1)]))
        .await
        .unwrap_err();

    assert_eq!(err, CheckoutError::ProductNotFound { product_id: 9_999 });
    assert_eq!(stock_of(&db, kopi).await, 10);
    assert_eq!(db.transactions().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_soft_deleted_product_not_sold() {
    let db = memory_db().await;
    let products = catalog(&db, &[("Kopi", 1000, 10)]).await;
    let kopi = products[0].id;
    db.products().soft_delete(kopi).await.unwrap();

    let err = db
        .checkout()
        .checkout(cart(&[(kopi, 1)]))
        .await
        .unwrap_err();

    assert_eq!(err, CheckoutError::ProductNotFound { product_id: kopi });
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_full_stock_checkouts_single_winner() {
    let temp = TempDb::new().await;
    let products = catalog(&temp.db, &[("Martabak", 3500, 5)]).await;
    let id = products[0].id;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let service = temp.db.checkout();
        handles.push(tokio::spawn(async move {
            service.checkout(cart(&[(id, 5)])).await
        }));
    }

    let mut successes = 0;
    let mut insufficient = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(CheckoutError::InsufficientStock { available, .. }) => {
                assert_eq!(available, 0);
                insufficient += 1;
            }
            Err(other) => panic!("unexpected checkout error: {other}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(insufficient, 19);
    assert_eq!(stock_of(&temp.db, id).await, 0);
    assert_eq!(temp.db.transactions().count().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_single_unit_checkouts_never_oversell() {
    let temp = TempDb::new().await;
    let products = catalog(&temp.db, &[("Kopi", 1000, 10)]).await;
    let id = products[0].id;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = temp.db.checkout();
        handles.push(tokio::spawn(async move {
            service.checkout(cart(&[(id, 1)])).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 10);
    assert_eq!(stock_of(&temp.db, id).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_opposite_cart_orders_all_complete() {
    let temp = TempDb::new().await;
    let products = catalog(&temp.db, &[("Kopi", 1000, 100), ("Roti", 500, 100)]).await;
    let (kopi, roti) = (products[0].id, products[1].id);

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = temp.db.checkout();
        let lines = if i % 2 == 0 {
            [(kopi, 1), (roti, 1)]
        } else {
            [(roti, 1), (kopi, 1)]
        };
        handles.push(tokio::spawn(async move { service.checkout(cart(&lines)).await }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(stock_of(&temp.db, kopi).await, 80);
    assert_eq!(stock_of(&temp.db, roti).await, 80);
    assert_eq!(temp.db.transactions().count().await.unwrap(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_lock_wait_is_bounded() {
    let temp = TempDb::with_lock_timeout(Duration::from_millis(100)).await;
    let products = catalog(&temp.db, &[("Kopi", 1000, 10)]).await;
    let id = products[0].id;

    // another writer holds the product
    let mut holder = temp.db.begin().await.unwrap();
    ProductRepository::get_for_update(&mut holder, id)
        .await
        .unwrap()
        .unwrap();

    let err = temp
        .db
        .checkout()
        .checkout(cart(&[(id, 1)]))
        .await
        .unwrap_err();

    assert_eq!(err, CheckoutError::LockTimeout);
    assert!(!err.is_client_fault());

    holder.rollback().await.unwrap();

    // released: the same request now goes through
    temp.db
        .checkout()
        .checkout(cart(&[(id, 1)]))
        .await
        .unwrap();
    assert_eq!(stock_of(&temp.db, id).await, 9);
}
