//! # Checkout Orchestrator
//!
//! Runs a whole checkout as one store transaction.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(request)                                                      │
//! │    │                                                                    │
//! │    ├── validate_cart          ✗ EmptyCart / InvalidQuantity /          │
//! │    │   (no store access)        DuplicateLineItem / CartTooLarge       │
//! │    │                                                                    │
//! │    └── attempt ◄───────────────────────────────────────────┐           │
//! │          BEGIN                                              │           │
//! │          get_for_update(id) for id in lock_order   ✗ ProductNotFound   │
//! │          CheckoutPlan::build                        ✗ InsufficientStock│
//! │          save_stock × n                                     │           │
//! │          insert transaction + details                       │           │
//! │          COMMIT                                             │           │
//! │            │                                                │           │
//! │            ├── Ok ──► Transaction                           │           │
//! │            ├── busy_timeout exhausted ──► LockTimeout       │           │
//! │            └── lock conflict ── retries left? ── yes ── backoff         │
//! │                                     │                                   │
//! │                                     no ──► StoreUnavailable             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every early return drops the open `sqlx::Transaction`, which rolls back
//! all stock writes made by the attempt. There is no compensation step.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::product::ProductRepository;
use crate::repository::transaction::{NewTransaction, TransactionRepository};
use storefront_core::ledger::{lock_order, CheckoutPlan};
use storefront_core::validation::validate_cart;
use storefront_core::{CheckoutRequest, CoreError, Transaction};

// =============================================================================
// Errors
// =============================================================================

/// Why a checkout did not produce a transaction.
///
/// In every case nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Quantity {quantity} for product {product_id} must be between 1 and {max}")]
    InvalidQuantity {
        product_id: i64,
        quantity: i64,
        max: i64,
    },

    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    #[error("Product {product_id} appears more than once in the cart")]
    DuplicateLineItem { product_id: i64 },

    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: i64 },

    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("Order amount exceeds the supported range at product {product_id}")]
    AmountOverflow { product_id: i64 },

    /// Another checkout held the products longer than the lock timeout.
    #[error("Timed out waiting for product locks")]
    LockTimeout,

    /// The store failed, or lock conflicts outlasted the retry budget.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl CheckoutError {
    /// Returns true when resubmitting the same request cannot succeed
    /// without the client changing it (or the catalog changing).
    pub fn is_client_fault(&self) -> bool {
        !matches!(
            self,
            CheckoutError::LockTimeout | CheckoutError::StoreUnavailable(_)
        )
    }
}

impl From<CoreError> for CheckoutError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyCart => CheckoutError::EmptyCart,
            CoreError::InvalidQuantity {
                product_id,
                quantity,
                max,
            } => CheckoutError::InvalidQuantity {
                product_id,
                quantity,
                max,
            },
            CoreError::CartTooLarge { max } => CheckoutError::CartTooLarge { max },
            CoreError::DuplicateLineItem { product_id } => {
                CheckoutError::DuplicateLineItem { product_id }
            }
            CoreError::ProductNotFound { product_id } => {
                CheckoutError::ProductNotFound { product_id }
            }
            CoreError::InsufficientStock {
                product_id,
                requested,
                available,
            } => CheckoutError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            CoreError::AmountOverflow { product_id } => {
                CheckoutError::AmountOverflow { product_id }
            }
            other => CheckoutError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<DbError> for CheckoutError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::LockTimeout => CheckoutError::LockTimeout,
            other => CheckoutError::StoreUnavailable(other.to_string()),
        }
    }
}

/// Outcome of a single attempt, before retry classification.
#[derive(Debug)]
enum AttemptError {
    Rejected(CoreError),
    Store(DbError),
}

impl From<CoreError> for AttemptError {
    fn from(err: CoreError) -> Self {
        AttemptError::Rejected(err)
    }
}

impl From<DbError> for AttemptError {
    fn from(err: DbError) -> Self {
        AttemptError::Store(err)
    }
}

impl From<sqlx::Error> for AttemptError {
    fn from(err: sqlx::Error) -> Self {
        AttemptError::Store(DbError::from(err))
    }
}

impl From<AttemptError> for CheckoutError {
    fn from(err: AttemptError) -> Self {
        match err {
            AttemptError::Rejected(e) => e.into(),
            AttemptError::Store(e) => e.into(),
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Stateless checkout handle. Clone freely; all clones share the pool.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl CheckoutService {
    pub fn new(db: Database) -> Self {
        CheckoutService {
            db,
            max_retries: 2,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(200),
        }
    }

    /// Sets how many times a conflicted checkout is re-run.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Places an order: validates the cart, then decrements stock and
    /// records the transaction atomically.
    ///
    /// ## Returns
    /// * `Ok(Transaction)` - Committed; stock is decremented for every line
    /// * `Err(CheckoutError)` - Nothing was written
    ///
    /// ## Example
    /// ```rust,ignore
    /// let request = CheckoutRequest::new(vec![CartLine::new(1, 2)], Money::from_cents(3000));
    /// let transaction = db.checkout().checkout(request).await?;
    /// ```
    #[tracing::instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<Transaction, CheckoutError> {
        validate_cart(&request.items)?;

        let request = &request;
        self.with_retries(move || self.attempt(request)).await
    }

    /// Runs `attempt` until it succeeds, fails for a non-retryable reason, or
    /// has been re-run `max_retries` times after lock conflicts.
    async fn with_retries<T, F, Fut>(&self, mut attempt: F) -> Result<T, CheckoutError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let mut backoff = self.create_backoff();
        let mut retry_count = 0u32;

        loop {
            match attempt().await {
                Ok(value) => return Ok(value),

                Err(AttemptError::Store(err))
                    if err.is_retryable() && retry_count < self.max_retries =>
                {
                    retry_count += 1;
                    let delay = backoff.next_backoff().unwrap_or(self.max_backoff);
                    warn!(
                        error = %err,
                        attempt = retry_count,
                        ?delay,
                        "Checkout hit a lock conflict, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }

                Err(err) => {
                    if let AttemptError::Store(store_err) = &err {
                        warn!(error = %store_err, retries = retry_count, "Checkout failed in store");
                    }
                    return Err(err.into());
                }
            }
        }
    }

    /// One run of the atomic unit.
    async fn attempt(&self, request: &CheckoutRequest) -> Result<Transaction, AttemptError> {
        let mut tx = self.db.begin().await?;

        // ascending id order; no two checkouts can wait on each other in a cycle
        let mut locked = HashMap::with_capacity(request.items.len());
        for product_id in lock_order(&request.items) {
            let product = ProductRepository::get_for_update(&mut tx, product_id)
                .await?
                .ok_or(CoreError::ProductNotFound { product_id })?;
            locked.insert(product_id, product);
        }

        let plan = CheckoutPlan::build(&request.items, &locked)?;

        let delta = plan.client_total_delta(request.client_total);
        if !request.client_total.is_zero() && !delta.is_zero() {
            warn!(
                client_total_cents = request.client_total.cents(),
                server_total_cents = plan.total.cents(),
                "Client total does not match locked prices"
            );
        }

        for debit in &plan.debits {
            debug!(
                product_id = debit.product_id,
                before = debit.stock_before,
                after = debit.stock_after,
                "Debiting stock"
            );
            ProductRepository::save_stock(&mut tx, debit.product_id, debit.stock_after).await?;
        }

        let new = NewTransaction::from_plan(&plan, Utc::now());
        let transaction = TransactionRepository::insert(&mut tx, &new).await?;

        tx.commit().await?;

        info!(
            transaction_id = transaction.id,
            total_cents = transaction.total_cents,
            lines = transaction.details.len(),
            "Checkout committed"
        );

        Ok(transaction)
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}
