//! # storefront-db: Database Layer for Storefront
//!
//! SQLite storage for the catalog and the checkout transaction engine,
//! using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  HTTP handler (POST /api/checkout)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌───────────────┐    │   │
//! │  │   │ CheckoutSvc   │   │  ReportSvc    │   │  Repositories │    │   │
//! │  │   │ (checkout.rs) │   │  (report.rs)  │   │  category     │    │   │
//! │  │   │ lock → debit  │──►│ sum / count / │──►│  product      │    │   │
//! │  │   │ → write       │   │ best seller   │   │  transaction  │    │   │
//! │  │   └───────┬───────┘   └───────────────┘   │  report       │    │   │
//! │  │           │                               └───────┬───────┘    │   │
//! │  │           ▼                                       │            │   │
//! │  │   storefront-core::ledger (pure)                  │            │   │
//! │  │                                                   ▼            │   │
//! │  │   ┌───────────────┐                       ┌───────────────┐    │   │
//! │  │   │   Database    │◄──────────────────────│  Migrations   │    │   │
//! │  │   │   (pool.rs)   │                       │  (embedded)   │    │   │
//! │  │   └───────────────┘                       └───────────────┘    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`checkout`] - The atomic checkout unit
//! - [`report`] - Sales reporting
//! - [`seed`] - Sample catalog for development
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//!
//! let transaction = db.checkout().checkout(request).await?;
//! let today = db.report_service(offset).report_today().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod report;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutError, CheckoutService};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use report::{ReportError, ReportService};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::transaction::{NewTransaction, NewTransactionLine, TransactionRepository};
