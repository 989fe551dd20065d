//! # Repository Module
//!
//! Database repository implementations for Storefront.
//!
//! ## Two Kinds of Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Pool methods (&self)                  Connection functions (conn)      │
//! │  ─────────────────────                 ───────────────────────────      │
//! │  db.products().get_by_id(7)            ProductRepository::              │
//! │  db.categories().list(page)                get_for_update(&mut *tx, 7)  │
//! │  db.transactions().get_by_id(3)        ProductRepository::              │
//! │                                            save_stock(&mut *tx, 7, 2)   │
//! │  Each call runs on its own pooled      TransactionRepository::          │
//! │  connection, auto-committed.               insert(&mut *tx, &new)       │
//! │                                                                         │
//! │                                        Run inside a caller-owned        │
//! │                                        transaction; nothing is          │
//! │                                        visible until it commits.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`category::CategoryRepository`] - Category CRUD
//! - [`product::ProductRepository`] - Product CRUD, locking read, stock writes
//! - [`transaction::TransactionRepository`] - Transaction persistence
//! - [`report::ReportRepository`] - Sales aggregation queries

pub mod category;
pub mod product;
pub mod report;
pub mod transaction;

/// Escapes `%`, `_` and `\` so user input matches literally inside LIKE.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
