//! Shared fixtures for storefront-db integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use storefront_core::{CategoryInput, Product, ProductInput};
use storefront_db::{Database, DbConfig};
use uuid::Uuid;

/// In-memory database with migrations applied.
pub async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// A file-backed database in the system temp dir, removed on drop.
///
/// Needed whenever a test wants more than one connection.
pub struct TempDb {
    pub db: Database,
    path: PathBuf,
}

impl TempDb {
    pub async fn new() -> Self {
        Self::with_lock_timeout(Duration::from_secs(5)).await
    }

    pub async fn with_lock_timeout(lock_timeout: Duration) -> Self {
        let path = std::env::temp_dir().join(format!("storefront-test-{}.db", Uuid::new_v4()));
        let config = DbConfig::new(&path)
            .max_connections(8)
            .lock_timeout(lock_timeout);
        let db = Database::new(config).await.unwrap();
        TempDb { db, path }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// Creates a category and one product per `(name, price_cents, stock)`.
pub async fn catalog(db: &Database, items: &[(&str, i64, i64)]) -> Vec<Product> {
    let category = db
        .categories()
        .create(&CategoryInput {
            name: "Test".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();

    let mut products = Vec::with_capacity(items.len());
    for (name, price_cents, stock) in items {
        let product = db
            .products()
            .create(&ProductInput {
                name: name.to_string(),
                description: String::new(),
                price_cents: *price_cents,
                stock: *stock,
                category_id: category.id,
            })
            .await
            .unwrap();
        products.push(product);
    }
    products
}

/// Current stock of a product.
pub async fn stock_of(db: &Database, id: i64) -> i64 {
    db.products().get_by_id(id).await.unwrap().unwrap().stock
}
