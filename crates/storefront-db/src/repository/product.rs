//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with soft delete
//! - Name filter + pagination for listings
//! - Locking read and stock write for checkout
//!
//! ## Locking Read on SQLite
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SQLite has no SELECT … FOR UPDATE. The locking read is a no-op write: │
//! │                                                                         │
//! │    UPDATE products SET stock = stock                                   │
//! │    WHERE id = ?1 AND deleted_at IS NULL                                │
//! │    RETURNING id, name, price_cents, stock                              │
//! │                                                                         │
//! │  Tx A: BEGIN ─ lock(1) ✓ writer lock held ─────────── COMMIT           │
//! │  Tx B: BEGIN ─ lock(1) ⏳ busy_timeout ... ───────────────── ✓ reads    │
//! │                                                  A's committed stock    │
//! │                                                                         │
//! │  As the first statement of a transaction it takes the database writer  │
//! │  lock, so the returned stock cannot change until COMMIT/ROLLBACK.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::like_pattern;
use storefront_core::ledger::LockedProduct;
use storefront_core::pagination::{Page, PageMeta, PageRequest};
use storefront_core::{Money, Product, ProductInput};

const PRODUCT_COLUMNS: &str = r#"
    p.id,
    p.category_id,
    c.name AS category_name,
    p.name,
    p.description,
    p.price_cents,
    p.stock,
    p.created_at,
    p.updated_at
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let page = repo.list(Some("kopi"), PageRequest::default()).await?;
/// let product = repo.get_by_id(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Inserts a product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Stored product, including its category name
    /// * `Err(DbError::NotFound)` - Category missing or soft-deleted
    pub async fn create(&self, input: &ProductInput) -> DbResult<Product> {
        debug!(name = %input.name, category_id = input.category_id, "Inserting product");

        self.ensure_category(input.category_id).await?;

        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (
                category_id, name, description, price_cents, stock,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING id
            "#,
        )
        .bind(input.category_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.stock)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Gets an active product by id, with its category name.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Never existed or soft-deleted
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id AND c.deleted_at IS NULL
            WHERE p.id = ?1 AND p.deleted_at IS NULL
            "#
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists active products, optionally filtered by a case-insensitive
    /// substring of the name.
    pub async fn list(&self, name: Option<&str>, page: PageRequest) -> DbResult<Page<Product>> {
        let pattern = name
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(like_pattern);

        debug!(filter = ?pattern, page = page.page, limit = page.limit, "Listing products");

        // ?1 IS NULL disables the filter
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM products p
            WHERE p.deleted_at IS NULL
              AND (?1 IS NULL OR p.name LIKE ?1 ESCAPE '\')
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id AND c.deleted_at IS NULL
            WHERE p.deleted_at IS NULL
              AND (?1 IS NULL OR p.name LIKE ?1 ESCAPE '\')
            ORDER BY p.id
            LIMIT ?2 OFFSET ?3
            "#
        );

        let data = sqlx::query_as::<_, Product>(&sql)
            .bind(pattern.as_deref())
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            data,
            meta: PageMeta::new(page, total),
        })
    }

    /// Replaces every editable field of an active product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product or category doesn't exist
    pub async fn update(&self, id: i64, input: &ProductInput) -> DbResult<Product> {
        debug!(id, "Updating product");

        self.ensure_category(input.category_id).await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                category_id = ?2,
                name = ?3,
                description = ?4,
                price_cents = ?5,
                stock = ?6,
                updated_at = ?7
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(input.category_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.stock)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product.
    ///
    /// Past transaction details keep pointing at the row, so reports still
    /// resolve its name.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET deleted_at = ?2, updated_at = ?2
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn ensure_category(&self, category_id: i64) -> DbResult<()> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE id = ?1 AND deleted_at IS NULL)",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        if !exists {
            return Err(DbError::not_found("Category", category_id));
        }

        Ok(())
    }

    // =========================================================================
    // Checkout (connection-scoped)
    // =========================================================================

    /// Reads a product under an exclusive lock held until the enclosing
    /// transaction ends.
    ///
    /// ## Returns
    /// * `Ok(Some(LockedProduct))` - Row locked
    /// * `Ok(None)` - Never existed or soft-deleted
    /// * `Err(DbError::LockTimeout)` - Lock not obtained within busy_timeout
    pub async fn get_for_update(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> DbResult<Option<LockedProduct>> {
        debug!(product_id = id, "Locking product");

        let row: Option<(i64, String, i64, i64)> = sqlx::query_as(
            r#"
            UPDATE products SET stock = stock
            WHERE id = ?1 AND deleted_at IS NULL
            RETURNING id, name, price_cents, stock
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(|(id, name, price_cents, stock)| LockedProduct {
            id,
            name,
            price: Money::from_cents(price_cents),
            stock,
        }))
    }

    /// Writes a new stock level computed from a locked read.
    pub async fn save_stock(conn: &mut SqliteConnection, id: i64, new_stock: i64) -> DbResult<()> {
        debug!(product_id = id, stock = new_stock, "Saving stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = ?2, updated_at = ?3
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(new_stock)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use storefront_core::CategoryInput;

    async fn setup() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category = db
            .categories()
            .create(&CategoryInput {
                name: "Makanan".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        (db, category.id)
    }

    fn input(name: &str, category_id: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            description: String::new(),
            price_cents: 1500,
            stock: 10,
            category_id,
        }
    }

    #[tokio::test]
    async fn test_create_includes_category_name() {
        let (db, category_id) = setup().await;

        let product = db.products().create(&input("Nasi Goreng", category_id)).await.unwrap();

        assert_eq!(product.category_name.as_deref(), Some("Makanan"));
        assert_eq!(product.price().cents(), 1500);
        assert_eq!(product.stock, 10);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_category() {
        let (db, _) = setup().await;

        let err = db.products().create(&input("Mie", 999)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_by_name_case_insensitively() {
        let (db, category_id) = setup().await;
        let repo = db.products();
        repo.create(&input("Kopi Susu", category_id)).await.unwrap();
        repo.create(&input("Es KOPI", category_id)).await.unwrap();
        repo.create(&input("Teh Manis", category_id)).await.unwrap();

        let page = repo.list(Some("kopi"), PageRequest::default()).await.unwrap();
        assert_eq!(page.meta.total, 2);
        assert_eq!(page.data.len(), 2);

        let all = repo.list(None, PageRequest::default()).await.unwrap();
        assert_eq!(all.meta.total, 3);

        let literal = repo.list(Some("%"), PageRequest::default()).await.unwrap();
        assert_eq!(literal.meta.total, 0);
    }

    #[tokio::test]
    async fn test_soft_deleted_product_cannot_be_locked() {
        let (db, category_id) = setup().await;
        let product = db.products().create(&input("Roti", category_id)).await.unwrap();

        db.products().soft_delete(product.id).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        let locked = ProductRepository::get_for_update(&mut tx, product.id)
            .await
            .unwrap();
        assert!(locked.is_none());
        tx.rollback().await.unwrap();

        assert!(db.products().get_by_id(product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_stock_rolls_back_with_transaction() {
        let (db, category_id) = setup().await;
        let product = db.products().create(&input("Roti", category_id)).await.unwrap();

        {
            let mut tx = db.begin().await.unwrap();
            let locked = ProductRepository::get_for_update(&mut tx, product.id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(locked.stock, 10);
            ProductRepository::save_stock(&mut tx, product.id, 3).await.unwrap();
            // dropped without commit
        }

        let reread = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(reread.stock, 10);
    }

    #[tokio::test]
    async fn test_negative_stock_rejected_by_schema() {
        let (db, category_id) = setup().await;
        let product = db.products().create(&input("Roti", category_id)).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        let err = ProductRepository::save_stock(&mut tx, product.id, -1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }
}
