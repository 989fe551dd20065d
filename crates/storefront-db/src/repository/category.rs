//! # Category Repository
//!
//! CRUD for product categories. Deletion is soft: the row stays so that
//! products and past transactions keep a valid reference.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::pagination::{Page, PageMeta, PageRequest};
use storefront_core::{Category, CategoryInput};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Inserts a category and returns the stored row.
    pub async fn create(&self, input: &CategoryInput) -> DbResult<Category> {
        debug!(name = %input.name, "Inserting category");

        let now = Utc::now();

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Gets an active category by id.
    ///
    /// ## Returns
    /// * `Ok(Some(Category))` - Category found
    /// * `Ok(None)` - Never existed or soft-deleted
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Returns true when an active category with this id exists.
    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE id = ?1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Lists active categories ordered by id.
    pub async fn list(&self, page: PageRequest) -> DbResult<Page<Category>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        let data = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            WHERE deleted_at IS NULL
            ORDER BY id
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        debug!(count = data.len(), total, "Listed categories");

        Ok(Page {
            data,
            meta: PageMeta::new(page, total),
        })
    }

    /// Replaces the name and description of an active category.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Category doesn't exist or was deleted
    pub async fn update(&self, id: i64, input: &CategoryInput) -> DbResult<Category> {
        debug!(id, "Updating category");

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = ?2, description = ?3, updated_at = ?4
            WHERE id = ?1 AND deleted_at IS NULL
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        category.ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Soft-deletes a category.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft-deleting category");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET deleted_at = ?2, updated_at = ?2
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Counts active categories.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use storefront_core::pagination::PageRequest;
    use storefront_core::CategoryInput;

    fn input(name: &str) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let created = repo.create(&input("  Minuman ")).await.unwrap();
        assert_eq!(created.name, "Minuman");

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let updated = repo.update(created.id, &input("Drinks")).await.unwrap();
        assert_eq!(updated.name, "Drinks");
        assert!(updated.updated_at >= created.updated_at);

        repo.soft_delete(created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(!repo.exists(created.id).await.unwrap());
        assert!(repo.soft_delete(created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_is_paged() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();
        for i in 0..3 {
            repo.create(&input(&format!("cat-{i}"))).await.unwrap();
        }

        let page = repo.list(PageRequest::new(Some(2), Some(2))).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.meta.total, 3);
        assert_eq!(page.meta.total_pages, 2);
        assert_eq!(page.data[0].name, "cat-2");
    }
}
