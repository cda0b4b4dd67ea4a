//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Paged, sorted listing
//! - CRUD operations
//! - Existence checks used when resolving order lines
//!
//! Price and weight are stored as integers (cents, grams); the `Money` and
//! `Weight` newtypes decode straight from those columns.

use chrono::Utc;
use orderdesk_core::{Page, PageRequest, Product, ProductInput};
use sqlx::SqlitePool;
use tracing::debug;

use super::{order_by_clause, SortColumns};
use crate::error::{DbError, DbResult};

pub(crate) const SELECT_COLUMNS: &str =
    "id, name, description, price, weight, created_at, updated_at";

const SORT_COLUMNS: SortColumns = &[
    ("id", "id"),
    ("name", "name"),
    ("description", "description"),
    ("price", "price"),
    ("weight", "weight"),
    ("created_at", "created_at"),
    ("updated_at", "updated_at"),
];

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Returns one page of products.
    pub async fn list_page(&self, request: &PageRequest) -> DbResult<Page<Product>> {
        let order_by = order_by_clause("products", SORT_COLUMNS, "id", request)?;
        let sql = format!(
            "SELECT {} FROM products {} LIMIT ?1 OFFSET ?2",
            SELECT_COLUMNS, order_by
        );

        debug!(
            page = request.page,
            sort_field = %request.sort_field,
            sort_dir = request.sort_dir.as_str(),
            "Listing products"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = self.count().await?;
        Ok(Page::new(products, request, total))
    }

    /// Every product, sorted by name (for the order line select boxes).
    pub async fn all(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY name COLLATE NOCASE, id",
            SELECT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", SELECT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Inserts a new product.
    pub async fn insert(&self, input: &ProductInput) -> DbResult<Product> {
        let now = Utc::now();
        let name = input.name.trim();
        let description = input.description.trim();

        debug!(name = %name, price = %input.price, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, description, price, weight, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(input.price)
        .bind(input.weight)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            description: description.to_string(),
            price: input.price,
            weight: input.weight,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrites an existing product.
    ///
    /// Totals of orders already holding this product are not recomputed;
    /// they change the next time each order is saved.
    pub async fn update(&self, id: i64, input: &ProductInput) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price = ?4,
                weight = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.description.trim())
        .bind(input.price)
        .bind(input.weight)
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

    /// Deletes a product.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no product with this id
    /// * `DbError::Conflict` - an order item still holds the product
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => {
                    DbError::conflict("Product", id, "order items still reference this product")
                }
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use orderdesk_core::{Money, Weight};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn input(name: &str, price_cents: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            description: format!("{} description", name),
            price: Money::from_cents(price_cents),
            weight: Weight::from_grams(1_250),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_keeps_exact_amounts() {
        let db = setup().await;
        let repo = db.products();

        let created = repo.insert(&input("Coffee", 1_050)).await.unwrap();
        let loaded = repo.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(loaded.price, Money::from_cents(1_050));
        assert_eq!(loaded.weight, Weight::from_grams(1_250));
        assert_eq!(loaded.name, "Coffee");
    }

    #[tokio::test]
    async fn test_update_and_missing_update() {
        let db = setup().await;
        let repo = db.products();
        let created = repo.insert(&input("Tea", 300)).await.unwrap();
        let stored = repo.get_by_id(created.id).await.unwrap().unwrap();

        let updated = repo.update(created.id, &input("Green Tea", 450)).await.unwrap();
        assert_eq!(updated.name, "Green Tea");
        assert_eq!(updated.price.cents(), 450);
        assert_eq!(updated.created_at, stored.created_at);

        assert!(repo.update(999, &input("Ghost", 1)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_page_sorted_by_price() {
        let db = setup().await;
        let repo = db.products();
        for (name, cents) in [("A", 500), ("B", 100), ("C", 300), ("D", 300)] {
            repo.insert(&input(name, cents)).await.unwrap();
        }

        let asc = repo
            .list_page(&PageRequest::new(1, Some("price"), Some("asc")).unwrap())
            .await
            .unwrap();
        let prices: Vec<i64> = asc.items.iter().map(|p| p.price.cents()).collect();
        assert_eq!(prices, vec![100, 300, 300, 500]);
        // Equal prices keep id order
        assert_eq!(asc.items[1].name, "C");
        assert_eq!(asc.items[2].name, "D");

        let desc = repo
            .list_page(&PageRequest::new(1, Some("price"), Some("desc")).unwrap())
            .await
            .unwrap();
        let prices: Vec<i64> = desc.items.iter().map(|p| p.price.cents()).collect();
        assert_eq!(prices, vec![500, 300, 300, 100]);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = setup().await;
        let repo = db.products();
        let p = repo.insert(&input("Sugar", 250)).await.unwrap();

        repo.delete(p.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.delete(p.id).await.unwrap_err().is_not_found());
    }
}
