//! # Order Repository
//!
//! Database operations for orders and their items.
//!
//! ## Save Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  OrderRepository::save(id?, input)                      │
//! │                                                                         │
//! │  BEGIN IMMEDIATE (write lock taken up front)                           │
//! │   1. client_id given? ──► must exist, else field error                 │
//! │   2. resolve lines    ──► drop lines whose product is missing          │
//! │   3. upsert order row ──► INSERT (new) or UPDATE (edit, 404 if gone)   │
//! │   4. plan_item_changes(existing items, resolved lines)                 │
//! │        ├── DELETE items no longer submitted                            │
//! │        ├── UPDATE items whose product/quantity changed                 │
//! │        └── INSERT new lines                                            │
//! │   5. total_price = Σ price × quantity over the items as stored         │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any error before COMMIT rolls everything back.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting an order removes its items first, in the same transaction.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use orderdesk_core::pricing::{order_total, plan_item_changes, resolve_lines, ItemChangeSet, PricedLine};
use orderdesk_core::{
    Money, Order, OrderInput, OrderItem, OrderLineInput, OrderSummary, Page, PageRequest, Product,
    ValidationError,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::{order_by_clause, product, SortColumns};
use crate::error::{DbError, DbResult};

const ORDER_COLUMNS: &str = "id, client_id, total_price, delivery_days, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, created_at, updated_at";

/// Product ids bound per `IN (...)` lookup.
const PRODUCT_ID_BATCH: usize = 500;

const SORT_COLUMNS: SortColumns = &[
    ("id", "o.id"),
    ("client", "c.name"),
    ("client_name", "c.name"),
    ("client_id", "o.client_id"),
    ("total_price", "o.total_price"),
    ("delivery_days", "o.delivery_days"),
    ("item_count", "item_count"),
    ("created_at", "o.created_at"),
    ("updated_at", "o.updated_at"),
];

/// Repository for order database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = OrderRepository::new(pool);
///
/// let input = OrderInput {
///     client_id: Some(1),
///     delivery_days: 3,
///     lines: vec![OrderLineInput { id: None, product_id: Some(4), quantity: 2 }],
/// };
/// let order = repo.save(None, &input).await?;
/// assert!(order.total_is_consistent());
/// ```
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Returns one page of orders joined with their client's name.
    pub async fn list_page(&self, request: &PageRequest) -> DbResult<Page<OrderSummary>> {
        let order_by = order_by_clause("orders", SORT_COLUMNS, "o.id", request)?;
        let sql = format!(
            r#"
            SELECT
                o.id,
                o.client_id,
                c.name AS client_name,
                o.total_price,
                o.delivery_days,
                (SELECT COUNT(*) FROM order_items i WHERE i.order_id = o.id) AS item_count
            FROM orders o
            LEFT JOIN clients c ON c.id = o.client_id
            {}
            LIMIT ?1 OFFSET ?2
            "#,
            order_by
        );

        debug!(
            page = request.page,
            sort_field = %request.sort_field,
            sort_dir = request.sort_dir.as_str(),
            "Listing orders"
        );

        let orders = sqlx::query_as::<_, OrderSummary>(&sql)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = self.count().await?;
        Ok(Page::new(orders, request, total))
    }

    /// Gets an order with its items, each item carrying its product.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        match order {
            Some(mut order) => {
                order.items = load_items(&mut conn, id).await?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// Creates (`id == None`) or edits an order and reconciles its items.
    ///
    /// The input is expected to have passed `validate_order`. Lines whose
    /// product cannot be found are skipped; the stored total always equals
    /// the sum over the items as stored.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - editing an order that does not exist
    /// * `DbError::Validation` - `client_id` names no client
    pub async fn save(&self, id: Option<i64>, input: &OrderInput) -> DbResult<Order> {
        let now = Utc::now();
        // A deferred transaction that reads before writing cannot wait on
        // the busy timeout once another writer commits, so lock first.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        if let Some(client_id) = input.client_id {
            let found: i64 =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = ?1)")
                    .bind(client_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if found == 0 {
                return Err(DbError::Validation(
                    ValidationError::InvalidFormat {
                        field: "client_id".to_string(),
                        reason: format!("no client with id {}", client_id),
                    }
                    .into(),
                ));
            }
        }

        let known = existing_product_ids(&mut tx, &input.lines).await?;
        let drafts = resolve_lines(&input.lines, |product_id| known.contains(&product_id));

        let skipped = input.lines.len() - drafts.len();
        if skipped > 0 {
            debug!(skipped, "Skipping order lines without a known product");
        }

        let order_id = match id {
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE orders SET
                        client_id = ?2,
                        delivery_days = ?3,
                        updated_at = ?4
                    WHERE id = ?1
                    "#,
                )
                .bind(id)
                .bind(input.client_id)
                .bind(input.delivery_days)
                .bind(now)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::not_found("Order", id));
                }
                id
            }
            None => sqlx::query(
                r#"
                INSERT INTO orders (client_id, total_price, delivery_days, created_at, updated_at)
                VALUES (?1, 0, ?2, ?3, ?3)
                "#,
            )
            .bind(input.client_id)
            .bind(input.delivery_days)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid(),
        };

        let sql = format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY id",
            ITEM_COLUMNS
        );
        let existing = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .fetch_all(&mut *tx)
            .await?;

        let plan = plan_item_changes(&existing, &drafts);
        apply_plan(&mut tx, order_id, &plan, now).await?;

        let total = recompute_total(&mut tx, order_id).await?;

        tx.commit().await?;

        info!(
            order_id,
            total = %total,
            inserted = plan.inserts.len(),
            updated = plan.updates.len(),
            deleted = plan.deletes.len(),
            "Order saved"
        );

        self.get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))
    }

    /// Deletes an order and all of its items.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let mut tx = self.pool.begin().await?;

        let items = sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        tx.commit().await?;

        info!(order_id = id, items, "Order deleted");
        Ok(())
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Helpers (shared by pool and transaction paths)
// =============================================================================

/// Loads the items of an order and attaches their products.
async fn load_items(conn: &mut SqliteConnection, order_id: i64) -> DbResult<Vec<OrderItem>> {
    let sql = format!(
        "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY id",
        ITEM_COLUMNS
    );
    let mut items = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;

    let sql = format!(
        "SELECT {} FROM products WHERE id IN \
         (SELECT product_id FROM order_items WHERE order_id = ?1)",
        product::SELECT_COLUMNS
    );
    let products: HashMap<i64, Product> = sqlx::query_as::<_, Product>(&sql)
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    for item in &mut items {
        item.product = item.product_id.and_then(|id| products.get(&id).cloned());
    }

    Ok(items)
}

/// Which of the submitted product ids exist.
///
/// Looked up in batches so a long form stays under SQLite's bound
/// parameter limit.
async fn existing_product_ids(
    conn: &mut SqliteConnection,
    lines: &[OrderLineInput],
) -> DbResult<HashSet<i64>> {
    let wanted: Vec<i64> = lines
        .iter()
        .filter_map(|l| l.product_id)
        .collect::<BTreeSet<i64>>()
        .into_iter()
        .collect();

    let mut found = HashSet::with_capacity(wanted.len());
    for batch in wanted.chunks(PRODUCT_ID_BATCH) {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id FROM products WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in batch {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let ids: Vec<i64> = query
            .build_query_scalar()
            .fetch_all(&mut *conn)
            .await?;
        found.extend(ids);
    }

    Ok(found)
}

async fn apply_plan(
    conn: &mut SqliteConnection,
    order_id: i64,
    plan: &ItemChangeSet,
    now: DateTime<Utc>,
) -> DbResult<()> {
    for item_id in &plan.deletes {
        sqlx::query("DELETE FROM order_items WHERE id = ?1 AND order_id = ?2")
            .bind(item_id)
            .bind(order_id)
            .execute(&mut *conn)
            .await?;
    }

    for update in &plan.updates {
        sqlx::query(
            r#"
            UPDATE order_items SET
                product_id = ?3,
                quantity = ?4,
                updated_at = ?5
            WHERE id = ?1 AND order_id = ?2
            "#,
        )
        .bind(update.id)
        .bind(order_id)
        .bind(update.product_id)
        .bind(update.quantity)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }

    for insert in &plan.inserts {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(order_id)
        .bind(insert.product_id)
        .bind(insert.quantity)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Recomputes and stores `total_price` from the items as persisted.
async fn recompute_total(conn: &mut SqliteConnection, order_id: i64) -> DbResult<Money> {
    let rows: Vec<(i64, Option<Money>)> = sqlx::query_as(
        r#"
        SELECT i.quantity, p.price
        FROM order_items i
        LEFT JOIN products p ON p.id = i.product_id
        WHERE i.order_id = ?1
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    let lines: Vec<PricedLine> = rows
        .into_iter()
        .map(|(quantity, price)| PricedLine::new(price, quantity))
        .collect();
    let total = order_total(&lines);

    sqlx::query("UPDATE orders SET total_price = ?2 WHERE id = ?1")
        .bind(order_id)
        .bind(total)
        .execute(&mut *conn)
        .await?;

    Ok(total)
}

// =============================================================================
// Unit Tests
// =============================================================================
