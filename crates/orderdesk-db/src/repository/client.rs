//! # Client Repository
//!
//! Database operations for clients.
//!
//! ## Key Operations
//! - Paged, sorted listing
//! - CRUD operations
//! - Name-sorted lookup list for the order form
//!
//! Email addresses are unique (case-insensitive). A clash is reported as a
//! field error on `email`, not as a database failure.

use chrono::Utc;
use orderdesk_core::{Client, ClientInput, Page, PageRequest, ValidationError};
use sqlx::SqlitePool;
use tracing::debug;

use super::{order_by_clause, SortColumns};
use crate::error::{DbError, DbResult};

const SELECT_COLUMNS: &str = "id, name, email, address, postal_code, created_at, updated_at";

const SORT_COLUMNS: SortColumns = &[
    ("id", "id"),
    ("name", "name"),
    ("email", "email"),
    ("address", "address"),
    ("postal_code", "postal_code"),
    ("cep", "postal_code"),
    ("created_at", "created_at"),
    ("updated_at", "updated_at"),
];

/// Repository for client database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ClientRepository::new(pool);
///
/// let page = repo.list_page(&PageRequest::new(2, Some("name"), Some("asc"))?).await?;
/// let client = repo.get_by_id(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Returns one page of clients.
    ///
    /// ## Errors
    /// `DbError::InvalidRequest` when the sort field is not a client column.
    pub async fn list_page(&self, request: &PageRequest) -> DbResult<Page<Client>> {
        let order_by = order_by_clause("clients", SORT_COLUMNS, "id", request)?;
        let sql = format!(
            "SELECT {} FROM clients {} LIMIT ?1 OFFSET ?2",
            SELECT_COLUMNS, order_by
        );

        debug!(
            page = request.page,
            sort_field = %request.sort_field,
            sort_dir = request.sort_dir.as_str(),
            "Listing clients"
        );

        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = self.count().await?;
        Ok(Page::new(clients, request, total))
    }

    /// Every client, sorted by name (for select boxes).
    pub async fn all(&self) -> DbResult<Vec<Client>> {
        let sql = format!(
            "SELECT {} FROM clients ORDER BY name COLLATE NOCASE, id",
            SELECT_COLUMNS
        );
        let clients = sqlx::query_as::<_, Client>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(clients)
    }

    /// Gets a client by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Client))` - Client found
    /// * `Ok(None)` - Client not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Client>> {
        let sql = format!("SELECT {} FROM clients WHERE id = ?1", SELECT_COLUMNS);
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    /// Inserts a new client.
    ///
    /// ## Returns
    /// * `Ok(Client)` - Inserted client with its generated id
    /// * `Err(DbError::Validation)` - Email already used
    pub async fn insert(&self, input: &ClientInput) -> DbResult<Client> {
        let now = Utc::now();
        let name = input.name.trim();
        let email = input.email.trim();
        let address = input.address.trim();
        let postal_code = input.postal_code.trim();

        debug!(email = %email, "Inserting client");

        let result = sqlx::query(
            r#"
            INSERT INTO clients (name, email, address, postal_code, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(address)
        .bind(postal_code)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| email_taken(e, email))?;

        Ok(Client {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
            address: address.to_string(),
            postal_code: postal_code.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrites an existing client.
    ///
    /// ## Returns
    /// * `Ok(Client)` - The client as stored after the update
    /// * `Err(DbError::NotFound)` - Client doesn't exist
    /// * `Err(DbError::Validation)` - Email used by another client
    pub async fn update(&self, id: i64, input: &ClientInput) -> DbResult<Client> {
        debug!(id = %id, "Updating client");

        let email = input.email.trim();

        let result = sqlx::query(
            r#"
            UPDATE clients SET
                name = ?2,
                email = ?3,
                address = ?4,
                postal_code = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(email)
        .bind(input.address.trim())
        .bind(input.postal_code.trim())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| email_taken(e, email))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Client", id))
    }

    /// Deletes a client.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no client with this id
    /// * `DbError::Conflict` - orders still reference the client
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting client");

        let result = sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => {
                    DbError::conflict("Client", id, "orders still reference this client")
                }
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        Ok(())
    }

    /// Counts all clients.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Turns a unique violation on `clients.email` into a field error.
fn email_taken(err: sqlx::Error, email: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } if field.ends_with("email") => {
            DbError::Validation(
                ValidationError::Duplicate {
                    field: "email".to_string(),
                    value: email.to_string(),
                }
                .into(),
            )
        }
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn input(name: &str, email: &str) -> ClientInput {
        ClientInput {
            name: name.to_string(),
            email: email.to_string(),
            address: "Rua das Flores, 12".to_string(),
            postal_code: "01310100".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = setup().await;
        let repo = db.clients();

        let created = repo.insert(&input("  Ana Souza ", "ana@example.com")).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.name, "Ana Souza");

        let loaded = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(loaded.email, "ana@example.com");
        assert_eq!(loaded.postal_code, "01310100");
        assert!(repo.get_by_id(9_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_field_error() {
        let db = setup().await;
        let repo = db.clients();
        repo.insert(&input("Ana", "ana@example.com")).await.unwrap();

        let err = repo
            .insert(&input("Other Ana", "ANA@example.com"))
            .await
            .unwrap_err();
        match err {
            DbError::Validation(errors) => assert!(errors.has_field("email")),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_rejects_email_of_another_client() {
        let db = setup().await;
        let repo = db.clients();
        repo.insert(&input("Ana", "ana@example.com")).await.unwrap();
        let bruno = repo.insert(&input("Bruno", "bruno@example.com")).await.unwrap();

        let err = repo
            .update(bruno.id, &input("Bruno", "ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let unchanged = repo.get_by_id(bruno.id).await.unwrap().unwrap();
        assert_eq!(unchanged.email, "bruno@example.com");

        // Keeping one's own email is fine
        let renamed = repo
            .update(bruno.id, &input("Bruno Lima", "bruno@example.com"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "Bruno Lima");
    }

    #[tokio::test]
    async fn test_update_missing_client() {
        let db = setup().await;
        let err = db
            .clients()
            .update(42, &input("Nobody", "nobody@example.com"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one_row() {
        let db = setup().await;
        let repo = db.clients();
        for i in 1..=8 {
            repo.insert(&input(&format!("Client {}", i), &format!("c{}@example.com", i)))
                .await
                .unwrap();
        }

        repo.delete(7).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 7);
        assert!(repo.get_by_id(7).await.unwrap().is_none());
        assert!(repo.get_by_id(6).await.unwrap().is_some());
        assert!(repo.get_by_id(8).await.unwrap().is_some());

        assert!(repo.delete(7).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_referenced_client_is_a_conflict() {
        let db = setup().await;
        let client = db.clients().insert(&input("Ana", "ana@example.com")).await.unwrap();
        sqlx::query(
            "INSERT INTO orders (client_id, total_price, delivery_days, created_at, updated_at) \
             VALUES (?1, 0, 1, ?2, ?2)",
        )
        .bind(client.id)
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let err = db.clients().delete(client.id).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
        assert!(db.clients().get_by_id(client.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_page_sorting_and_paging() {
        let db = setup().await;
        let repo = db.clients();
        for name in ["Carla", "Ana", "Eva", "Bruno", "Davi", "Fabio", "Gil"] {
            repo.insert(&input(name, &format!("{}@example.com", name.to_lowercase())))
                .await
                .unwrap();
        }

        let asc = repo
            .list_page(&PageRequest::new(1, Some("name"), Some("asc")).unwrap())
            .await
            .unwrap();
        let names: Vec<_> = asc.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bruno", "Carla", "Davi", "Eva"]);
        assert_eq!(asc.total_items, 7);
        assert_eq!(asc.total_pages, 2);

        let desc = repo
            .list_page(&PageRequest::new(1, Some("name"), Some("whatever")).unwrap())
            .await
            .unwrap();
        let names: Vec<_> = desc.items.iter().map(|c| c.name.clone()).collect();
        let mut sorted = names.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(names, sorted);
        assert_eq!(names[0], "Gil");

        let second = repo
            .list_page(&PageRequest::new(2, Some("name"), Some("asc")).unwrap())
            .await
            .unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[0].name, "Fabio");
    }

    #[tokio::test]
    async fn test_list_page_accepts_camel_case_and_rejects_unknown() {
        let db = setup().await;
        let repo = db.clients();

        let page = repo
            .list_page(&PageRequest::new(1, Some("postalCode"), Some("asc")).unwrap())
            .await
            .unwrap();
        assert_eq!(page.sort_field, "postalCode");

        let err = repo
            .list_page(&PageRequest::new(1, Some("password"), None).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_all_is_sorted_by_name() {
        let db = setup().await;
        let repo = db.clients();
        repo.insert(&input("bruno", "b@example.com")).await.unwrap();
        repo.insert(&input("Ana", "a@example.com")).await.unwrap();

        let names: Vec<_> = repo.all().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Ana", "bruno"]);
    }
}
