//! # Repository Module
//!
//! One repository per entity, each holding a clone of the pool.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.clients().list_page(&request)                              │
//! │       ▼                                                                 │
//! │  ClientRepository                                                      │
//! │  ├── list_page(&self, request)   → Page<Client>                        │
//! │  ├── get_by_id(&self, id)        → Option<Client>                      │
//! │  ├── insert / update             → Client                              │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sorting
//! Listings are sorted by a user supplied field name. The name never reaches
//! SQL as-is: it is looked up in the entity's column table below and only the
//! matching constant column expression is interpolated.
//!
//! ## Available Repositories
//!
//! - [`ClientRepository`](client::ClientRepository) - Client CRUD
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD
//! - [`OrderRepository`](order::OrderRepository) - Orders and their items

pub mod client;
pub mod order;
pub mod product;

use orderdesk_core::{CoreError, PageRequest};

use crate::error::DbResult;

/// Maps accepted sort field names to SQL column expressions.
pub(crate) type SortColumns = &'static [(&'static str, &'static str)];

/// Converts `camelCase` to `snake_case`; snake_case passes through.
pub(crate) fn to_snake_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for (i, c) in field.trim().chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Looks up the column expression for a requested sort field.
pub(crate) fn sort_column(
    entity: &str,
    columns: SortColumns,
    field: &str,
) -> DbResult<&'static str> {
    let wanted = to_snake_case(field);
    columns
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, column)| *column)
        .ok_or_else(|| {
            CoreError::UnknownSortField {
                entity: entity.to_string(),
                field: field.to_string(),
            }
            .into()
        })
}

/// Builds the `ORDER BY` clause of a listing.
///
/// Ties are broken by `id_column` ascending so a row never shows up on two
/// pages.
pub(crate) fn order_by_clause(
    entity: &str,
    columns: SortColumns,
    id_column: &str,
    request: &PageRequest,
) -> DbResult<String> {
    let column = sort_column(entity, columns, &request.sort_field)?;
    let dir = request.sort_dir.as_sql();

    if column == id_column {
        Ok(format!("ORDER BY {} {}", column, dir))
    } else {
        Ok(format!("ORDER BY {} {}, {} ASC", column, dir, id_column))
    }
}
