//! # Application State
//!
//! Shared by every request handler through axum's `State` extractor.
//!
//! ## Thread Safety
//! The `Database` from `orderdesk-db` wraps a `SqlitePool`, which is
//! cheap to clone and safe to share. Handlers run queries concurrently
//! without explicit locking; order saves serialize inside their own
//! transaction.
//!
//! ## Usage in Handlers
//! ```rust,ignore
//! async fn clients_page(State(state): State<AppState>) -> WebResult<Html<String>> {
//!     let request = state.page_request(1, None, None)?;
//!     let page = state.db.clients().list_page(&request).await?;
//!     ...
//! }
//! ```

use orderdesk_core::{CoreResult, PageRequest, DEFAULT_PAGE_SIZE};
use orderdesk_db::Database;

#[derive(Debug, Clone)]
pub struct AppState {
    /// Database handle (pooled).
    pub db: Database,

    /// Records shown per listing page.
    pub page_size: u32,
}

impl AppState {
    pub fn new(db: Database, page_size: u32) -> Self {
        AppState { db, page_size }
    }

    /// State with the default page size.
    pub fn with_defaults(db: Database) -> Self {
        AppState::new(db, DEFAULT_PAGE_SIZE)
    }

    /// Builds a listing request sized for this server.
    pub fn page_request(
        &self,
        page_num: i64,
        sort_field: Option<&str>,
        sort_dir: Option<&str>,
    ) -> CoreResult<PageRequest> {
        Ok(PageRequest::new(page_num, sort_field, sort_dir)?.with_size(self.page_size))
    }
}
