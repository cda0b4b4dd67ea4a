//! # Paging & Sorting
//!
//! Listing requests arrive as `?pageNum=2&sortField=name&sortDir=desc`.
//! This module turns those raw values into a checked [`PageRequest`] and
//! wraps the query result into a [`Page`] the templates can render.
//!
//! ```text
//! pageNum=2, size=5            ┌─────────────────────────────┐
//!   ──► offset = (2-1)*5 = 5   │ total_items = 12            │
//!   ──► limit  = 5             │ total_pages = ceil(12/5)= 3 │
//!                              └─────────────────────────────┘
//! ```
//!
//! Which sort fields exist is decided per entity by the repositories; this
//! module only carries the requested name.

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::{DEFAULT_PAGE_SIZE, DEFAULT_SORT_FIELD};

// =============================================================================
// Sort Direction
// =============================================================================

/// Direction of a listing sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `"asc"` (any case) is ascending; every other token is descending.
    pub fn from_token(token: &str) -> Self {
        if token.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// The opposite direction, used for the column header toggle links.
    pub const fn reverse(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub const fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Asc
    }
}

// =============================================================================
// Page Request
// =============================================================================

/// A validated request for one page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub size: u32,
    pub sort_field: String,
    pub sort_dir: SortDirection,
}

impl PageRequest {
    /// Builds a request from raw query values.
    ///
    /// A missing sort field falls back to [`DEFAULT_SORT_FIELD`], a missing
    /// direction to ascending.
    ///
    /// ## Errors
    /// [`CoreError::InvalidPage`] when `page_num` is below 1.
    ///
    /// ## Example
    /// ```rust
    /// use orderdesk_core::paging::{PageRequest, SortDirection};
    ///
    /// let req = PageRequest::new(2, Some("name"), Some("desc")).unwrap();
    /// assert_eq!(req.offset(), 5);
    /// assert_eq!(req.sort_dir, SortDirection::Desc);
    /// assert!(PageRequest::new(0, None, None).is_err());
    /// ```
    pub fn new(page_num: i64, sort_field: Option<&str>, sort_dir: Option<&str>) -> CoreResult<Self> {
        if page_num < 1 || page_num > i64::from(u32::MAX) {
            return Err(CoreError::InvalidPage(page_num));
        }

        let sort_field = sort_field
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_SORT_FIELD)
            .to_string();

        let sort_dir = sort_dir
            .map(SortDirection::from_token)
            .unwrap_or_default();

        Ok(PageRequest {
            page: page_num as u32,
            size: DEFAULT_PAGE_SIZE,
            sort_field,
            sort_dir,
        })
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size.max(1);
        self
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

// =============================================================================
// Page
// =============================================================================

/// One page of a listing plus what the pager and sort links need.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: i64,
    pub sort_field: String,
    pub sort_dir: SortDirection,
    pub reverse_sort_dir: SortDirection,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_items: i64) -> Self {
        let size = i64::from(request.size.max(1));
        let total_pages = if total_items <= 0 {
            0
        } else {
            (total_items + size - 1) / size
        };

        Page {
            items,
            current_page: request.page,
            page_size: request.size,
            total_items: total_items.max(0),
            total_pages,
            sort_field: request.sort_field.clone(),
            sort_dir: request.sort_dir,
            reverse_sort_dir: request.sort_dir.reverse(),
        }
    }

    /// Converts the items while keeping the paging metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            sort_field: self.sort_field,
            sort_dir: self.sort_dir,
            reverse_sort_dir: self.reverse_sort_dir,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        i64::from(self.current_page) < self.total_pages
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_direction_tokens() {
        assert_eq!(SortDirection::from_token("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::from_token("ASC"), SortDirection::Asc);
        assert_eq!(SortDirection::from_token("desc"), SortDirection::Desc);
        // Anything that is not "asc" sorts descending
        assert_eq!(SortDirection::from_token("sideways"), SortDirection::Desc);
        assert_eq!(SortDirection::Asc.reverse(), SortDirection::Desc);
    }

    #[test]
    fn test_page_request_defaults() {
        let req = PageRequest::new(1, None, None).unwrap();
        assert_eq!(req.sort_field, "id");
        assert_eq!(req.sort_dir, SortDirection::Asc);
        assert_eq!(req.size, 5);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_page_request_rejects_page_below_one() {
        assert!(matches!(
            PageRequest::new(0, None, None),
            Err(CoreError::InvalidPage(0))
        ));
        assert!(PageRequest::new(-3, Some("name"), Some("asc")).is_err());
    }

    #[test]
    fn test_page_request_offset() {
        let req = PageRequest::new(3, Some("name"), Some("desc")).unwrap();
        assert_eq!(req.offset(), 10);
        assert_eq!(req.limit(), 5);

        let req = req.with_size(20);
        assert_eq!(req.offset(), 40);
    }

    #[test]
    fn test_page_total_pages() {
        let req = PageRequest::new(1, None, None).unwrap();
        assert_eq!(Page::<i32>::new(vec![], &req, 0).total_pages, 0);
        assert_eq!(Page::<i32>::new(vec![], &req, 5).total_pages, 1);
        assert_eq!(Page::<i32>::new(vec![], &req, 6).total_pages, 2);
        assert_eq!(Page::<i32>::new(vec![], &req, 12).total_pages, 3);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let req = PageRequest::new(9, None, None).unwrap();
        let page: Page<i32> = Page::new(vec![], &req, 7);
        assert!(page.items.is_empty());
        assert_eq!(page.current_page, 9);
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_page_map_keeps_metadata() {
        let req = PageRequest::new(1, Some("name"), Some("desc")).unwrap();
        let page = Page::new(vec![1, 2, 3], &req, 3).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20, 30]);
        assert_eq!(page.sort_field, "name");
        assert_eq!(page.reverse_sort_dir, SortDirection::Asc);
    }

    #[test]
    fn test_page_serializes_for_templates() {
        let req = PageRequest::new(2, Some("price"), Some("desc")).unwrap();
        let page = Page::new(vec!["a"], &req, 6);
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["current_page"], 2);
        assert_eq!(json["total_pages"], 2);
        assert_eq!(json["sort_dir"], "desc");
        assert_eq!(json["reverse_sort_dir"], "asc");
    }
}
