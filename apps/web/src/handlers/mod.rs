//! # Request Handlers
//!
//! One module per entity, each with the same six routes:
//!
//! ```text
//! GET  /{entity}                      page 1, or the sort in the query
//! GET  /{entity}_page/{pageNum}       ?sortField=name&sortDir=desc
//! GET  /{entity}/new                  empty form
//! GET  /{entity}/edit/{id}            prefilled form (404 if missing)
//! GET  /{entity}/delete/{id}          delete, then 303 to the listing
//! POST /{entity}/save                 create or update, 303 or 422
//! ```
//!
//! Path segments are taken as strings and parsed here so a malformed
//! number renders the regular error page with status 400.

pub mod clients;
pub mod index;
pub mod orders;
pub mod products;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::error::{WebError, WebResult};
use crate::views::Flash;

/// Query string of the listing routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "sortField")]
    pub sort_field: Option<String>,

    #[serde(rename = "sortDir")]
    pub sort_dir: Option<String>,

    pub flash: Option<String>,
}

impl ListQuery {
    pub fn flash(&self) -> Option<Flash> {
        Flash::from_query(self.flash.as_deref())
    }
}

/// Parses the `{id}` path segment.
pub fn parse_id(raw: &str) -> WebResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| WebError::bad_request(format!("Invalid id '{}'", raw)))
}

/// Parses the `{pageNum}` path segment. Range checks happen in
/// `PageRequest::new`.
pub fn parse_page_number(raw: &str) -> WebResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| WebError::bad_request(format!("Invalid page number '{}'", raw)))
}

/// `303 See Other` back to a listing with a flash message.
pub fn redirect_to_listing(entity: &str, flash: Flash) -> Response {
    Redirect::to(&format!("/{}?flash={}", entity, flash.as_query())).into_response()
}

/// A form redisplayed with its validation messages.
pub fn unprocessable(body: String) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("7").unwrap(), 7);
        assert_eq!(parse_id("x").unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_page_number_leaves_range_to_paging() {
        assert_eq!(parse_page_number("0").unwrap(), 0);
        assert!(parse_page_number("two").is_err());
    }

    #[test]
    fn test_redirect_is_see_other() {
        let response = redirect_to_listing("clients", Flash::Saved);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/clients?flash=saved"
        );
    }
}
