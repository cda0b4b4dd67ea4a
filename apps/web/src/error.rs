//! # Web Error Type
//!
//! Unified error type for request handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in OrderDesk                              │
//! │                                                                         │
//! │  Handler                                                                │
//! │  Result<T, WebError>                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Bad path / page / sort? ── CoreError ──────────┐                      │
//! │         │                                        │                      │
//! │         ▼                                        ▼                      │
//! │  Database Error? ─── DbError::NotFound ──── WebError ──► error.html    │
//! │         │                                   (status + message)          │
//! │         ▼                                                               │
//! │  Success ──────────────────────────────────────────────► page.html     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Form validation failures do not travel through this type: the handlers
//! redisplay the form with its messages instead.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use orderdesk_core::CoreError;
use orderdesk_db::DbError;
use tracing::error;

use crate::views::{self, ViewError};

/// Error returned from request handlers.
///
/// Rendered as the error page with a status matching [`ErrorCode`].
#[derive(Debug, Clone)]
pub struct WebError {
    /// Machine-readable error code, decides the HTTP status
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for handler failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed id, page number or sort field (400)
    BadRequest,

    /// Resource not found (404)
    NotFound,

    /// Row still referenced by other rows (409)
    Conflict,

    /// Input validation failed (422)
    ValidationError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl WebError {
    /// Creates a new web error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        WebError {
            code,
            message: message.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        WebError::new(ErrorCode::BadRequest, message)
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        WebError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        WebError::new(ErrorCode::Internal, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for WebError {}

/// Converts database errors to web errors.
impl From<DbError> for WebError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound { .. } => WebError::new(ErrorCode::NotFound, err.to_string()),
            DbError::Conflict { .. } => WebError::new(ErrorCode::Conflict, err.to_string()),
            DbError::Validation(_) | DbError::UniqueViolation { .. } => {
                WebError::new(ErrorCode::ValidationError, err.to_string())
            }
            DbError::InvalidRequest(message) => WebError::bad_request(message.clone()),
            _ => WebError::internal(err.to_string()),
        }
    }
}

/// Converts core errors to web errors.
impl From<CoreError> for WebError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::InvalidPage(_) | CoreError::UnknownSortField { .. } => {
                WebError::bad_request(err.to_string())
            }
            CoreError::Validation(_) => WebError::new(ErrorCode::ValidationError, err.to_string()),
        }
    }
}

impl From<ViewError> for WebError {
    fn from(err: ViewError) -> Self {
        WebError::internal(err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details go to the log, not to the browser
        let message = if self.code == ErrorCode::Internal {
            error!(error = %self.message, "Request failed");
            "Something went wrong while handling this request.".to_string()
        } else {
            self.message
        };

        match views::render_error(status, &message) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(render_err) => {
                error!(error = %render_err, "Failed to render error page");
                (status, message).into_response()
            }
        }
    }
}

/// Convenience type alias for handler results.
pub type WebResult<T> = Result<T, WebError>;
