//! # orderdesk-core: Pure Business Logic for OrderDesk
//!
//! Entities, value types and the order pricing rules, as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OrderDesk Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser (HTML forms)                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/web (axum handlers)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ orderdesk-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Client   │  │   Money   │  │  totals   │  │  fields   │  │   │
//! │  │   │  Order    │  │  Weight   │  │  plans    │  │  forms    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 orderdesk-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity records (Client, Product, Order, OrderItem)
//! - [`money`] - Money (cents) and Weight (grams) with integer arithmetic
//! - [`pricing`] - Order totals and item reconciliation plans
//! - [`paging`] - Page requests, sort direction, page metadata
//! - [`validation`] - Field rules checked at the boundary
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use orderdesk_core::money::Money;
//! use orderdesk_core::pricing::{order_total, PricedLine};
//!
//! let lines = [
//!     PricedLine::new(Some(Money::from_cents(1000)), 2),
//!     PricedLine::new(Some(Money::from_cents(550)), 1),
//!     PricedLine::new(None, 4),
//! ];
//!
//! assert_eq!(order_total(&lines).cents(), 2550);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod paging;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError, ValidationErrors};
pub use money::{Money, Weight};
pub use paging::{Page, PageRequest, SortDirection};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of records on one listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// Sort field used when a listing request names none.
pub const DEFAULT_SORT_FIELD: &str = "id";

/// Field limits shared by validation and the database schema.
pub mod limits {
    pub const CLIENT_NAME_MAX: usize = 60;
    pub const CLIENT_ADDRESS_MAX: usize = 255;
    pub const CLIENT_POSTAL_CODE_MAX: usize = 8;
    pub const CLIENT_EMAIL_MAX: usize = 254;
    pub const PRODUCT_NAME_MAX: usize = 40;
    pub const PRODUCT_DESCRIPTION_MAX: usize = 120;

    /// Seven digits, two of them decimal: at most 99999.99.
    pub const PRODUCT_PRICE_MAX_CENTS: i64 = 9_999_999;

    /// Seven digits, three of them decimal: at most 9999.999 kg.
    pub const PRODUCT_WEIGHT_MAX_GRAMS: i64 = 9_999_999;

    pub const ITEM_QUANTITY_MAX: i64 = 9_999;
}
