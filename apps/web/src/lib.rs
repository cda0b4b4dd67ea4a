//! # OrderDesk Web
//!
//! Server-rendered pages for managing clients, products and orders.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OrderDesk Web Server                             │
//! │                                                                         │
//! │  Browser ──► TraceLayer ──► Router ──► handlers::{clients,products,    │
//! │                                │                  orders,index}         │
//! │                                │            │              │            │
//! │                                │            ▼              ▼            │
//! │                                │     forms (decode)   views (tera)      │
//! │                                │            │                           │
//! │                                ▼            ▼                           │
//! │                           AppState ──► orderdesk-db ──► SQLite          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The binary in `main.rs` loads [`config::AppConfig`], opens the database
//! and serves [`build_router`]. Tests build the same router on an
//! in-memory database.

pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod state;
pub mod views;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub use config::AppConfig;
pub use error::{WebError, WebResult};
pub use state::AppState;

use handlers::{clients, index, orders, products};

/// Builds the application router.
///
/// ## Routes
/// - `/`, `/health`
/// - `/clients`, `/clients_page/{page_num}`, `/clients/new`,
///   `/clients/edit/{id}`, `/clients/delete/{id}`, `POST /clients/save`
/// - the same for `/products` and `/orders`
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index::index))
        .route("/health", get(index::health))
        // Clients
        .route("/clients", get(clients::list))
        .route("/clients_page/{page_num}", get(clients::page))
        .route("/clients/new", get(clients::new_form))
        .route("/clients/edit/{id}", get(clients::edit_form))
        .route("/clients/delete/{id}", get(clients::delete))
        .route("/clients/save", post(clients::save))
        // Products
        .route("/products", get(products::list))
        .route("/products_page/{page_num}", get(products::page))
        .route("/products/new", get(products::new_form))
        .route("/products/edit/{id}", get(products::edit_form))
        .route("/products/delete/{id}", get(products::delete))
        .route("/products/save", post(products::save))
        // Orders
        .route("/orders", get(orders::list))
        .route("/orders_page/{page_num}", get(orders::page))
        .route("/orders/new", get(orders::new_form))
        .route("/orders/edit/{id}", get(orders::edit_form))
        .route("/orders/delete/{id}", get(orders::delete))
        .route("/orders/save", post(orders::save))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=orderdesk=trace` - Show trace for orderdesk crates only
/// - Default: `info,orderdesk=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,orderdesk=debug,sqlx=warn,tower_http=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
