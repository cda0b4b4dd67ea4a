//! Landing page and health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use tracing::warn;

use crate::error::WebResult;
use crate::state::AppState;
use crate::views::{self, Counts};

pub async fn index(State(state): State<AppState>) -> WebResult<Html<String>> {
    let counts = Counts {
        clients: state.db.clients().count().await?,
        products: state.db.products().count().await?,
        orders: state.db.orders().count().await?,
    };
    Ok(Html(views::render_index(counts)?))
}

/// `OK` while the database answers and its schema is up to date.
pub async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        warn!("Health check failed: database unavailable or not migrated");
        (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
    }
}
