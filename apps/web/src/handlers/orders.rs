//! Order pages.
//!
//! The order form carries a variable number of `items[N]` rows, so the
//! save handler reads the body as raw pairs and lets
//! [`OrderForm::from_pairs`] group them.

use axum::extract::{Path, Query, State};
use axum::response::{Html, Response};
use axum::Form;
use orderdesk_core::validation::validate_order;
use orderdesk_core::{Money, ValidationErrors};
use orderdesk_db::DbError;
use tracing::debug;

use super::{parse_id, parse_page_number, redirect_to_listing, unprocessable, ListQuery};
use crate::error::{WebError, WebResult};
use crate::forms::{OrderForm, BLANK_LINES};
use crate::state::AppState;
use crate::views::{self, Flash};

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> WebResult<Html<String>> {
    render_page(&state, 1, &query).await
}

pub async fn page(
    State(state): State<AppState>,
    Path(page_num): Path<String>,
    Query(query): Query<ListQuery>,
) -> WebResult<Html<String>> {
    let page_num = parse_page_number(&page_num)?;
    render_page(&state, page_num, &query).await
}

async fn render_page(state: &AppState, page_num: i64, query: &ListQuery) -> WebResult<Html<String>> {
    let request = state.page_request(
        page_num,
        query.sort_field.as_deref(),
        query.sort_dir.as_deref(),
    )?;
    let page = state.db.orders().list_page(&request).await?;
    Ok(Html(views::render_orders(page, query.flash())?))
}

/// Renders the order form with the client and product select boxes.
async fn render_form(
    state: &AppState,
    form: &OrderForm,
    errors: &ValidationErrors,
    total: Option<Money>,
) -> WebResult<String> {
    let clients = state.db.clients().all().await?;
    let products = state.db.products().all().await?;
    Ok(views::render_order_form(form, errors, &clients, &products, total)?)
}

pub async fn new_form(State(state): State<AppState>) -> WebResult<Html<String>> {
    let body = render_form(&state, &OrderForm::blank(), &ValidationErrors::new(), None).await?;
    Ok(Html(body))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let id = parse_id(&id)?;
    let order = state
        .db
        .orders()
        .get_by_id(id)
        .await?
        .ok_or_else(|| WebError::not_found("Order", id))?;

    let body = render_form(
        &state,
        &OrderForm::from_order(&order),
        &ValidationErrors::new(),
        Some(order.total_price),
    )
    .await?;
    Ok(Html(body))
}

/// Creates or edits an order. The total is computed on save; a submitted
/// `total_price` is ignored.
pub async fn save(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    let form = OrderForm::from_pairs(pairs);
    let id = form.record_id()?;
    let (input, mut errors) = form.to_input();

    if let Err(rule_errors) = validate_order(&input) {
        errors.extend_unseen(rule_errors);
    }

    if !errors.is_empty() {
        debug!(id = ?id, errors = %errors, "Order form rejected");
        return reject(&state, form, id, &errors).await;
    }

    match state.db.orders().save(id, &input).await {
        Ok(order) => {
            debug!(id = %order.id, items = order.items.len(), "Order form accepted");
            Ok(redirect_to_listing("orders", Flash::Saved))
        }
        Err(DbError::Validation(errors)) => {
            debug!(id = ?id, errors = %errors, "Order form rejected by database");
            reject(&state, form, id, &errors).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Redisplays a rejected order form with status 422, or answers 404 when
/// the edited order is gone.
async fn reject(
    state: &AppState,
    form: OrderForm,
    id: Option<i64>,
    errors: &ValidationErrors,
) -> WebResult<Response> {
    let total = match id {
        Some(id) => {
            let order = state
                .db
                .orders()
                .get_by_id(id)
                .await?
                .ok_or_else(|| WebError::not_found("Order", id))?;
            Some(order.total_price)
        }
        None => None,
    };

    let form = form.with_blank_lines(BLANK_LINES);
    let body = render_form(state, &form, errors, total).await?;
    Ok(unprocessable(body))
}

/// Deletes an order together with its items.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> WebResult<Response> {
    let id = parse_id(&id)?;
    state.db.orders().delete(id).await?;
    debug!(id = %id, "Redirecting after order delete");
    Ok(redirect_to_listing("orders", Flash::Deleted))
}
