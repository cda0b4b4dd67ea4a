//! Product pages.

use axum::extract::{Path, Query, State};
use axum::response::{Html, Response};
use axum::Form;
use orderdesk_core::validation::validate_product;
use orderdesk_core::ValidationErrors;
use tracing::{debug, info};

use super::{parse_id, parse_page_number, redirect_to_listing, unprocessable, ListQuery};
use crate::error::{WebError, WebResult};
use crate::forms::ProductForm;
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
    let page = state.db.products().list_page(&request).await?;
    Ok(Html(views::render_products(page, query.flash())?))
}

pub async fn new_form() -> WebResult<Html<String>> {
    Ok(Html(views::render_product_form(
        &ProductForm::default(),
        &ValidationErrors::new(),
    )?))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let id = parse_id(&id)?;
    let product = state
        .db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| WebError::not_found("Product", id))?;

    Ok(Html(views::render_product_form(
        &ProductForm::from_product(&product),
        &ValidationErrors::new(),
    )?))
}

/// Saves a product. Orders holding it keep their totals until they are
/// saved again.
pub async fn save(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> WebResult<Response> {
    let id = form.record_id()?;
    let (input, mut errors) = form.to_input();

    if let Err(rule_errors) = validate_product(&input) {
        errors.extend_unseen(rule_errors);
    }

    if !errors.is_empty() {
        if let Some(id) = id {
            state
                .db
                .products()
                .get_by_id(id)
                .await?
                .ok_or_else(|| WebError::not_found("Product", id))?;
        }
        debug!(id = ?id, errors = %errors, "Product form rejected");
        return Ok(unprocessable(views::render_product_form(&form, &errors)?));
    }

    let repo = state.db.products();
    let product = match id {
        None => repo.insert(&input).await?,
        Some(id) => repo.update(id, &input).await?,
    };

    info!(id = %product.id, price = %product.price, "Product saved");
    Ok(redirect_to_listing("products", Flash::Saved))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> WebResult<Response> {
    let id = parse_id(&id)?;
    state.db.products().delete(id).await?;
    info!(id = %id, "Product deleted");
    Ok(redirect_to_listing("products", Flash::Deleted))
}
