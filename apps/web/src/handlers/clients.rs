//! Client pages.

use axum::extract::{Path, Query, State};
use axum::response::{Html, Response};
use axum::Form;
use orderdesk_core::validation::validate_client;
use orderdesk_core::ValidationErrors;
use orderdesk_db::DbError;
use tracing::{debug, info};

use super::{parse_id, parse_page_number, redirect_to_listing, unprocessable, ListQuery};
use crate::error::{WebError, WebResult};
use crate::forms::ClientForm;
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
    let page = state.db.clients().list_page(&request).await?;
    Ok(Html(views::render_clients(page, query.flash())?))
}

pub async fn new_form() -> WebResult<Html<String>> {
    Ok(Html(views::render_client_form(
        &ClientForm::default(),
        &ValidationErrors::new(),
    )?))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let id = parse_id(&id)?;
    let client = state
        .db
        .clients()
        .get_by_id(id)
        .await?
        .ok_or_else(|| WebError::not_found("Client", id))?;

    Ok(Html(views::render_client_form(
        &ClientForm::from_client(&client),
        &ValidationErrors::new(),
    )?))
}

pub async fn save(State(state): State<AppState>, Form(form): Form<ClientForm>) -> WebResult<Response> {
    let id = form.record_id()?;
    let input = form.to_input();

    if let Err(errors) = validate_client(&input) {
        if let Some(id) = id {
            state
                .db
                .clients()
                .get_by_id(id)
                .await?
                .ok_or_else(|| WebError::not_found("Client", id))?;
        }
        debug!(id = ?id, errors = %errors, "Client form rejected");
        return Ok(unprocessable(views::render_client_form(&form, &errors)?));
    }

    let repo = state.db.clients();
    let saved = match id {
        None => repo.insert(&input).await,
        Some(id) => repo.update(id, &input).await,
    };

    match saved {
        Ok(client) => {
            info!(id = %client.id, "Client saved");
            Ok(redirect_to_listing("clients", Flash::Saved))
        }
        Err(DbError::Validation(errors)) => {
            debug!(id = ?id, errors = %errors, "Client form rejected by database");
            Ok(unprocessable(views::render_client_form(&form, &errors)?))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> WebResult<Response> {
    let id = parse_id(&id)?;
    state.db.clients().delete(id).await?;
    info!(id = %id, "Client deleted");
    Ok(redirect_to_listing("clients", Flash::Deleted))
}
