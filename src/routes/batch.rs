//! Batch ledger handlers: append, clear, export.

use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::error::Result;
use crate::pricing::requests::ItemWeightForm;
use crate::pricing::LineItem;
use crate::session;
use crate::AppState;

use super::calculator::{render_page, Flash};
use super::csv_download;

/// POST /batch/items - price one line against the current catalog and
/// append it. The rate snapshot taken here is what the ledger keeps.
pub async fn add_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ItemWeightForm>,
) -> Result<Response> {
    let (shared, cookie) = state.sessions.acquire(&headers).await;
    let mut guard = session::lock(&shared)?;

    let flash = match form.validate(state.config.mode) {
        Ok(input) => {
            let rate = guard.catalog.get(&input.vegetable);
            let item = LineItem::priced(&input.vegetable, input.weight_kg, input.distance_km, rate);
            tracing::debug!("Batch append: {} for {}", item.item_name, item.amount);
            guard.batch.append(item);
            Flash::none()
        }
        Err(message) => Flash::error(message),
    };

    let html = render_page(&state.config, &guard, flash)?;
    Ok(session::apply_cookie(html.into_response(), cookie))
}

/// POST /batch/clear - empty the batch
pub async fn clear(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let (shared, cookie) = state.sessions.acquire(&headers).await;
    let mut guard = session::lock(&shared)?;

    guard.batch.clear();

    let html = render_page(&state.config, &guard, Flash::none())?;
    Ok(session::apply_cookie(html.into_response(), cookie))
}

/// GET /batch/export.csv - download the batch ledger
pub async fn export(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let (shared, cookie) = state.sessions.acquire(&headers).await;
    let guard = session::lock(&shared)?;

    let bytes = guard.batch.export_csv(state.config.mode)?;
    drop(guard);

    let filename = format!("batch_{}.csv", Utc::now().date_naive().format("%Y-%m-%d"));
    Ok(session::apply_cookie(csv_download(bytes, &filename)?, cookie))
}
