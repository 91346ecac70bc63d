//! Quote handlers: generate and export.

use std::collections::HashMap;

use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use crate::error::{AppError, Result};
use crate::pricing::quote::QuoteMode;
use crate::pricing::requests::QuoteForm;
use crate::pricing::{build_averaged, build_itemized};
use crate::session;
use crate::AppState;

use super::calculator::{render_page, Flash};
use super::csv_download;

/// POST /quote - build a quote from the posted selection.
///
/// An empty selection is a no-op: the page re-renders without a new quote
/// and without an error.
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response> {
    let (shared, cookie) = state.sessions.acquire(&headers).await;
    let mut guard = session::lock(&shared)?;

    let flash = match QuoteForm::from_fields(&fields, state.config.mode) {
        Ok(form) if form.is_empty_selection() => Flash::none(),
        Ok(form) => {
            let quote = match form.mode {
                QuoteMode::Itemized => build_itemized(
                    &guard.catalog,
                    &form.line_weights,
                    form.distance_km,
                    form.tax_percent,
                    form.transport,
                    &form.customer,
                    None,
                ),
                QuoteMode::Averaged => build_averaged(
                    &guard.catalog,
                    &form.selected,
                    form.total_weight_kg.unwrap_or_default(),
                    form.distance_km,
                    form.tax_percent,
                    form.transport,
                    &form.customer,
                    None,
                ),
            };
            if let Some(quote) = quote {
                tracing::info!(
                    "Quote built for {} ({}): grand total {}",
                    quote.customer,
                    quote.mode.label(),
                    quote.grand_total
                );
                guard.last_quote = Some(quote);
            }
            Flash::none()
        }
        Err(message) => Flash::error(message),
    };

    let html = render_page(&state.config, &guard, flash)?;
    Ok(session::apply_cookie(html.into_response(), cookie))
}

/// GET /quote/export.csv - download the last built quote
pub async fn export(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let (shared, cookie) = state.sessions.acquire(&headers).await;
    let guard = session::lock(&shared)?;

    let quote = guard.last_quote.as_ref().ok_or(AppError::NotFound)?;
    let bytes = quote.export_csv(state.config.mode)?;
    let filename = quote.filename();
    drop(guard);

    Ok(session::apply_cookie(csv_download(bytes, &filename)?, cookie))
}
