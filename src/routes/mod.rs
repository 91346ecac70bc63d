//! HTTP surface: one calculator page plus the command endpoints behind it.

use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::session::SessionStats;
use crate::AppState;

pub mod batch;
pub mod calculator;
pub mod quote;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(calculator::page))
        .route("/calc", post(calculator::quick_calc))
        .route("/catalog/rates", post(calculator::update_rate))
        .route("/batch/items", post(batch::add_item))
        .route("/batch/clear", post(batch::clear))
        .route("/batch/export.csv", get(batch::export))
        .route("/quote", post(quote::generate))
        .route("/quote/export.csv", get(quote::export))
        .route("/healthz", get(healthz))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    sessions: SessionStats,
}

/// GET /healthz - health check plus session-store statistics
async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.sessions.stats(),
    })
}

/// Wrap CSV bytes in a download response with an attachment filename.
pub(crate) fn csv_download(bytes: Vec<u8>, filename: &str) -> Result<Response> {
    let disposition = format!("attachment; filename=\"{filename}\"");
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|_| AppError::Internal(format!("invalid export filename: {filename}")))?;

    let mut response = bytes.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    response
        .headers_mut()
        .insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}
