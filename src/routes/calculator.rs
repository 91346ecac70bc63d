//! Calculator page handlers: page render, quick calc, rate updates.

use askama::Template;
use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};

use crate::config::AppConfig;
use crate::error::Result;
use crate::pricing::calculators::{
    distance_weight_charge, format_money, format_unit_rate, weight_charge,
};
use crate::pricing::requests::{ItemWeightForm, RateUpdateForm};
use crate::pricing::{LineItem, Quote, QuoteMode, TransportMode};
use crate::session::{self, SessionState};
use crate::AppState;

/// Calculator page template
#[derive(Template)]
#[template(path = "calculator/page.html")]
struct CalculatorTemplate {
    distance_mode: bool,
    has_error: bool,
    error: String,
    has_notice: bool,
    notice: String,
    veg_names: Vec<String>,
    rate_rows: Vec<RateRow>,
    default_rate: String,
    has_result: bool,
    result: CalcResultView,
    has_batch: bool,
    batch_rows: Vec<LineRow>,
    batch_total: String,
    transports: Vec<TransportOption>,
    default_tax: String,
    has_quote: bool,
    quote: QuoteView,
}

#[derive(Default)]
pub(super) struct RateRow {
    pub name: String,
    pub rate: String,
}

#[derive(Default)]
pub(super) struct LineRow {
    pub name: String,
    pub weight: String,
    pub km: String,
    pub rate: String,
    pub amount: String,
}

pub(super) struct TransportOption {
    pub key: &'static str,
    pub label: &'static str,
}

/// Quick-calc metrics shown after POST /calc
#[derive(Default)]
pub(super) struct CalcResultView {
    pub vegetable: String,
    pub rate: String,
    pub charge: String,
}

/// Rendered quote, all fields preformatted
#[derive(Default)]
pub(super) struct QuoteView {
    pub customer: String,
    pub date: String,
    pub mode_label: String,
    pub is_averaged: bool,
    pub selection: Vec<RateRow>,
    pub rows: Vec<LineRow>,
    pub total_weight: String,
    pub has_km: bool,
    pub km: String,
    pub has_avg: bool,
    pub avg_rate: String,
    pub items_total: String,
    pub has_transport: bool,
    pub transport_label: String,
    pub transport_charge: String,
    pub gst_label: String,
    pub tax_amount: String,
    pub grand_total: String,
}

impl QuoteView {
    pub(super) fn from_quote(quote: &Quote) -> Self {
        Self {
            customer: quote.customer.clone(),
            date: quote.date.format("%Y-%m-%d").to_string(),
            mode_label: quote.mode.label().to_string(),
            is_averaged: quote.mode == QuoteMode::Averaged,
            selection: quote
                .selection
                .iter()
                .map(|e| RateRow {
                    name: e.name.clone(),
                    rate: format_unit_rate(e.rate),
                })
                .collect(),
            rows: quote.lines.iter().map(line_row).collect(),
            total_weight: format_money(quote.total_weight_kg),
            has_km: quote.distance_km.is_some(),
            km: quote.distance_km.map(format_money).unwrap_or_default(),
            has_avg: quote.average_rate.is_some(),
            avg_rate: quote.average_rate.map(format_unit_rate).unwrap_or_default(),
            items_total: format_money(quote.items_subtotal),
            has_transport: quote.transport_charge > rust_decimal::Decimal::ZERO,
            transport_label: quote
                .transport
                .map(|t| t.label().to_string())
                .unwrap_or_default(),
            transport_charge: format_money(quote.transport_charge),
            gst_label: format!("GST @{}%", quote.tax_percent.normalize()),
            tax_amount: format_money(quote.tax_amount),
            grand_total: format_money(quote.grand_total),
        }
    }
}

pub(super) fn line_row(item: &LineItem) -> LineRow {
    LineRow {
        name: item.item_name.clone(),
        weight: format_money(item.weight_kg),
        km: item.distance_km.map(format_money).unwrap_or_default(),
        rate: format_unit_rate(item.unit_rate),
        amount: format_money(item.amount),
    }
}

/// One-shot page state carried into a render: validation feedback and the
/// quick-calc result, none of which survive the response.
#[derive(Default)]
pub(super) struct Flash {
    pub error: Option<String>,
    pub notice: Option<String>,
    pub result: Option<CalcResultView>,
}

impl Flash {
    pub(super) fn none() -> Self {
        Self::default()
    }

    pub(super) fn error(message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::default()
        }
    }

    pub(super) fn notice(message: String) -> Self {
        Self {
            notice: Some(message),
            ..Self::default()
        }
    }

    pub(super) fn result(result: CalcResultView) -> Self {
        Self {
            result: Some(result),
            ..Self::default()
        }
    }
}

/// Render the calculator page from the current session state.
pub(super) fn render_page(
    config: &AppConfig,
    state: &SessionState,
    flash: Flash,
) -> Result<Html<String>> {
    let veg_names: Vec<String> = state
        .catalog
        .entries()
        .iter()
        .map(|e| e.name.clone())
        .collect();
    let rate_rows: Vec<RateRow> = state
        .catalog
        .sorted_by_rate_desc()
        .iter()
        .map(|e| RateRow {
            name: e.name.clone(),
            rate: format_unit_rate(e.rate),
        })
        .collect();

    let transports = if config.mode.is_distance() {
        Vec::new()
    } else {
        TransportMode::all()
            .iter()
            .map(|t| TransportOption {
                key: t.key(),
                label: t.label(),
            })
            .collect()
    };

    let template = CalculatorTemplate {
        distance_mode: config.mode.is_distance(),
        has_error: flash.error.is_some(),
        error: flash.error.unwrap_or_default(),
        has_notice: flash.notice.is_some(),
        notice: flash.notice.unwrap_or_default(),
        veg_names,
        rate_rows,
        default_rate: format_unit_rate(state.catalog.default_rate()),
        has_result: flash.result.is_some(),
        result: flash.result.unwrap_or_default(),
        has_batch: !state.batch.is_empty(),
        batch_rows: state.batch.items().iter().map(line_row).collect(),
        batch_total: format_money(state.batch.total()),
        transports,
        default_tax: config.default_tax_percent.normalize().to_string(),
        has_quote: state.last_quote.is_some(),
        quote: state
            .last_quote
            .as_ref()
            .map(QuoteView::from_quote)
            .unwrap_or_default(),
    };

    Ok(Html(template.render()?))
}

/// GET / - the calculator page
pub async fn page(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let (shared, cookie) = state.sessions.acquire(&headers).await;
    let guard = session::lock(&shared)?;
    let html = render_page(&state.config, &guard, Flash::none())?;
    Ok(session::apply_cookie(html.into_response(), cookie))
}

/// POST /calc - single-vegetable quick calculation
pub async fn quick_calc(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ItemWeightForm>,
) -> Result<Response> {
    let (shared, cookie) = state.sessions.acquire(&headers).await;
    let guard = session::lock(&shared)?;

    let flash = match form.validate(state.config.mode) {
        Ok(input) => {
            let rate = guard.catalog.get(&input.vegetable);
            let charge = match input.distance_km {
                Some(km) => distance_weight_charge(rate, km, input.weight_kg),
                None => weight_charge(rate, input.weight_kg),
            };
            Flash::result(CalcResultView {
                vegetable: input.vegetable,
                rate: format_unit_rate(rate),
                charge: format_money(charge),
            })
        }
        Err(message) => Flash::error(message),
    };

    let html = render_page(&state.config, &guard, flash)?;
    Ok(session::apply_cookie(html.into_response(), cookie))
}

/// POST /catalog/rates - add a new crop or overwrite an existing rate
pub async fn update_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RateUpdateForm>,
) -> Result<Response> {
    let (shared, cookie) = state.sessions.acquire(&headers).await;
    let mut guard = session::lock(&shared)?;

    let flash = match form.validate() {
        Ok(update) => {
            let previous = guard.catalog.set(&update.name, update.rate);
            tracing::debug!("Rate set: {} -> {}", update.name, update.rate);
            match previous {
                Some(_) => Flash::notice(format!("Updated rate for {}", update.name)),
                None => Flash::notice(format!("Added {} to the rate list", update.name)),
            }
        }
        Err(message) => Flash::error(message),
    };

    let html = render_page(&state.config, &guard, flash)?;
    Ok(session::apply_cookie(html.into_response(), cookie))
}
