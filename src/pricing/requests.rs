//! Form DTOs and boundary validation for the calculator pages.
//!
//! All numeric fields arrive as strings and are validated here, before any
//! of them reach the catalog or the calculators. A failed validation is a
//! user-visible message and a retry of the same form, never a crash.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::models::{PricingMode, TransportMode};
use super::quote::QuoteMode;

/// Field prefix for per-item weight inputs on the quote form.
const WEIGHT_FIELD_PREFIX: &str = "w:";
/// Field prefix for the averaged-mode selection checkboxes.
const SELECT_FIELD_PREFIX: &str = "sel:";

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, String> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| format!("{field} must be a number"))
}

fn parse_positive(field: &str, raw: &str) -> Result<Decimal, String> {
    let value = parse_decimal(field, raw)?;
    if value <= Decimal::ZERO {
        return Err(format!("{field} must be greater than zero"));
    }
    Ok(value)
}

fn parse_non_negative(field: &str, raw: &str) -> Result<Decimal, String> {
    let value = parse_decimal(field, raw)?;
    if value < Decimal::ZERO {
        return Err(format!("{field} must not be negative"));
    }
    Ok(value)
}

/// In distance-weighted mode a distance is required; in flat mode the field
/// is absent from the form and ignored if present.
fn parse_distance(mode: PricingMode, raw: &str) -> Result<Option<Decimal>, String> {
    if !mode.is_distance() {
        return Ok(None);
    }
    parse_positive("Distance (KM)", raw).map(Some)
}

// ==================== single-item calculation ====================

/// Raw quick-calc / add-to-batch form.
#[derive(Debug, Deserialize)]
pub struct ItemWeightForm {
    pub vegetable: String,
    pub weight: String,
    #[serde(default)]
    pub distance_km: String,
}

/// Validated quick-calc / add-to-batch input.
#[derive(Debug, PartialEq)]
pub struct ItemWeight {
    pub vegetable: String,
    pub weight_kg: Decimal,
    pub distance_km: Option<Decimal>,
}

impl ItemWeightForm {
    pub fn validate(self, mode: PricingMode) -> Result<ItemWeight, String> {
        let vegetable = self.vegetable.trim().to_string();
        if vegetable.is_empty() {
            return Err("Select a vegetable".to_string());
        }
        Ok(ItemWeight {
            vegetable,
            weight_kg: parse_positive("Weight (KG)", &self.weight)?,
            distance_km: parse_distance(mode, &self.distance_km)?,
        })
    }
}

// ==================== catalog update ====================

/// Raw add-crop / update-rate form.
#[derive(Debug, Deserialize)]
pub struct RateUpdateForm {
    pub name: String,
    pub rate: String,
}

#[derive(Debug, PartialEq)]
pub struct RateUpdate {
    pub name: String,
    pub rate: Decimal,
}

impl RateUpdateForm {
    pub fn validate(self) -> Result<RateUpdate, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("Vegetable name is required".to_string());
        }
        Ok(RateUpdate {
            name,
            rate: parse_non_negative("Rate", &self.rate)?,
        })
    }
}

// ==================== quote form ====================

/// Validated quote request, parsed from the posted field map.
///
/// The quote form carries one weight input per catalog item (`w:<name>`)
/// and one selection checkbox per item (`sel:<name>`), so it arrives as a
/// dynamic field map rather than a fixed struct.
#[derive(Debug)]
pub struct QuoteForm {
    pub customer: String,
    pub mode: QuoteMode,
    pub tax_percent: Decimal,
    pub transport: Option<TransportMode>,
    /// Itemized mode: `(item, weight)` pairs with weight > 0.
    pub line_weights: Vec<(String, Decimal)>,
    /// Averaged mode: the checked item names.
    pub selected: Vec<String>,
    /// Averaged mode: the shared total weight.
    pub total_weight_kg: Option<Decimal>,
    pub distance_km: Option<Decimal>,
}

impl QuoteForm {
    pub fn from_fields(
        fields: &HashMap<String, String>,
        pricing_mode: PricingMode,
    ) -> Result<Self, String> {
        let customer = fields
            .get("customer")
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if customer.is_empty() {
            return Err("Customer name is required".to_string());
        }

        let mode = fields
            .get("quote_mode")
            .and_then(|s| QuoteMode::parse(s))
            .ok_or_else(|| "Select a quote mode".to_string())?;

        let tax_percent = parse_non_negative(
            "GST %",
            fields.get("tax_percent").map(String::as_str).unwrap_or(""),
        )?;

        let transport = match fields.get("transport").map(String::as_str) {
            None | Some("") => None,
            Some(raw) => Some(
                TransportMode::parse(raw).ok_or_else(|| "Unknown transport mode".to_string())?,
            ),
        };

        let distance_km = parse_distance(
            pricing_mode,
            fields.get("distance_km").map(String::as_str).unwrap_or(""),
        )?;

        // Per-item weights: blank and zero inputs mean "not selected";
        // anything negative or non-numeric is rejected.
        let mut line_weights = Vec::new();
        for (key, raw) in fields {
            if let Some(item) = key.strip_prefix(WEIGHT_FIELD_PREFIX) {
                let raw = raw.trim();
                if raw.is_empty() {
                    continue;
                }
                let weight = parse_non_negative(&format!("Weight for {item}"), raw)?;
                if weight > Decimal::ZERO {
                    line_weights.push((item.to_string(), weight));
                }
            }
        }
        // field-map iteration order is arbitrary; keep display order stable
        line_weights.sort_by(|a, b| a.0.cmp(&b.0));

        let mut selected: Vec<String> = fields
            .keys()
            .filter_map(|k| k.strip_prefix(SELECT_FIELD_PREFIX))
            .map(str::to_string)
            .collect();
        selected.sort();

        let total_weight_kg = match mode {
            QuoteMode::Averaged if !selected.is_empty() => Some(parse_positive(
                "Total weight (KG)",
                fields.get("total_weight").map(String::as_str).unwrap_or(""),
            )?),
            _ => None,
        };

        Ok(Self {
            customer,
            mode,
            tax_percent,
            transport,
            line_weights,
            selected,
            total_weight_kg,
            distance_km,
        })
    }

    /// True when nothing was selected: quote generation becomes a no-op.
    pub fn is_empty_selection(&self) -> bool {
        match self.mode {
            QuoteMode::Itemized => self.line_weights.is_empty(),
            QuoteMode::Averaged => self.selected.is_empty(),
        }
    }
}
