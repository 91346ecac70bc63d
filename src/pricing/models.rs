//! Domain models for the pricing engine.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::calculators::{distance_weight_charge, weight_charge};

/// How charges are derived from the rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingMode {
    /// rate is ₹ per kg; charge = weight × rate
    Flat,
    /// rate is ₹ per kg per km; charge = distance × weight × rate
    DistanceWeighted,
}

impl PricingMode {
    pub fn is_distance(&self) -> bool {
        matches!(self, PricingMode::DistanceWeighted)
    }

    /// Parse a mode name as used in configuration (`flat` / `distance`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "flat" => Some(PricingMode::Flat),
            "distance" | "distance-weighted" => Some(PricingMode::DistanceWeighted),
            _ => None,
        }
    }
}

/// One named rate in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateEntry {
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Decimal,
}

/// A priced line: inputs plus the amount computed from the rate in effect
/// when the line was created. The amount is never recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub item_name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub weight_kg: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub distance_km: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}

impl LineItem {
    /// Price a line from its inputs and a snapshot of the unit rate.
    pub fn priced(
        item_name: &str,
        weight_kg: Decimal,
        distance_km: Option<Decimal>,
        unit_rate: Decimal,
    ) -> Self {
        let amount = match distance_km {
            Some(km) => distance_weight_charge(unit_rate, km, weight_kg),
            None => weight_charge(unit_rate, weight_kg),
        };
        Self {
            item_name: item_name.to_string(),
            weight_kg,
            distance_km,
            unit_rate,
            amount,
        }
    }
}

/// Per-kg transport surcharge applied at quote time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Truck,
    BusTrain,
    SelfPickup,
}

impl TransportMode {
    pub fn rate_per_kg(&self) -> Decimal {
        match self {
            TransportMode::Truck => dec!(2.50),
            TransportMode::BusTrain => dec!(1.50),
            TransportMode::SelfPickup => Decimal::ZERO,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Truck => "Truck",
            TransportMode::BusTrain => "Bus/Train",
            TransportMode::SelfPickup => "Self Pickup",
        }
    }

    /// Stable form value used by the transport `<select>`.
    pub fn key(&self) -> &'static str {
        match self {
            TransportMode::Truck => "truck",
            TransportMode::BusTrain => "bus_train",
            TransportMode::SelfPickup => "self_pickup",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "truck" => Some(TransportMode::Truck),
            "bus_train" => Some(TransportMode::BusTrain),
            "self_pickup" => Some(TransportMode::SelfPickup),
            _ => None,
        }
    }

    pub fn all() -> [TransportMode; 3] {
        [
            TransportMode::Truck,
            TransportMode::BusTrain,
            TransportMode::SelfPickup,
        ]
    }
}
