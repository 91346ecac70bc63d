//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no I/O and no session access.
//! Validation is a boundary concern: these functions compute correctly for
//! any numeric input, including zero and negative values.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// Rounding is applied only when formatting or exporting; stored amounts stay
/// unrounded.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use farmgate_web::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Simple per-weight pricing: `weight × rate`.
pub fn weight_charge(rate: Decimal, weight_kg: Decimal) -> Decimal {
    weight_kg * rate
}

/// Distance-weighted logistics pricing: `distance × weight × rate`.
pub fn distance_weight_charge(rate: Decimal, distance_km: Decimal, weight_kg: Decimal) -> Decimal {
    distance_km * weight_kg * rate
}

/// Unweighted arithmetic mean of a set of unit rates.
///
/// Returns `None` for an empty slice. The mean is deliberately unweighted:
/// blended bulk quoting averages the rates themselves, not the quantities.
pub fn average_rate(rates: &[Decimal]) -> Option<Decimal> {
    if rates.is_empty() {
        return None;
    }
    let sum: Decimal = rates.iter().copied().sum();
    Some(sum / Decimal::from(rates.len()))
}

/// Tax on a subtotal: `subtotal × tax_percent / 100`.
pub fn tax_amount(subtotal: Decimal, tax_percent: Decimal) -> Decimal {
    subtotal * tax_percent / Decimal::ONE_HUNDRED
}

/// Format a monetary amount for display or export (2 decimal places).
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", round_money(amount, 2))
}

/// Format a unit rate for display or export.
///
/// Flat per-kg rates read naturally at 2 places; distance-weighted per-kg-per-km
/// rates are small fractions and keep up to 6 significant places.
pub fn format_unit_rate(rate: Decimal) -> String {
    let rounded = round_money(rate, 6);
    if rounded.scale() <= 2 {
        format!("{:.2}", rounded)
    } else {
        rounded.normalize().to_string()
    }
}
