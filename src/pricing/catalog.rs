//! Editable rate catalog.
//!
//! Lookup never fails: unknown items resolve to the catalog's default rate,
//! so an unlisted crop is still priced rather than rejected. The default is
//! a policy parameter carried by the catalog, not a hard-coded constant.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::models::{PricingMode, RateEntry};

/// Seed table for flat per-kg pricing (₹/kg).
const FLAT_SEED: &[(&str, Decimal)] = &[
    ("Coriander", dec!(9.58)),
    ("Yellow bellpepper", dec!(6.32)),
    ("Red bellpepper", dec!(6.26)),
    ("Spring onion", dec!(7.32)),
    ("Chilli", dec!(6.89)),
    ("Muskmelon", dec!(6.60)),
    ("Green Bellpepper", dec!(6.55)),
    ("Spinach", dec!(5.71)),
    ("Parsley", dec!(5.37)),
    ("Yellow candy", dec!(4.73)),
    ("Bellpepper", dec!(4.44)),
    ("Kale", dec!(4.42)),
    ("Cauliflower", dec!(4.37)),
    ("Lettuce", dec!(4.23)),
    ("Basil", dec!(4.20)),
    ("Tomato", dec!(4.13)),
    ("Zucchini", dec!(3.93)),
    ("Rocket", dec!(3.79)),
    ("Pak choy", dec!(3.79)),
    ("Mint", dec!(3.62)),
    ("Cucumber", dec!(3.62)),
    ("Cabbage", dec!(3.27)),
    ("Broccoli", dec!(2.04)),
    ("Radish", dec!(0.95)),
];

/// Default rate for items missing from the flat table.
const FLAT_DEFAULT_RATE: Decimal = Decimal::ZERO;

/// Seed table for distance-weighted pricing (₹/kg/km).
const DISTANCE_SEED: &[(&str, Decimal)] = &[
    ("Coriander", dec!(0.0048)),
    ("Chilli", dec!(0.0042)),
    ("Spinach", dec!(0.0035)),
    ("Tomato", dec!(0.0031)),
    ("Lettuce", dec!(0.0029)),
    ("Cauliflower", dec!(0.0027)),
    ("Cucumber", dec!(0.0024)),
    ("Cabbage", dec!(0.0022)),
    ("Broccoli", dec!(0.0019)),
    ("Radish", dec!(0.0012)),
];

/// Default rate for items missing from the distance-weighted table.
const DISTANCE_DEFAULT_RATE: Decimal = dec!(0.0025);

/// Editable mapping from item name to unit rate, insertion order preserved.
#[derive(Debug, Clone)]
pub struct RateCatalog {
    entries: Vec<RateEntry>,
    default_rate: Decimal,
}

impl RateCatalog {
    /// Create an empty catalog with the given default-on-miss rate.
    pub fn new(default_rate: Decimal) -> Self {
        Self {
            entries: Vec::new(),
            default_rate: default_rate.max(Decimal::ZERO),
        }
    }

    /// Create a catalog seeded for the given pricing mode.
    ///
    /// `default_override` replaces the mode's built-in default-on-miss rate.
    pub fn seeded(mode: PricingMode, default_override: Option<Decimal>) -> Self {
        let (seed, default_rate) = match mode {
            PricingMode::Flat => (FLAT_SEED, FLAT_DEFAULT_RATE),
            PricingMode::DistanceWeighted => (DISTANCE_SEED, DISTANCE_DEFAULT_RATE),
        };
        let mut catalog = Self::new(default_override.unwrap_or(default_rate));
        for (name, rate) in seed {
            catalog.set(name, *rate);
        }
        catalog
    }

    /// Rate for `name`, or the default rate when the item is unknown.
    pub fn get(&self, name: &str) -> Decimal {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.rate)
            .unwrap_or(self.default_rate)
    }

    /// Whether `name` has an explicit entry (as opposed to the default).
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Insert a new entry or overwrite an existing one; last write wins.
    ///
    /// Returns the previous rate when overwriting. Rates must be non-negative;
    /// callers validate at the input boundary and a negative value reaching
    /// this point is clamped to zero. There is no removal operation.
    pub fn set(&mut self, name: &str, rate: Decimal) -> Option<Decimal> {
        let rate = rate.max(Decimal::ZERO);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            let previous = entry.rate;
            entry.rate = rate;
            Some(previous)
        } else {
            self.entries.push(RateEntry {
                name: name.to_string(),
                rate,
            });
            None
        }
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[RateEntry] {
        &self.entries
    }

    /// Entries sorted descending by rate, for the rate-table display.
    pub fn sorted_by_rate_desc(&self) -> Vec<RateEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.rate.cmp(&a.rate));
        sorted
    }

    pub fn default_rate(&self) -> Decimal {
        self.default_rate
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
