//! Append-only batch ledger.
//!
//! Line items keep the rate snapshot taken when they were appended; later
//! catalog edits never change recorded amounts. The ledger is cleared as a
//! whole or not at all.

use rust_decimal::Decimal;

use super::calculators::{format_money, format_unit_rate};
use super::models::{LineItem, PricingMode};

#[derive(Debug, Clone, Default)]
pub struct BatchLedger {
    items: Vec<LineItem>,
}

impl BatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line item. Duplicate item/weight pairs are distinct entries.
    pub fn append(&mut self, item: LineItem) {
        self.items.push(item);
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Sum of all line amounts; an empty batch sums to zero.
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|i| i.amount).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Empty the ledger.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Serialize the ledger to CSV: a header row plus one row per item.
    ///
    /// Amounts are rounded to 2 decimals here and only here. The export does
    /// not mutate the ledger; exporting an unmodified ledger twice produces
    /// byte-identical output.
    pub fn export_csv(&self, mode: PricingMode) -> Result<Vec<u8>, csv::Error> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(header(mode))?;
        for item in &self.items {
            wtr.write_record(item_record(item, mode))?;
        }
        wtr.flush()?;
        Ok(wtr.into_inner().map_err(|e| e.into_error())?)
    }
}

pub(super) fn header(mode: PricingMode) -> Vec<&'static str> {
    if mode.is_distance() {
        vec!["Vegetable", "Weight_KG", "KM", "Rate", "Amount"]
    } else {
        vec!["Vegetable", "Weight_KG", "Rate", "Amount"]
    }
}

pub(super) fn item_record(item: &LineItem, mode: PricingMode) -> Vec<String> {
    let mut record = vec![item.item_name.clone(), format_money(item.weight_kg)];
    if mode.is_distance() {
        record.push(
            item.distance_km
                .map(format_money)
                .unwrap_or_default(),
        );
    }
    record.push(format_unit_rate(item.unit_rate));
    record.push(format_money(item.amount));
    record
}
