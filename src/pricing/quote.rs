//! Quote construction.
//!
//! A quote is built on demand from a set of line items, is immutable once
//! built, and is kept only long enough to be rendered and offered for
//! download. Two quoting policies exist: itemized (each line priced on its
//! own) and averaged (one blended charge at the unweighted mean of the
//! selected rates).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::calculators::{average_rate, format_money, tax_amount, weight_charge};
use super::catalog::RateCatalog;
use super::ledger::{header, item_record};
use super::models::{LineItem, PricingMode, RateEntry, TransportMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMode {
    Itemized,
    Averaged,
}

impl QuoteMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "itemized" => Some(QuoteMode::Itemized),
            "averaged" => Some(QuoteMode::Averaged),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuoteMode::Itemized => "Itemized",
            QuoteMode::Averaged => "Averaged",
        }
    }
}

/// A finalized, tax-inclusive pricing document.
#[derive(Debug, Clone)]
pub struct Quote {
    pub customer: String,
    pub date: NaiveDate,
    pub mode: QuoteMode,
    /// Itemized: one line per item. Averaged: a single blended line.
    pub lines: Vec<LineItem>,
    /// Averaged mode only: the entries whose rates were blended.
    pub selection: Vec<RateEntry>,
    /// Averaged mode only: the unweighted mean of the selected rates.
    pub average_rate: Option<Decimal>,
    pub total_weight_kg: Decimal,
    pub distance_km: Option<Decimal>,
    pub transport: Option<TransportMode>,
    pub transport_charge: Decimal,
    pub tax_percent: Decimal,
    pub items_subtotal: Decimal,
    /// items_subtotal + transport_charge; the base the tax applies to.
    pub taxable_total: Decimal,
    pub tax_amount: Decimal,
    pub grand_total: Decimal,
}

/// Build an itemized quote: each `(item, weight)` pair gets its own rate
/// snapshot and amount. In distance-weighted pricing one trip distance
/// applies to every line.
///
/// Returns `None` when no lines are selected - an empty quote is a no-op,
/// not an error.
#[allow(clippy::too_many_arguments)]
pub fn build_itemized(
    catalog: &RateCatalog,
    lines: &[(String, Decimal)],
    distance_km: Option<Decimal>,
    tax_percent: Decimal,
    transport: Option<TransportMode>,
    customer: &str,
    as_of: Option<DateTime<Utc>>,
) -> Option<Quote> {
    if lines.is_empty() {
        return None;
    }

    let items: Vec<LineItem> = lines
        .iter()
        .map(|(name, weight)| LineItem::priced(name, *weight, distance_km, catalog.get(name)))
        .collect();
    let total_weight: Decimal = items.iter().map(|i| i.weight_kg).sum();
    let items_subtotal: Decimal = items.iter().map(|i| i.amount).sum();

    Some(finish(
        QuoteMode::Itemized,
        items,
        Vec::new(),
        None,
        total_weight,
        distance_km,
        items_subtotal,
        tax_percent,
        transport,
        customer,
        as_of,
    ))
}

/// Build an averaged quote: one blended charge for a set of items sharing a
/// single total weight (and optionally a single distance).
///
/// The blended rate is the unweighted mean of the selected items' rates;
/// per-item granularity is deliberately lost. Returns `None` for an empty
/// selection.
#[allow(clippy::too_many_arguments)]
pub fn build_averaged(
    catalog: &RateCatalog,
    names: &[String],
    total_weight_kg: Decimal,
    distance_km: Option<Decimal>,
    tax_percent: Decimal,
    transport: Option<TransportMode>,
    customer: &str,
    as_of: Option<DateTime<Utc>>,
) -> Option<Quote> {
    if names.is_empty() {
        return None;
    }

    let selection: Vec<RateEntry> = names
        .iter()
        .map(|name| RateEntry {
            name: name.clone(),
            rate: catalog.get(name),
        })
        .collect();
    let rates: Vec<Decimal> = selection.iter().map(|e| e.rate).collect();
    let mean = average_rate(&rates)?;

    let blended_name = format!("Blended ({})", names.join(", "));
    let blended = LineItem::priced(&blended_name, total_weight_kg, distance_km, mean);
    let items_subtotal = blended.amount;

    Some(finish(
        QuoteMode::Averaged,
        vec![blended],
        selection,
        Some(mean),
        total_weight_kg,
        distance_km,
        items_subtotal,
        tax_percent,
        transport,
        customer,
        as_of,
    ))
}

#[allow(clippy::too_many_arguments)]
fn finish(
    mode: QuoteMode,
    lines: Vec<LineItem>,
    selection: Vec<RateEntry>,
    mean: Option<Decimal>,
    total_weight_kg: Decimal,
    distance_km: Option<Decimal>,
    items_subtotal: Decimal,
    tax_percent: Decimal,
    transport: Option<TransportMode>,
    customer: &str,
    as_of: Option<DateTime<Utc>>,
) -> Quote {
    let transport_charge = transport
        .map(|t| weight_charge(t.rate_per_kg(), total_weight_kg))
        .unwrap_or(Decimal::ZERO);
    let taxable_total = items_subtotal + transport_charge;
    let tax = tax_amount(taxable_total, tax_percent);

    Quote {
        customer: customer.to_string(),
        date: as_of.unwrap_or_else(Utc::now).date_naive(),
        mode,
        lines,
        selection,
        average_rate: mean,
        total_weight_kg,
        distance_km,
        transport,
        transport_charge,
        tax_percent,
        items_subtotal,
        taxable_total,
        tax_amount: tax,
        grand_total: taxable_total + tax,
    }
}

impl Quote {
    /// CSV export: the item rows in the batch layout, then amount-only
    /// summary rows (Subtotal, Transport when charged, GST, GRAND TOTAL).
    /// Rounding to 2 decimals happens here only.
    pub fn export_csv(&self, mode: PricingMode) -> Result<Vec<u8>, csv::Error> {
        let columns = header(mode).len();
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(header(mode))?;
        for line in &self.lines {
            wtr.write_record(item_record(line, mode))?;
        }
        wtr.write_record(summary_record(columns, "Subtotal", self.items_subtotal))?;
        if let Some(transport) = self.transport {
            if self.transport_charge > Decimal::ZERO {
                let label = format!("Transport ({})", transport.label());
                wtr.write_record(summary_record(columns, &label, self.transport_charge))?;
            }
        }
        let gst_label = format!("GST @{}%", self.tax_percent.normalize());
        wtr.write_record(summary_record(columns, &gst_label, self.tax_amount))?;
        wtr.write_record(summary_record(columns, "GRAND TOTAL", self.grand_total))?;
        wtr.flush()?;
        Ok(wtr.into_inner().map_err(|e| e.into_error())?)
    }

    /// Download filename derived from the customer name and quote date.
    pub fn filename(&self) -> String {
        let mut slug: String = self
            .customer
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        slug = slug.trim_matches('-').to_string();
        while slug.contains("--") {
            slug = slug.replace("--", "-");
        }
        if slug.is_empty() {
            slug = "customer".to_string();
        }
        format!("quote_{}_{}.csv", slug, self.date.format("%Y-%m-%d"))
    }
}

/// A row whose only value sits in the trailing Amount column.
fn summary_record(columns: usize, label: &str, amount: Decimal) -> Vec<String> {
    let mut record = vec![label.to_string()];
    record.resize(columns - 1, String::new());
    record.push(format_money(amount));
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flat_catalog() -> RateCatalog {
        RateCatalog::seeded(PricingMode::Flat, None)
    }

    fn lines(pairs: &[(&str, Decimal)]) -> Vec<(String, Decimal)> {
        pairs.iter().map(|(n, w)| (n.to_string(), *w)).collect()
    }

    // ==================== itemized tests ====================

    #[test]
    fn test_itemized_quote_example_scenario() {
        let catalog = flat_catalog();
        let quote = build_itemized(
            &catalog,
            &lines(&[("Tomato", dec!(50)), ("Chilli", dec!(20))]),
            None,
            dec!(18),
            None,
            "Acme Traders",
            None,
        )
        .unwrap();

        assert_eq!(quote.items_subtotal, dec!(344.30));
        assert_eq!(quote.tax_amount, dec!(61.974));
        assert_eq!(quote.grand_total, dec!(406.274));
        assert_eq!(quote.total_weight_kg, dec!(70));
        assert_eq!(quote.lines.len(), 2);
    }

    #[test]
    fn test_itemized_quote_unknown_item_priced_at_default() {
        let catalog = RateCatalog::seeded(PricingMode::Flat, Some(dec!(4.00)));
        let quote = build_itemized(
            &catalog,
            &lines(&[("Durian", dec!(10))]),
            None,
            dec!(0),
            None,
            "A",
            None,
        )
        .unwrap();
        assert_eq!(quote.items_subtotal, dec!(40.00));
    }

    #[test]
    fn test_itemized_quote_with_distance() {
        let catalog = RateCatalog::seeded(PricingMode::DistanceWeighted, None);
        let quote = build_itemized(
            &catalog,
            &lines(&[("Tomato", dec!(200))]),
            Some(dec!(120)),
            dec!(18),
            None,
            "A",
            None,
        )
        .unwrap();
        assert_eq!(quote.items_subtotal, dec!(120) * dec!(200) * dec!(0.0031));
        assert_eq!(quote.lines[0].distance_km, Some(dec!(120)));
    }

    #[test]
    fn test_empty_selection_builds_nothing() {
        let catalog = flat_catalog();
        assert!(build_itemized(&catalog, &[], None, dec!(18), None, "A", None).is_none());
        assert!(
            build_averaged(&catalog, &[], dec!(100), None, dec!(18), None, "A", None).is_none()
        );
    }

    // ==================== averaged tests ====================

    #[test]
    fn test_averaged_quote_example_scenario() {
        let catalog = flat_catalog();
        let quote = build_averaged(
            &catalog,
            &["Tomato".to_string(), "Chilli".to_string()],
            dec!(100),
            None,
            dec!(18),
            None,
            "Acme Traders",
            None,
        )
        .unwrap();

        assert_eq!(quote.average_rate, Some(dec!(5.51)));
        assert_eq!(quote.items_subtotal, dec!(551.00));
        assert_eq!(quote.grand_total, dec!(551.00) + dec!(99.18));
        assert_eq!(quote.lines.len(), 1);
        assert_eq!(quote.selection.len(), 2);
    }

    #[test]
    fn test_averaged_mean_is_unweighted() {
        // Mean of the rates themselves, not weighted by any quantity
        let mut catalog = RateCatalog::new(Decimal::ZERO);
        catalog.set("A", dec!(1.00));
        catalog.set("B", dec!(3.00));
        let quote = build_averaged(
            &catalog,
            &["A".to_string(), "B".to_string()],
            dec!(10),
            None,
            dec!(0),
            None,
            "C",
            None,
        )
        .unwrap();
        assert_eq!(quote.average_rate, Some(dec!(2.00)));
        assert_eq!(quote.items_subtotal, dec!(20.00));
    }

    #[test]
    fn test_averaged_quote_with_distance() {
        let catalog = RateCatalog::seeded(PricingMode::DistanceWeighted, None);
        let quote = build_averaged(
            &catalog,
            &["Tomato".to_string(), "Cabbage".to_string()],
            dec!(500),
            Some(dec!(80)),
            dec!(18),
            None,
            "A",
            None,
        )
        .unwrap();
        // mean of 0.0031 and 0.0022
        let mean = dec!(0.00265);
        assert_eq!(quote.average_rate, Some(mean));
        assert_eq!(quote.items_subtotal, dec!(80) * dec!(500) * mean);
    }

    // ==================== transport tests ====================

    #[test]
    fn test_transport_surcharge_taxed_after_transport() {
        let catalog = flat_catalog();
        let quote = build_itemized(
            &catalog,
            &lines(&[("Tomato", dec!(50)), ("Chilli", dec!(20))]),
            None,
            dec!(18),
            Some(TransportMode::Truck),
            "Acme Traders",
            None,
        )
        .unwrap();

        // 70 kg × ₹2.50/kg
        assert_eq!(quote.transport_charge, dec!(175.00));
        assert_eq!(quote.taxable_total, dec!(519.30));
        assert_eq!(quote.tax_amount, dec!(519.30) * dec!(18) / dec!(100));
        assert_eq!(quote.grand_total, quote.taxable_total + quote.tax_amount);
    }

    #[test]
    fn test_self_pickup_degenerates_to_plain_quote() {
        let catalog = flat_catalog();
        let with_pickup = build_itemized(
            &catalog,
            &lines(&[("Tomato", dec!(50))]),
            None,
            dec!(18),
            Some(TransportMode::SelfPickup),
            "A",
            None,
        )
        .unwrap();
        assert_eq!(with_pickup.transport_charge, Decimal::ZERO);
        assert_eq!(with_pickup.taxable_total, with_pickup.items_subtotal);
    }

    // ==================== export tests ====================

    #[test]
    fn test_itemized_export_layout() {
        let catalog = flat_catalog();
        let quote = build_itemized(
            &catalog,
            &lines(&[("Tomato", dec!(50)), ("Chilli", dec!(20))]),
            None,
            dec!(18),
            None,
            "Acme Traders",
            None,
        )
        .unwrap();
        let text = String::from_utf8(quote.export_csv(PricingMode::Flat).unwrap()).unwrap();
        assert_eq!(
            text,
            "Vegetable,Weight_KG,Rate,Amount\n\
             Tomato,50.00,4.13,206.50\n\
             Chilli,20.00,6.89,137.80\n\
             Subtotal,,,344.30\n\
             GST @18%,,,61.97\n\
             GRAND TOTAL,,,406.27\n"
        );
    }

    #[test]
    fn test_export_includes_transport_row_when_charged() {
        let catalog = flat_catalog();
        let quote = build_itemized(
            &catalog,
            &lines(&[("Tomato", dec!(50))]),
            None,
            dec!(18),
            Some(TransportMode::BusTrain),
            "A",
            None,
        )
        .unwrap();
        let text = String::from_utf8(quote.export_csv(PricingMode::Flat).unwrap()).unwrap();
        assert!(text.contains("Transport (Bus/Train),,,75.00\n"));
    }

    #[test]
    fn test_averaged_export_single_blended_row() {
        let catalog = flat_catalog();
        let quote = build_averaged(
            &catalog,
            &["Tomato".to_string(), "Chilli".to_string()],
            dec!(100),
            None,
            dec!(18),
            None,
            "A",
            None,
        )
        .unwrap();
        let text = String::from_utf8(quote.export_csv(PricingMode::Flat).unwrap()).unwrap();
        assert_eq!(
            text,
            "Vegetable,Weight_KG,Rate,Amount\n\
             \"Blended (Tomato, Chilli)\",100.00,5.51,551.00\n\
             Subtotal,,,551.00\n\
             GST @18%,,,99.18\n\
             GRAND TOTAL,,,650.18\n"
        );
    }

    // ==================== filename tests ====================

    #[test]
    fn test_filename_from_customer_and_date() {
        let catalog = flat_catalog();
        let as_of = "2026-08-08T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let quote = build_itemized(
            &catalog,
            &lines(&[("Tomato", dec!(50))]),
            None,
            dec!(18),
            None,
            "Acme Traders Pvt. Ltd",
            Some(as_of),
        )
        .unwrap();
        assert_eq!(quote.filename(), "quote_acme-traders-pvt-ltd_2026-08-08.csv");
    }

    #[test]
    fn test_filename_falls_back_when_unusable() {
        let catalog = flat_catalog();
        let as_of = "2026-08-08T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let quote = build_itemized(
            &catalog,
            &lines(&[("Tomato", dec!(50))]),
            None,
            dec!(18),
            None,
            "!!!",
            Some(as_of),
        )
        .unwrap();
        assert_eq!(quote.filename(), "quote_customer_2026-08-08.csv");
    }
}
