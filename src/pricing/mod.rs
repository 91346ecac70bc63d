//! Pricing engine for the produce calculator.
//!
//! The whole computational core lives here as pure code over
//! `rust_decimal::Decimal`: rate lookup, charge computation, batch
//! aggregation and quote generation. No I/O, no session access - the web
//! layer owns both.

pub mod calculators;
pub mod catalog;
pub mod ledger;
pub mod models;
pub mod quote;
pub mod requests;

// Re-export commonly used items
pub use calculators::{format_money, format_unit_rate, round_money};
pub use catalog::RateCatalog;
pub use ledger::BatchLedger;
pub use models::{LineItem, PricingMode, RateEntry, TransportMode};
pub use quote::{build_averaged, build_itemized, Quote, QuoteMode};
