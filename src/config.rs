//! Environment-driven configuration.
//!
//! Every knob has a default so the binary runs with no environment at all;
//! `.env` files are honoured via dotenvy before this is read.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::pricing::PricingMode;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_TTL_MINUTES: u64 = 120;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to (`BIND_ADDR`).
    pub bind_addr: String,
    /// Charging shape: flat per-kg or distance-weighted (`PRICING_MODE`).
    pub mode: PricingMode,
    /// Override of the catalog's default-on-miss rate (`DEFAULT_RATE`).
    pub default_rate: Option<Decimal>,
    /// GST percentage prefilled on the quote form (`DEFAULT_TAX_PERCENT`).
    pub default_tax_percent: Decimal,
    /// Idle lifetime of a browser session (`SESSION_TTL_MINUTES`).
    pub session_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let mode = match env::var("PRICING_MODE") {
            Ok(raw) => match PricingMode::parse(&raw) {
                Some(mode) => mode,
                None => bail!("PRICING_MODE must be `flat` or `distance`, got {raw:?}"),
            },
            Err(_) => PricingMode::Flat,
        };

        let default_rate = match env::var("DEFAULT_RATE") {
            Ok(raw) => {
                let rate: Decimal = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("DEFAULT_RATE is not a number: {raw:?}"))?;
                if rate < Decimal::ZERO {
                    bail!("DEFAULT_RATE must not be negative, got {raw:?}");
                }
                Some(rate)
            }
            Err(_) => None,
        };

        let default_tax_percent = match env::var("DEFAULT_TAX_PERCENT") {
            Ok(raw) => {
                let pct: Decimal = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("DEFAULT_TAX_PERCENT is not a number: {raw:?}"))?;
                if pct < Decimal::ZERO {
                    bail!("DEFAULT_TAX_PERCENT must not be negative, got {raw:?}");
                }
                pct
            }
            Err(_) => dec!(18),
        };

        let session_ttl_minutes = match env::var("SESSION_TTL_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("SESSION_TTL_MINUTES is not a number: {raw:?}"))?,
            Err(_) => DEFAULT_SESSION_TTL_MINUTES,
        };

        Ok(Self {
            bind_addr,
            mode,
            default_rate,
            default_tax_percent,
            session_ttl: Duration::from_secs(session_ttl_minutes * 60),
        })
    }
}
