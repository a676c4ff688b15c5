//! Deterministic stand-in data used when the upstream is unavailable.
//!
//! Values are linear in the ordinal so that quotes synthesized for different
//! positions of a batch are distinguishable.

use rust_decimal::Decimal;

use crate::models::{CompanyInfo, Quote, QuoteStatus};

pub const FALLBACK_NAME_SUFFIX: &str = " Corp LLC";
pub const FALLBACK_CURRENCY: &str = "USD";
pub const FALLBACK_EXCHANGE: &str = "NASDAQ";

const LAST_PRICE_STEP: u64 = 123;
const CHANGE_STEP: u64 = 20;
const HIGH_STEP: u64 = 132;
const LOW_STEP: u64 = 103;
const VOLUME_STEP: u64 = 320;

/// Synthesize a successful quote for `symbol` at the given 1-based ordinal.
///
/// An ordinal of 0 is treated as 1.
pub fn synthesize(ordinal: u32, symbol: &str) -> Quote {
    let ordinal = u64::from(ordinal.max(1));

    Quote {
        symbol: symbol.to_string(),
        name: Some(format!("{symbol}{FALLBACK_NAME_SUFFIX}")),
        currency: Some(FALLBACK_CURRENCY.to_string()),
        last_price: Decimal::from(ordinal * LAST_PRICE_STEP),
        change: Decimal::from(ordinal * CHANGE_STEP),
        high: Decimal::from(ordinal * HIGH_STEP),
        low: Decimal::from(ordinal * LOW_STEP),
        volume: ordinal * VOLUME_STEP,
        status: QuoteStatus::Success,
    }
}

/// Synthesize the single placeholder company returned for a failed search.
pub fn synthesize_company(term: &str) -> CompanyInfo {
    CompanyInfo::new(
        term,
        format!("{term}{FALLBACK_NAME_SUFFIX}"),
        FALLBACK_EXCHANGE,
    )
}
