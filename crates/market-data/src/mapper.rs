//! Translation from upstream wire records to the internal domain model.
//!
//! Every function here is pure. Numeric fields never fail to map: missing,
//! null, or unparsable values become zero.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::{CompanyInfo, Quote, QuoteStatus, UpstreamCompany, UpstreamQuote};

/// The record's symbol, if it is present and non-blank.
///
/// Records failing this check are "not found" and never reach [`map_quote`].
pub fn usable_symbol(record: &UpstreamQuote) -> Option<&str> {
    non_blank(record.symbol.as_deref())
}

/// Map an upstream record to a successful [`Quote`].
///
/// Returns `None` only when the record has no usable symbol.
pub fn map_quote(record: &UpstreamQuote) -> Option<Quote> {
    let symbol = usable_symbol(record)?;

    Some(Quote {
        symbol: symbol.to_string(),
        name: non_blank(record.company_name.as_deref()).map(str::to_string),
        currency: non_blank(record.currency.as_deref()).map(str::to_string),
        last_price: decimal_field(record.latest_price.as_ref()),
        change: decimal_field(record.change.as_ref()),
        high: decimal_field(record.high.as_ref()),
        low: decimal_field(record.low.as_ref()),
        volume: volume_field(record.latest_volume.as_ref()),
        status: QuoteStatus::Success,
    })
}

/// Map an upstream company record. Symbol-less records are dropped.
pub fn map_company(record: &UpstreamCompany) -> Option<CompanyInfo> {
    let symbol = non_blank(record.symbol.as_deref())?;

    Some(CompanyInfo::new(
        symbol,
        record.name.clone().unwrap_or_default(),
        record.exchange.clone().unwrap_or_default(),
    ))
}

/// Parse a JSON number or numeric string into a decimal, zero otherwise.
pub fn decimal_field(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::Number(number)) => parse_decimal(&number.to_string()),
        Some(Value::String(text)) => parse_decimal(text.trim()),
        _ => Decimal::ZERO,
    }
}

/// Parse a volume; fractional values are truncated, negatives become zero.
pub fn volume_field(value: Option<&Value>) -> u64 {
    if let Some(Value::Number(number)) = value {
        if let Some(volume) = number.as_u64() {
            return volume;
        }
    }
    decimal_field(value).trunc().to_u64().unwrap_or(0)
}

fn parse_decimal(text: &str) -> Decimal {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
