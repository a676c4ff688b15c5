use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome marker carried by every quote returned to callers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    Success,
    Failed,
}

/// Market data quote
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Requested symbol (always populated)
    pub symbol: String,

    /// Company display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Quote currency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Last traded price
    pub last_price: Decimal,

    /// Change since previous close
    pub change: Decimal,

    /// Session high
    pub high: Decimal,

    /// Session low
    pub low: Decimal,

    /// Traded volume
    pub volume: u64,

    pub status: QuoteStatus,
}

impl Quote {
    /// Create a per-item failure marker for a symbol the provider did not resolve.
    ///
    /// Only the symbol is set; numeric fields are zero and name/currency absent.
    pub fn failed(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            currency: None,
            last_price: Decimal::ZERO,
            change: Decimal::ZERO,
            high: Decimal::ZERO,
            low: Decimal::ZERO,
            volume: 0,
            status: QuoteStatus::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == QuoteStatus::Success
    }
}
