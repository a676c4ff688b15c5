//! Company search result model.

use serde::{Deserialize, Serialize};

/// Company matched by a name or symbol search.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Ticker symbol (e.g., "AAPL")
    pub symbol: String,

    /// Company name (e.g., "Apple Inc.")
    pub name: String,

    /// Listing exchange (e.g., "NASDAQ")
    pub exchange: String,
}

impl CompanyInfo {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        exchange: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            exchange: exchange.into(),
        }
    }
}
