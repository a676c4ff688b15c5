//! Wire shapes received from the upstream quote provider.
//!
//! These records are transient: they are deserialized leniently (every field
//! optional, numeric fields kept as raw JSON) and immediately translated by
//! [`crate::mapper`]. A record without a symbol is treated as "not found".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upstream quote record for one symbol.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamQuote {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Number or numeric string
    #[serde(default)]
    pub latest_price: Option<Value>,
    #[serde(default)]
    pub change: Option<Value>,
    #[serde(default)]
    pub high: Option<Value>,
    #[serde(default)]
    pub low: Option<Value>,
    #[serde(default)]
    pub latest_volume: Option<Value>,
}

/// One entry of a batch response, keyed by symbol in [`BatchUpstreamResponse`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    #[serde(default)]
    pub quote: Option<UpstreamQuote>,
}

/// Batch response: requested symbol -> entry.
///
/// Symbols the provider could not resolve are simply absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchUpstreamResponse(HashMap<String, BatchEntry>);

impl BatchUpstreamResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the record for `symbol`.
    pub fn insert(&mut self, symbol: impl Into<String>, quote: UpstreamQuote) {
        self.0.insert(symbol.into(), BatchEntry { quote: Some(quote) });
    }

    /// The record returned for `symbol`, if any.
    pub fn get(&self, symbol: &str) -> Option<&UpstreamQuote> {
        self.0.get(symbol).and_then(|entry| entry.quote.as_ref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, UpstreamQuote)> for BatchUpstreamResponse {
    fn from_iter<I: IntoIterator<Item = (String, UpstreamQuote)>>(iter: I) -> Self {
        let mut response = Self::new();
        for (symbol, quote) in iter {
            response.insert(symbol, quote);
        }
        response
    }
}

/// Upstream company search record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamCompany {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
}
