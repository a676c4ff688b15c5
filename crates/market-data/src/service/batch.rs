//! Batch quote aggregation with per-item partial failure.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::fallback;
use crate::mapper;
use crate::models::{BatchUpstreamResponse, Quote};
use crate::provider::MarketDataProvider;
use crate::resilience::{execute_guarded, CircuitBreaker, OperationKind};

/// Resolves many symbols with one upstream call through the batch circuit.
pub struct BatchQuoteAggregator {
    provider: Arc<dyn MarketDataProvider>,
    breaker: Arc<CircuitBreaker>,
    timeout: Option<Duration>,
}

impl BatchQuoteAggregator {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        breaker: Arc<CircuitBreaker>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            provider,
            breaker,
            timeout,
        }
    }

    /// Resolve `symbols`, returning exactly one quote per input, in input order.
    ///
    /// Duplicates are resolved independently per occurrence. Symbols missing
    /// from an otherwise successful response become [`Quote::failed`] markers.
    /// If the upstream is unavailable every symbol gets a fallback quote whose
    /// ordinal is its 1-based position.
    pub async fn resolve_batch(&self, symbols: &[String]) -> Vec<Quote> {
        if symbols.is_empty() {
            return Vec::new();
        }

        debug!("Retrieving multiple quotes for: {}", symbols.join(","));

        let call = self.provider.get_quotes(symbols);
        match execute_guarded(&self.breaker, OperationKind::BatchQuote, self.timeout, call).await {
            Ok(response) => {
                let quotes = reconcile(symbols, &response);
                debug!(
                    "Batch resolved {} of {} symbols",
                    quotes.iter().filter(|q| q.is_success()).count(),
                    symbols.len()
                );
                quotes
            }
            Err(e) => {
                warn!(
                    "Upstream unavailable for batch of {} ({}), returning fallback quotes",
                    symbols.len(),
                    e
                );
                synthesize_all(symbols)
            }
        }
    }
}

/// Walk the requested symbols in order, mapping hits and marking misses.
fn reconcile(symbols: &[String], response: &BatchUpstreamResponse) -> Vec<Quote> {
    symbols
        .iter()
        .map(|symbol| {
            match response.get(symbol).and_then(mapper::map_quote) {
                Some(quote) => quote,
                None => {
                    warn!("Quote could not be found for the following symbol: {}", symbol);
                    Quote::failed(symbol.as_str())
                }
            }
        })
        .collect()
}

fn synthesize_all(symbols: &[String]) -> Vec<Quote> {
    symbols
        .iter()
        .zip(1u32..)
        .map(|(symbol, ordinal)| fallback::synthesize(ordinal, symbol))
        .collect()
}
