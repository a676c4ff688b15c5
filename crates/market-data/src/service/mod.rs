//! Quote service: the resilient facade over the upstream provider.
//!
//! Wires one shared [`CircuitBreaker`] (one circuit per operation kind) and
//! one shared provider into the three orchestrating components:
//! - [`QuoteResolver`] for single symbols
//! - [`BatchQuoteAggregator`] for symbol lists
//! - [`CompanySearch`] for company lookups

mod batch;
mod resolver;
mod search;

#[cfg(test)]
mod service_tests;

pub use batch::BatchQuoteAggregator;
pub use resolver::QuoteResolver;
pub use search::CompanySearch;

use std::sync::Arc;

use crate::errors::MarketDataError;
use crate::models::{CompanyInfo, Quote};
use crate::provider::MarketDataProvider;
use crate::resilience::{CircuitBreaker, CircuitMetrics, OperationKind, ResilienceConfig};

/// Entry point used by the HTTP layer.
pub struct QuoteService {
    resolver: QuoteResolver,
    aggregator: BatchQuoteAggregator,
    company_search: CompanySearch,
    breaker: Arc<CircuitBreaker>,
}

impl QuoteService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: ResilienceConfig) -> Self {
        let breaker = Arc::new(CircuitBreaker::with_config(config.breaker.clone()));

        Self {
            resolver: QuoteResolver::new(
                provider.clone(),
                breaker.clone(),
                config.timeout_for(OperationKind::SingleQuote),
            ),
            aggregator: BatchQuoteAggregator::new(
                provider.clone(),
                breaker.clone(),
                config.timeout_for(OperationKind::BatchQuote),
            ),
            company_search: CompanySearch::new(
                provider,
                breaker.clone(),
                config.timeout_for(OperationKind::CompanySearch),
            ),
            breaker,
        }
    }

    /// See [`QuoteResolver::resolve`].
    pub async fn resolve(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        self.resolver.resolve(symbol).await
    }

    /// See [`BatchQuoteAggregator::resolve_batch`].
    pub async fn resolve_batch(&self, symbols: &[String]) -> Vec<Quote> {
        self.aggregator.resolve_batch(symbols).await
    }

    /// See [`CompanySearch::search`].
    pub async fn search(&self, name: &str) -> Vec<CompanyInfo> {
        self.company_search.search(name).await
    }

    /// Dispatch a symbol list: none → empty without an upstream call, one →
    /// single resolve, more → batch.
    pub async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        match symbols {
            [] => Ok(Vec::new()),
            [symbol] => Ok(vec![self.resolve(symbol).await?]),
            _ => Ok(self.resolve_batch(symbols).await),
        }
    }

    pub fn circuit_metrics(&self) -> Vec<CircuitMetrics> {
        self.breaker.metrics()
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}
