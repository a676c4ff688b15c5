//! Tests for QuoteService resilience contracts.
//!
//! # Contract Points
//!
//! 1. Single resolve: only not-found propagates; unavailability yields fallback
//! 2. Batch: one result per requested symbol, in order, with per-item misses
//! 3. Search: upstream order is preserved; unavailability yields a placeholder
//! 4. Breaker: an open circuit never reaches the provider, circuits are
//!    independent per operation kind, timeouts count as failures

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal_macros::dec;
use serde_json::json;

use super::QuoteService;
use crate::errors::MarketDataError;
use crate::fallback;
use crate::models::{
    BatchUpstreamResponse, CompanyInfo, Quote, QuoteStatus, UpstreamCompany, UpstreamQuote,
};
use crate::provider::MarketDataProvider;
use crate::resilience::{CircuitBreakerConfig, CircuitState, OperationKind, ResilienceConfig};

// =========================================================================
// Mock MarketDataProvider
// =========================================================================

#[derive(Clone, Default)]
struct MockProvider {
    quotes: Arc<Mutex<HashMap<String, UpstreamQuote>>>,
    companies: Arc<Mutex<Vec<UpstreamCompany>>>,
    failing: Arc<Mutex<bool>>,
    delay: Arc<Mutex<Option<Duration>>>,
    single_calls: Arc<AtomicUsize>,
    batch_calls: Arc<AtomicUsize>,
    search_calls: Arc<AtomicUsize>,
}

impl MockProvider {
    fn new() -> Self {
        Self::default()
    }

    fn add_quote(&self, symbol: &str, price: f64, volume: u64) {
        self.quotes.lock().unwrap().insert(
            symbol.to_string(),
            UpstreamQuote {
                symbol: Some(symbol.to_string()),
                company_name: Some(format!("{symbol} Inc.")),
                currency: Some("USD".to_string()),
                latest_price: Some(json!(price)),
                change: Some(json!(0.5)),
                high: Some(json!(price + 1.0)),
                low: Some(json!(price - 1.0)),
                latest_volume: Some(json!(volume)),
            },
        );
    }

    fn add_raw(&self, symbol: &str, record: UpstreamQuote) {
        self.quotes.lock().unwrap().insert(symbol.to_string(), record);
    }

    fn add_company(&self, symbol: &str, name: &str) {
        self.companies.lock().unwrap().push(UpstreamCompany {
            symbol: Some(symbol.to_string()),
            name: Some(name.to_string()),
            exchange: Some("NYSE".to_string()),
        });
    }

    fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    fn total_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
            + self.batch_calls.load(Ordering::SeqCst)
            + self.search_calls.load(Ordering::SeqCst)
    }

    async fn simulate_upstream(&self) -> Result<(), MarketDataError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.failing.lock().unwrap() {
            return Err(MarketDataError::ProviderError {
                provider: "MOCK".to_string(),
                message: "Intentional upstream failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    async fn get_quote(&self, symbol: &str) -> Result<Option<UpstreamQuote>, MarketDataError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_upstream().await?;
        Ok(self.quotes.lock().unwrap().get(symbol).cloned())
    }

    async fn get_quotes(
        &self,
        symbols: &[String],
    ) -> Result<BatchUpstreamResponse, MarketDataError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_upstream().await?;
        let quotes = self.quotes.lock().unwrap();
        Ok(symbols
            .iter()
            .filter_map(|s| quotes.get(s).map(|q| (s.clone(), q.clone())))
            .collect())
    }

    async fn search_companies(
        &self,
        _name: &str,
    ) -> Result<Vec<UpstreamCompany>, MarketDataError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_upstream().await?;
        Ok(self.companies.lock().unwrap().clone())
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn config(volume_threshold: u32, sleep_window: Duration) -> ResilienceConfig {
    ResilienceConfig {
        breaker: CircuitBreakerConfig {
            request_volume_threshold: volume_threshold,
            sleep_window,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn service_with(provider: &MockProvider, config: ResilienceConfig) -> QuoteService {
    QuoteService::new(Arc::new(provider.clone()), config)
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// =========================================================================
// Single quote
// =========================================================================

#[tokio::test]
async fn test_resolve_maps_upstream_record() {
    let provider = MockProvider::new();
    provider.add_quote("AAPL", 189.5, 1000);
    let service = service_with(&provider, ResilienceConfig::default());

    let quote = service.resolve("AAPL").await.unwrap();

    assert_eq!(quote.symbol, "AAPL");
    assert_eq!(quote.name.as_deref(), Some("AAPL Inc."));
    assert_eq!(quote.last_price, dec!(189.5));
    assert_eq!(quote.high, dec!(190.5));
    assert_eq!(quote.volume, 1000);
    assert_eq!(quote.status, QuoteStatus::Success);
}

#[tokio::test]
async fn test_resolve_is_idempotent_for_stable_upstream() {
    let provider = MockProvider::new();
    provider.add_quote("MSFT", 402.1, 5000);
    let service = service_with(&provider, ResilienceConfig::default());

    let first = service.resolve("MSFT").await.unwrap();
    let second = service.resolve("MSFT").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.single_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_resolve_unknown_symbol_is_not_found() {
    let provider = MockProvider::new();
    let service = service_with(&provider, config(1, Duration::from_secs(60)));

    let result = service.resolve("NOPE").await;

    assert!(matches!(result, Err(MarketDataError::SymbolNotFound(ref s)) if s == "NOPE"));
    assert_eq!(provider.single_calls.load(Ordering::SeqCst), 1);
    // Not-found comes from a healthy upstream and never trips the circuit
    assert_eq!(
        service.breaker().state(OperationKind::SingleQuote),
        CircuitState::Closed
    );
}

#[tokio::test]
async fn test_resolve_symbol_less_record_is_not_found() {
    let provider = MockProvider::new();
    provider.add_raw(
        "GHOST",
        UpstreamQuote {
            latest_price: Some(json!(12.0)),
            ..Default::default()
        },
    );
    let service = service_with(&provider, ResilienceConfig::default());

    let result = service.resolve("GHOST").await;

    assert!(matches!(result, Err(MarketDataError::SymbolNotFound(_))));
}

#[tokio::test]
async fn test_resolve_transport_failure_returns_fallback() {
    let provider = MockProvider::new();
    provider.add_quote("AAPL", 189.5, 1000);
    provider.set_failing(true);
    let service = service_with(&provider, ResilienceConfig::default());

    let quote = service.resolve("AAPL").await.unwrap();

    assert_eq!(quote, fallback::synthesize(1, "AAPL"));
    assert_eq!(quote.status, QuoteStatus::Success);
}

#[tokio::test]
async fn test_open_circuit_returns_fallback_without_upstream_call() {
    let provider = MockProvider::new();
    provider.add_quote("AAPL", 189.5, 1000);
    provider.set_failing(true);
    let service = service_with(&provider, config(2, Duration::from_secs(60)));

    service.resolve("AAPL").await.unwrap();
    service.resolve("AAPL").await.unwrap();
    assert_eq!(
        service.breaker().state(OperationKind::SingleQuote),
        CircuitState::Open
    );

    provider.set_failing(false);
    let calls_before = provider.total_calls();
    let quote = service.resolve("AAPL").await.unwrap();

    assert_eq!(quote, fallback::synthesize(1, "AAPL"));
    assert_eq!(provider.total_calls(), calls_before);
}

#[tokio::test(start_paused = true)]
async fn test_resolve_timeout_returns_fallback_and_counts_failure() {
    let provider = MockProvider::new();
    provider.add_quote("SLOW", 10.0, 1);
    provider.set_delay(Duration::from_secs(5));
    let service = service_with(&provider, config(1, Duration::from_secs(60)));

    let quote = service.resolve("SLOW").await.unwrap();

    assert_eq!(quote, fallback::synthesize(1, "SLOW"));
    assert_eq!(
        service.breaker().state(OperationKind::SingleQuote),
        CircuitState::Open
    );
}

#[tokio::test]
async fn test_half_open_trial_success_closes_circuit() {
    let provider = MockProvider::new();
    provider.add_quote("AAPL", 189.5, 1000);
    provider.set_failing(true);
    let service = service_with(&provider, config(1, Duration::from_millis(10)));

    service.resolve("AAPL").await.unwrap();
    assert_eq!(
        service.breaker().state(OperationKind::SingleQuote),
        CircuitState::Open
    );

    provider.set_failing(false);
    tokio::time::sleep(Duration::from_millis(30)).await;

    let quote = service.resolve("AAPL").await.unwrap();
    assert_eq!(quote.last_price, dec!(189.5));
    assert_eq!(
        service.breaker().state(OperationKind::SingleQuote),
        CircuitState::Closed
    );
}

#[tokio::test]
async fn test_half_open_trial_failure_reopens_circuit() {
    let provider = MockProvider::new();
    provider.set_failing(true);
    let service = service_with(&provider, config(1, Duration::from_millis(10)));

    service.resolve("AAPL").await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let calls_before = provider.single_calls.load(Ordering::SeqCst);
    service.resolve("AAPL").await.unwrap();

    assert_eq!(provider.single_calls.load(Ordering::SeqCst), calls_before + 1);
    assert_eq!(
        service.breaker().state(OperationKind::SingleQuote),
        CircuitState::Open
    );
}

// =========================================================================
// Batch
// =========================================================================

#[tokio::test]
async fn test_batch_partial_failure_preserves_order() {
    let provider = MockProvider::new();
    provider.add_quote("A", 1.5, 10);
    provider.add_quote("C", 3.5, 30);
    let service = service_with(&provider, ResilienceConfig::default());

    let quotes = service.resolve_batch(&symbols(&["A", "B", "C"])).await;

    assert_eq!(quotes.len(), 3);
    assert_eq!(quotes[0].symbol, "A");
    assert_eq!(quotes[0].status, QuoteStatus::Success);
    assert_eq!(quotes[0].last_price, dec!(1.5));
    assert_eq!(quotes[1], Quote::failed("B"));
    assert_eq!(quotes[2].symbol, "C");
    assert_eq!(quotes[2].status, QuoteStatus::Success);
    assert_eq!(quotes[2].volume, 30);
    assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_batch_resolves_duplicates_per_occurrence() {
    let provider = MockProvider::new();
    provider.add_quote("A", 1.0, 10);
    let service = service_with(&provider, ResilienceConfig::default());

    let quotes = service
        .resolve_batch(&symbols(&["A", "Z", "A", "Z"]))
        .await;

    let summary: Vec<_> = quotes.iter().map(|q| (q.symbol.as_str(), q.status)).collect();
    assert_eq!(
        summary,
        [
            ("A", QuoteStatus::Success),
            ("Z", QuoteStatus::Failed),
            ("A", QuoteStatus::Success),
            ("Z", QuoteStatus::Failed)
        ]
    );
    assert_eq!(quotes[0], quotes[2]);
}

#[tokio::test]
async fn test_batch_total_failure_uses_positional_ordinals() {
    let provider = MockProvider::new();
    provider.set_failing(true);
    let service = service_with(&provider, ResilienceConfig::default());

    let quotes = service.resolve_batch(&symbols(&["X", "Y"])).await;

    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0], fallback::synthesize(1, "X"));
    assert_eq!(quotes[1], fallback::synthesize(2, "Y"));
    assert_eq!(quotes[0].last_price, dec!(123));
    assert_eq!(quotes[1].last_price, dec!(246));
    assert_eq!(quotes[1].volume, 640);
}

#[tokio::test]
async fn test_batch_open_circuit_skips_upstream() {
    let provider = MockProvider::new();
    provider.set_failing(true);
    let service = service_with(&provider, config(1, Duration::from_secs(60)));

    service.resolve_batch(&symbols(&["X", "Y"])).await;
    assert_eq!(
        service.breaker().state(OperationKind::BatchQuote),
        CircuitState::Open
    );

    let quotes = service.resolve_batch(&symbols(&["P", "Q", "R"])).await;

    assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(quotes[2], fallback::synthesize(3, "R"));
}

#[tokio::test(start_paused = true)]
async fn test_batch_timeout_returns_fallback() {
    let provider = MockProvider::new();
    provider.add_quote("A", 1.0, 10);
    provider.set_delay(Duration::from_secs(5));
    let service = service_with(&provider, ResilienceConfig::default());

    let quotes = service.resolve_batch(&symbols(&["A", "B"])).await;

    assert_eq!(quotes[0], fallback::synthesize(1, "A"));
    assert_eq!(quotes[1], fallback::synthesize(2, "B"));
}

#[tokio::test]
async fn test_batch_empty_input_makes_no_call() {
    let provider = MockProvider::new();
    let service = service_with(&provider, ResilienceConfig::default());

    assert!(service.resolve_batch(&[]).await.is_empty());
    assert_eq!(provider.total_calls(), 0);
}

// =========================================================================
// Company search
// =========================================================================

#[tokio::test]
async fn test_search_preserves_upstream_order() {
    let provider = MockProvider::new();
    provider.add_company("MSFT", "Microsoft Corporation");
    provider.add_company("AAPL", "Apple Inc.");
    let service = service_with(&provider, ResilienceConfig::default());

    let companies = service.search("a").await;

    assert_eq!(
        companies,
        [
            CompanyInfo::new("MSFT", "Microsoft Corporation", "NYSE"),
            CompanyInfo::new("AAPL", "Apple Inc.", "NYSE"),
        ]
    );
}

#[tokio::test]
async fn test_search_empty_result_is_not_a_failure() {
    let provider = MockProvider::new();
    let service = service_with(&provider, ResilienceConfig::default());

    assert!(service.search("nothing").await.is_empty());
}

#[tokio::test]
async fn test_search_failure_returns_placeholder() {
    let provider = MockProvider::new();
    provider.set_failing(true);
    let service = service_with(&provider, ResilienceConfig::default());

    let companies = service.search("Apple").await;

    assert_eq!(
        companies,
        [CompanyInfo::new("Apple", "Apple Corp LLC", "NASDAQ")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_search_has_no_timeout_by_default() {
    let provider = MockProvider::new();
    provider.add_company("AAPL", "Apple Inc.");
    provider.set_delay(Duration::from_secs(30));
    let service = service_with(&provider, ResilienceConfig::default());

    let companies = service.search("Apple").await;

    assert_eq!(companies[0].symbol, "AAPL");
    assert_eq!(
        service.breaker().state(OperationKind::CompanySearch),
        CircuitState::Closed
    );
}

#[tokio::test]
async fn test_circuits_are_independent_per_operation() {
    let provider = MockProvider::new();
    provider.set_failing(true);
    let service = service_with(&provider, config(1, Duration::from_secs(60)));

    service.resolve("AAPL").await.unwrap();
    assert_eq!(
        service.breaker().state(OperationKind::SingleQuote),
        CircuitState::Open
    );

    provider.set_failing(false);
    provider.add_company("AAPL", "Apple Inc.");
    provider.add_quote("AAPL", 1.0, 1);

    assert_eq!(service.search("Apple").await[0].name, "Apple Inc.");
    assert_eq!(
        service.resolve_batch(&symbols(&["AAPL", "X"])).await[0].last_price,
        dec!(1)
    );
    assert_eq!(provider.search_calls.load(Ordering::SeqCst), 1);
}

// =========================================================================
// Dispatch
// =========================================================================

#[tokio::test]
async fn test_get_quotes_dispatches_by_count() {
    let provider = MockProvider::new();
    provider.add_quote("A", 1.0, 10);
    let service = service_with(&provider, ResilienceConfig::default());

    assert!(service.get_quotes(&[]).await.unwrap().is_empty());
    assert_eq!(provider.total_calls(), 0);

    let single = service.get_quotes(&symbols(&["A"])).await.unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(provider.single_calls.load(Ordering::SeqCst), 1);

    let many = service.get_quotes(&symbols(&["A", "B"])).await.unwrap();
    assert_eq!(many.len(), 2);
    assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 1);

    let missing = service.get_quotes(&symbols(&["B"])).await;
    assert!(matches!(missing, Err(MarketDataError::SymbolNotFound(_))));
}
