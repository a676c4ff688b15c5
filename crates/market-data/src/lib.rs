//! Quotes Market Data Crate
//!
//! A resilient facade over an external market data provider. Resolves single
//! quotes, batches of quotes, and company searches while shielding callers
//! from upstream latency and partial failure.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   QuoteService   |  (resolver / batch aggregator / company search)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | Circuit Breaker  |  (one circuit per operation kind, call timeouts)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |    Provider      | --> |     Mapper       |  (upstream record -> Quote)
//! +------------------+     +------------------+
//!          |
//!          | unavailable
//!          v
//! +------------------+
//! |    Fallback      |  (deterministic synthetic data)
//! +------------------+
//! ```
//!
//! # Error Policy
//!
//! Only a genuine not-found on a single-symbol lookup is returned as an error.
//! An open circuit, a transport failure, or a timeout is absorbed and answered
//! with synthetic data carrying a `SUCCESS` status.

pub mod errors;
pub mod fallback;
pub mod mapper;
pub mod models;
pub mod provider;
pub mod resilience;
pub mod service;

pub use errors::MarketDataError;

pub use models::{
    BatchUpstreamResponse, CompanyInfo, Quote, QuoteStatus, UpstreamCompany, UpstreamQuote,
};

pub use provider::{IexEndpoints, IexProvider, MarketDataProvider};

pub use resilience::{
    Admission, CallOutcome, CircuitBreaker, CircuitBreakerConfig, CircuitMetrics, CircuitState,
    OperationKind, ResilienceConfig,
};

pub use service::{BatchQuoteAggregator, CompanySearch, QuoteResolver, QuoteService};
