//! Market data provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{BatchUpstreamResponse, UpstreamCompany, UpstreamQuote};

/// Upstream market data provider.
///
/// Implementations are long-lived, shared, and stateless: one instance is
/// wrapped in an `Arc` and injected into every component that calls upstream.
/// Errors returned here are transport or protocol failures; an unknown symbol
/// is reported as `Ok(None)` or as an absent batch key instead.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use quotes_market_data::provider::MarketDataProvider;
///
/// struct StaticProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for StaticProvider {
///     fn id(&self) -> &'static str {
///         "STATIC"
///     }
///
///     // ... implement the three lookups
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs and errors.
    fn id(&self) -> &'static str;

    /// Fetch the record for one symbol.
    ///
    /// Returns `Ok(None)` when the provider does not know the symbol.
    async fn get_quote(&self, symbol: &str) -> Result<Option<UpstreamQuote>, MarketDataError>;

    /// Fetch records for several symbols in one call.
    ///
    /// Symbols the provider cannot resolve are absent from the response.
    async fn get_quotes(&self, symbols: &[String])
        -> Result<BatchUpstreamResponse, MarketDataError>;

    /// Search companies by name or symbol, in provider order.
    async fn search_companies(&self, name: &str)
        -> Result<Vec<UpstreamCompany>, MarketDataError>;
}
