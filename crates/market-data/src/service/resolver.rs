//! Single quote resolution.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::MarketDataError;
use crate::fallback;
use crate::mapper;
use crate::models::Quote;
use crate::provider::MarketDataProvider;
use crate::resilience::{execute_guarded, CircuitBreaker, OperationKind};

/// Ordinal used when synthesizing a fallback for a lone symbol.
const SINGLE_FALLBACK_ORDINAL: u32 = 1;

/// Resolves one symbol through the single-quote circuit.
pub struct QuoteResolver {
    provider: Arc<dyn MarketDataProvider>,
    breaker: Arc<CircuitBreaker>,
    timeout: Option<Duration>,
}

impl QuoteResolver {
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

    /// Resolve the latest quote for `symbol`.
    ///
    /// Fails only with [`MarketDataError::SymbolNotFound`], when the upstream
    /// answered but had no usable record. An open circuit, a transport error,
    /// or a timeout yields a synthetic quote instead.
    pub async fn resolve(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        debug!("Resolving quote for: {}", symbol);

        let call = async {
            let record = self.provider.get_quote(symbol).await?;
            record
                .as_ref()
                .and_then(mapper::map_quote)
                .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))
        };

        match execute_guarded(&self.breaker, OperationKind::SingleQuote, self.timeout, call).await
        {
            Ok(quote) => {
                debug!("Resolved quote: {:?}", quote);
                Ok(quote)
            }
            Err(e) if e.is_upstream_unavailable() => {
                warn!(
                    "Upstream unavailable for '{}' ({}), returning fallback quote",
                    symbol, e
                );
                Ok(fallback::synthesize(SINGLE_FALLBACK_ORDINAL, symbol))
            }
            Err(e) => Err(e),
        }
    }
}
