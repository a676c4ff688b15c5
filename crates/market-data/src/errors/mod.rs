//! Error types for the market data crate.
//!
//! Only [`MarketDataError::SymbolNotFound`] ever reaches callers of the quote
//! service. Every other variant describes an unavailable upstream and is
//! absorbed by the service into fallback data.

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider was reachable but returned no usable record for the symbol.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The upstream call did not complete within the configured execution timeout.
    #[error("Timeout: {operation}")]
    Timeout {
        /// The operation kind that timed out
        operation: String,
    },

    /// The provider answered with an error status or an unreadable body.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The circuit breaker denied the call.
    #[error("Circuit open: {operation}")]
    CircuitOpen {
        /// The operation kind whose circuit is open
        operation: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Whether this error means the upstream could not be used at all.
    ///
    /// These errors count as breaker failures and trigger fallback synthesis.
    /// A not-found answer comes from a healthy upstream and does neither.
    pub fn is_upstream_unavailable(&self) -> bool {
        !matches!(self, Self::SymbolNotFound(_))
    }
}
