use std::time::Duration;

use super::{CircuitBreakerConfig, OperationKind};

/// Default execution timeout for single and batch quote calls.
const DEFAULT_QUOTE_TIMEOUT: Duration = Duration::from_secs(1);

/// Breaker thresholds and per-operation execution timeouts.
#[derive(Clone, Debug)]
pub struct ResilienceConfig {
    pub breaker: CircuitBreakerConfig,
    /// Timeout for single-quote calls; `None` disables it.
    pub quote_timeout: Option<Duration>,
    /// Timeout for batch-quote calls; `None` disables it.
    pub batch_timeout: Option<Duration>,
    /// Timeout for company searches; disabled by default.
    pub search_timeout: Option<Duration>,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            breaker: CircuitBreakerConfig::default(),
            quote_timeout: Some(DEFAULT_QUOTE_TIMEOUT),
            batch_timeout: Some(DEFAULT_QUOTE_TIMEOUT),
            search_timeout: None,
        }
    }
}

impl ResilienceConfig {
    /// Execution timeout applied to calls of `kind`.
    pub fn timeout_for(&self, kind: OperationKind) -> Option<Duration> {
        match kind {
            OperationKind::SingleQuote => self.quote_timeout,
            OperationKind::BatchQuote => self.batch_timeout,
            OperationKind::CompanySearch => self.search_timeout,
        }
    }
}
