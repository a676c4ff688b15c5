//! Breaker-gated execution of a single upstream call.

use std::future::Future;
use std::time::Duration;

use log::debug;

use super::{CallOutcome, CircuitBreaker, OperationKind};
use crate::errors::MarketDataError;

/// Run `call` through the breaker for `kind`, enforcing `timeout` if set.
///
/// - Denied by the breaker: returns [`MarketDataError::CircuitOpen`] without
///   polling `call`.
/// - Timed out: records [`CallOutcome::Timeout`] and returns
///   [`MarketDataError::Timeout`].
/// - Completed: records a failure for errors that mean the upstream is
///   unavailable, a success otherwise, and returns the call's result.
///
/// No breaker lock is held while `call` runs.
pub async fn execute_guarded<T, F>(
    breaker: &CircuitBreaker,
    kind: OperationKind,
    timeout: Option<Duration>,
    call: F,
) -> Result<T, MarketDataError>
where
    F: Future<Output = Result<T, MarketDataError>>,
{
    let Some(admission) = breaker.should_execute(kind) else {
        debug!("Circuit open for '{}', skipping upstream call", kind);
        return Err(MarketDataError::CircuitOpen {
            operation: kind.to_string(),
        });
    };

    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => {
                breaker.record_outcome(admission, CallOutcome::Timeout);
                return Err(MarketDataError::Timeout {
                    operation: kind.to_string(),
                });
            }
        },
        None => call.await,
    };

    let outcome = match &result {
        Err(e) if e.is_upstream_unavailable() => CallOutcome::Failure,
        _ => CallOutcome::Success,
    };
    breaker.record_outcome(admission, outcome);

    result
}
