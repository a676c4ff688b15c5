//! Resilience primitives wrapped around every upstream call.
//!
//! - Circuit breaking per operation kind
//! - Breaker-gated execution with per-call timeouts
//! - Resilience configuration

mod circuit_breaker;
mod config;
mod guard;

pub use circuit_breaker::{
    Admission, CallOutcome, CircuitBreaker, CircuitBreakerConfig, CircuitMetrics, CircuitState,
    OperationKind,
};
pub use config::ResilienceConfig;
pub use guard::execute_guarded;
