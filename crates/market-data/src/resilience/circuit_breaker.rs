//! Per-operation circuit breaker for fault tolerance.
//!
//! Implements the circuit breaker pattern to stop calling an upstream that is
//! failing. Each [`OperationKind`] has its own independent circuit:
//!
//! - **Closed**: Normal operation. Outcomes are counted in a rolling window and
//!   the circuit trips once the error rate reaches the configured threshold.
//! - **Open**: Calls are denied until the sleep window elapses.
//! - **HalfOpen**: A single trial call is admitted. Its outcome alone decides
//!   whether the circuit closes again or reopens.
//!
//! Every allowed call carries an [`Admission`] back to
//! [`CircuitBreaker::record_outcome`], so a late outcome from a call admitted
//! before the trip cannot decide a HalfOpen trial.
//!
//! The circuit breaker is in-memory and resets on application restart. Locks
//! are held only while deciding or recording, never across an upstream call.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;

/// Default minimum number of calls in the window before the error rate is evaluated.
const DEFAULT_REQUEST_VOLUME_THRESHOLD: u32 = 20;

/// Default error percentage at which the circuit trips.
const DEFAULT_ERROR_THRESHOLD_PERCENTAGE: u8 = 50;

/// Default length of the rolling statistics window.
const DEFAULT_ROLLING_WINDOW: Duration = Duration::from_secs(10);

/// Default cool-down before an open circuit admits a trial call.
const DEFAULT_SLEEP_WINDOW: Duration = Duration::from_secs(5);

/// Number of buckets the rolling window is divided into.
const WINDOW_BUCKETS: u32 = 10;

/// Upstream operation guarded by its own circuit.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    SingleQuote,
    BatchQuote,
    CompanySearch,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::SingleQuote,
        OperationKind::BatchQuote,
        OperationKind::CompanySearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleQuote => "single_quote",
            Self::BatchQuote => "batch_quote",
            Self::CompanySearch => "company_search",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::SingleQuote => 0,
            Self::BatchQuote => 1,
            Self::CompanySearch => 2,
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Circuit breaker state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation - requests are allowed.
    Closed,
    /// Upstream is failing - requests are denied.
    Open,
    /// Testing recovery - a single trial request is allowed.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "CLOSED"),
            Self::Open => write!(f, "OPEN"),
            Self::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Outcome of a guarded call, reported back to the breaker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallOutcome {
    Success,
    Failure,
    /// Accounted exactly like [`CallOutcome::Failure`].
    Timeout,
}

impl CallOutcome {
    fn is_failure(self) -> bool {
        !matches!(self, Self::Success)
    }
}

/// Permission for one upstream call, returned by
/// [`CircuitBreaker::should_execute`] and handed back with the call's outcome.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[must_use = "an admission must be reported back through record_outcome"]
pub struct Admission {
    kind: OperationKind,
    /// Set for HalfOpen trial calls.
    trial: Option<u64>,
}

impl Admission {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn is_trial(&self) -> bool {
        self.trial.is_some()
    }
}

/// Circuit breaker configuration.
#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Minimum calls in the rolling window before the error rate can trip the circuit.
    pub request_volume_threshold: u32,
    /// Error percentage (0-100) at or above which the circuit trips.
    pub error_threshold_percentage: u8,
    /// Length of the rolling statistics window.
    pub rolling_window: Duration,
    /// Time an open circuit waits before admitting a trial call.
    pub sleep_window: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            request_volume_threshold: DEFAULT_REQUEST_VOLUME_THRESHOLD,
            error_threshold_percentage: DEFAULT_ERROR_THRESHOLD_PERCENTAGE,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            sleep_window: DEFAULT_SLEEP_WINDOW,
        }
    }
}

impl CircuitBreakerConfig {
    fn bucket_width(&self) -> Duration {
        (self.rolling_window / WINDOW_BUCKETS).max(Duration::from_millis(1))
    }
}

#[derive(Debug)]
struct Bucket {
    started: Instant,
    calls: u32,
    failures: u32,
}

/// Internal state for a single operation kind.
#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    /// Rolling outcome counts, oldest bucket first.
    window: VecDeque<Bucket>,
    /// When the circuit last tripped.
    opened_at: Option<Instant>,
    /// When the in-flight HalfOpen trial was admitted.
    trial_started: Option<Instant>,
    /// Id of the most recently admitted trial.
    trial_id: u64,
}

impl Circuit {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            window: VecDeque::new(),
            opened_at: None,
            trial_started: None,
            trial_id: 0,
        }
    }

    fn admit_trial(&mut self, now: Instant) -> u64 {
        self.trial_id = self.trial_id.wrapping_add(1);
        self.trial_started = Some(now);
        self.trial_id
    }

    fn prune(&mut self, now: Instant, rolling_window: Duration) {
        while self
            .window
            .front()
            .is_some_and(|bucket| now.duration_since(bucket.started) >= rolling_window)
        {
            self.window.pop_front();
        }
    }

    fn record(&mut self, now: Instant, failed: bool, config: &CircuitBreakerConfig) {
        self.prune(now, config.rolling_window);

        let needs_bucket = self
            .window
            .back()
            .map_or(true, |bucket| now.duration_since(bucket.started) >= config.bucket_width());
        if needs_bucket {
            self.window.push_back(Bucket {
                started: now,
                calls: 0,
                failures: 0,
            });
        }

        if let Some(bucket) = self.window.back_mut() {
            bucket.calls = bucket.calls.saturating_add(1);
            if failed {
                bucket.failures = bucket.failures.saturating_add(1);
            }
        }
    }

    fn totals(&self) -> (u32, u32) {
        self.window.iter().fold((0, 0), |(calls, failures), bucket| {
            (
                calls.saturating_add(bucket.calls),
                failures.saturating_add(bucket.failures),
            )
        })
    }

    fn should_trip(&self, config: &CircuitBreakerConfig) -> bool {
        let (calls, failures) = self.totals();
        calls > 0
            && calls >= config.request_volume_threshold
            && u64::from(failures) * 100
                >= u64::from(calls) * u64::from(config.error_threshold_percentage)
    }

    fn trip(&mut self, now: Instant) {
        self.state = CircuitState::Open;
        self.opened_at = Some(now);
        self.trial_started = None;
    }

    fn close(&mut self) {
        self.state = CircuitState::Closed;
        self.window.clear();
        self.opened_at = None;
        self.trial_started = None;
    }
}

/// Per-operation circuit breaker.
///
/// One circuit per [`OperationKind`] is created up front; a trip on one kind
/// never denies the others. Callers only see allow/deny decisions and report
/// outcomes back, the window state stays private.
pub struct CircuitBreaker {
    circuits: [Mutex<Circuit>; 3],
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with default settings.
    pub fn new() -> Self {
        Self::with_config(CircuitBreakerConfig::default())
    }

    /// Create a circuit breaker with custom configuration.
    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: [
                Mutex::new(Circuit::new()),
                Mutex::new(Circuit::new()),
                Mutex::new(Circuit::new()),
            ],
            config,
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Lock one circuit, recovering from poison if necessary.
    ///
    /// Breaker operations must never panic; a poisoned circuit only means a
    /// slightly stale window.
    fn lock_circuit(&self, kind: OperationKind) -> MutexGuard<'_, Circuit> {
        self.circuits[kind.index()].lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex for '{}' was poisoned, recovering", kind);
            poisoned.into_inner()
        })
    }

    /// Decide whether a call of this kind may reach the upstream.
    ///
    /// Returns `None` when the call is denied. Handles the Open -> HalfOpen
    /// transition once the sleep window has elapsed, admitting exactly one
    /// trial call.
    pub fn should_execute(&self, kind: OperationKind) -> Option<Admission> {
        let mut circuit = self.lock_circuit(kind);
        let now = Instant::now();

        match circuit.state {
            CircuitState::Closed => Some(Admission { kind, trial: None }),
            CircuitState::Open => {
                let cooled_down = circuit
                    .opened_at
                    .map_or(true, |opened| now.duration_since(opened) >= self.config.sleep_window);
                if cooled_down {
                    info!(
                        "Circuit breaker: transitioning '{}' from Open to HalfOpen",
                        kind
                    );
                    circuit.state = CircuitState::HalfOpen;
                    let trial = circuit.admit_trial(now);
                    Some(Admission {
                        kind,
                        trial: Some(trial),
                    })
                } else {
                    None
                }
            }
            CircuitState::HalfOpen => {
                // A trial whose outcome never arrived is abandoned after another sleep window.
                let trial_pending = circuit
                    .trial_started
                    .is_some_and(|started| now.duration_since(started) < self.config.sleep_window);
                if trial_pending {
                    None
                } else {
                    debug!("Circuit breaker: admitting new trial call for '{}'", kind);
                    let trial = circuit.admit_trial(now);
                    Some(Admission {
                        kind,
                        trial: Some(trial),
                    })
                }
            }
        }
    }

    /// Record the outcome of a call that was allowed through.
    ///
    /// While HalfOpen only the current trial's outcome is applied.
    pub fn record_outcome(&self, admission: Admission, outcome: CallOutcome) {
        let kind = admission.kind;
        let mut circuit = self.lock_circuit(kind);
        let now = Instant::now();
        let failed = outcome.is_failure();

        match circuit.state {
            CircuitState::Closed => {
                circuit.record(now, failed, &self.config);
                if failed && circuit.should_trip(&self.config) {
                    let (calls, failures) = circuit.totals();
                    info!(
                        "Circuit breaker: opening circuit for '{}' after {}/{} failed calls",
                        kind, failures, calls
                    );
                    circuit.trip(now);
                } else if failed {
                    debug!("Circuit breaker: {:?} recorded for '{}'", outcome, kind);
                }
            }
            CircuitState::HalfOpen if admission.trial != Some(circuit.trial_id) => {
                debug!(
                    "Circuit breaker: ignoring {:?} for '{}' (not the current trial)",
                    outcome, kind
                );
            }
            CircuitState::HalfOpen => {
                if failed {
                    info!(
                        "Circuit breaker: reopening circuit for '{}' after {:?} in HalfOpen",
                        kind, outcome
                    );
                    circuit.trip(now);
                } else {
                    info!(
                        "Circuit breaker: closing circuit for '{}' after successful trial",
                        kind
                    );
                    circuit.close();
                }
            }
            CircuitState::Open => {
                // Late outcome from a call admitted before the trip
                debug!(
                    "Circuit breaker: ignoring {:?} for '{}' (already open)",
                    outcome, kind
                );
            }
        }
    }

    /// Get the current state for an operation kind.
    pub fn state(&self, kind: OperationKind) -> CircuitState {
        self.lock_circuit(kind).state
    }

    /// Reset one circuit to Closed with an empty window.
    pub fn reset(&self, kind: OperationKind) {
        info!("Circuit breaker: manually resetting circuit for '{}'", kind);
        self.lock_circuit(kind).close();
    }

    /// Reset all circuits to their initial state.
    pub fn reset_all(&self) {
        for kind in OperationKind::ALL {
            self.lock_circuit(kind).close();
        }
        info!("Circuit breaker: all circuits reset");
    }

    /// Snapshot of every circuit.
    pub fn metrics(&self) -> Vec<CircuitMetrics> {
        let now = Instant::now();

        OperationKind::ALL
            .iter()
            .map(|&kind| {
                let mut circuit = self.lock_circuit(kind);
                circuit.prune(now, self.config.rolling_window);
                let (calls, failures) = circuit.totals();
                CircuitMetrics {
                    operation: kind,
                    state: circuit.state,
                    calls_in_window: calls,
                    failures_in_window: failures,
                    open_for_ms: circuit
                        .opened_at
                        .map(|opened| {
                            u64::try_from(now.duration_since(opened).as_millis())
                                .unwrap_or(u64::MAX)
                        }),
                }
            })
            .collect()
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics for a single circuit.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitMetrics {
    pub operation: OperationKind,
    pub state: CircuitState,
    /// Calls recorded in the current rolling window.
    pub calls_in_window: u32,
    /// Failures and timeouts recorded in the current rolling window.
    pub failures_in_window: u32,
    /// Milliseconds since the circuit last tripped, while not closed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_for_ms: Option<u64>,
}
