//! Metrics collection for engine operations

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the engine and the session sweeper
///
/// Lock-free so concurrent asks never contend on them.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    asks: AtomicU64,
    answered: AtomicU64,
    refused: AtomicU64,
    invalid_inputs: AtomicU64,
    timeouts: AtomicU64,
    backend_failures: AtomicU64,
    grounding_violations: AtomicU64,
    sessions_created: AtomicU64,
    sessions_expired: AtomicU64,
}

/// Point-in-time copy of [`EngineMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Calls to `ask`
    pub asks: u64,
    /// Non-refused answers
    pub answered: u64,
    /// Refused answers, for any reason
    pub refused: u64,
    /// Asks rejected by input validation
    pub invalid_inputs: u64,
    /// Asks that hit the total deadline
    pub timeouts: u64,
    /// Compositions that ended in a backend failure
    pub backend_failures: u64,
    /// Replies with citations outside their context
    pub grounding_violations: u64,
    /// Sessions created
    pub sessions_created: u64,
    /// Sessions expired or swept
    pub sessions_expired: u64,
}

fn bump(counter: &AtomicU64, n: u64) {
    counter.fetch_add(n, Ordering::Relaxed);
}

impl EngineMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call to `ask`
    pub fn record_ask(&self) {
        bump(&self.asks, 1);
    }

    /// Record the answer returned to the caller
    pub fn record_answer(&self, refused: bool) {
        if refused {
            bump(&self.refused, 1);
        } else {
            bump(&self.answered, 1);
        }
    }

    /// Record a validation rejection
    pub fn record_invalid_input(&self) {
        bump(&self.invalid_inputs, 1);
    }

    /// Record an ask that ran out of time
    pub fn record_timeout(&self) {
        bump(&self.timeouts, 1);
    }

    /// Record a backend failure
    pub fn record_backend_failure(&self) {
        bump(&self.backend_failures, 1);
    }

    /// Record a grounding violation
    pub fn record_grounding_violation(&self) {
        bump(&self.grounding_violations, 1);
    }

    /// Record a new session
    pub fn record_session_created(&self) {
        bump(&self.sessions_created, 1);
    }

    /// Record expired sessions
    pub fn record_sessions_expired(&self, count: usize) {
        bump(&self.sessions_expired, count as u64);
    }

    /// Copy the current counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            asks: get(&self.asks),
            answered: get(&self.answered),
            refused: get(&self.refused),
            invalid_inputs: get(&self.invalid_inputs),
            timeouts: get(&self.timeouts),
            backend_failures: get(&self.backend_failures),
            grounding_violations: get(&self.grounding_violations),
            sessions_created: get(&self.sessions_created),
            sessions_expired: get(&self.sessions_expired),
        }
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let s = self.snapshot();
        [
            "Engine Metrics Summary".to_string(),
            "======================".to_string(),
            format!("Asks: {}", s.asks),
            format!("  Answered: {}", s.answered),
            format!("  Refused: {}", s.refused),
            format!("  Invalid input: {}", s.invalid_inputs),
            format!("Timeouts: {}", s.timeouts),
            format!("Backend failures: {}", s.backend_failures),
            format!("Grounding violations: {}", s.grounding_violations),
            format!("Sessions created: {}", s.sessions_created),
            format!("Sessions expired: {}", s.sessions_expired),
        ]
        .join("\n")
    }
}
