//! Bounded retries for contended transactions.

use std::time::Duration;

use inkwell_shared::config::LedgerConfig;

use crate::ledger::LedgerError;
use crate::store::StoreError;

/// How often, and how patiently, a conflicting transaction is re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_millis(10),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is raised to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Creates the policy described by the ledger configuration.
    #[must_use]
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }

    /// Attempts including the first, at least 1.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Base delay; attempt `n` waits `n * backoff` before the next try.
    #[must_use]
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Delay after the given failed attempt (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

/// Outcome of one failed attempt.
#[derive(Debug)]
pub(crate) enum AttemptError {
    /// The store lost a race; run the operation again.
    Conflict(String),
    /// A business or infrastructure failure; stop.
    Fatal(LedgerError),
}

impl From<LedgerError> for AttemptError {
    fn from(err: LedgerError) -> Self {
        Self::Fatal(err)
    }
}

impl From<StoreError> for AttemptError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(reason) => Self::Conflict(reason),
            StoreError::Backend(_) => Self::Fatal(err.into()),
        }
    }
}
