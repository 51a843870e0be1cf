//! Balance transaction engine.
//!
//! Every operation reads, checks and mutates inside one serializable store
//! transaction. Store contention is retried transparently with a bounded
//! number of attempts; everything else surfaces as a typed [`LedgerError`].
//!
//! [`LedgerError`]: crate::ledger::LedgerError

mod actor;
mod outcome;
mod retry;
mod service;

#[cfg(test)]
mod service_props;

pub use actor::Actor;
pub use outcome::{
    AdjustmentOutcome, CheckInOutcome, CheckInStatus, CreditOutcome, DownloadOutcome,
    Reconciliation, RevocationOutcome, UnlockOutcome,
};
pub use retry::RetryPolicy;
pub use service::{BalanceEngine, MAX_REASON_CHARS};
