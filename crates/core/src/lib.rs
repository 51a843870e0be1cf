//! Core ledger logic for Inkwell.
//!
//! This crate contains the balance engine and its domain model with ZERO web
//! or database dependencies. Persistence is reached through the store traits
//! in [`store`]; an in-process implementation lives next to them.
//!
//! # Modules
//!
//! - `account` - Per-user wallet record (balance, entitlements, streak, status)
//! - `catalog` - Read-only view of priced content items
//! - `ledger` - Immutable ledger entries and the ledger error taxonomy
//! - `idempotency` - Dedup records for external events
//! - `streak` - Business-timezone day boundaries and the check-in streak rule
//! - `store` - Serializable transaction seam and the in-memory store
//! - `engine` - The balance transaction engine
//! - `payment` - Gateway seam and price table verification
//! - `time` - Injectable wall clock

pub mod account;
pub mod catalog;
pub mod engine;
pub mod idempotency;
pub mod ledger;
pub mod payment;
pub mod store;
pub mod streak;
pub mod time;

pub use account::{AccountRecord, AccountStatus};
pub use catalog::ContentItem;
pub use engine::{
    Actor, AdjustmentOutcome, BalanceEngine, CheckInOutcome, CheckInStatus, CreditOutcome,
    DownloadOutcome, Reconciliation, RetryPolicy, RevocationOutcome, UnlockOutcome,
};
pub use idempotency::IdempotencyLock;
pub use ledger::{LedgerEntry, LedgerEntryKind, LedgerError};
pub use payment::{
    CaptureResult, CaptureStatus, GatewayError, PaymentGateway, PriceTable, is_plain_order_id,
};
pub use store::{InMemoryLedgerStore, LedgerStore, LedgerTransaction, StoreError};
pub use streak::{DayWindow, StreakClock};
pub use time::{Clock, ManualClock, SystemClock};
