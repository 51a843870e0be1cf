//! Transaction seam between the balance engine and persistence.
//!
//! A [`LedgerTransaction`] is one serializable unit of work: every read it
//! makes and every write it buffers either commits together or not at all.
//! When the store detects that a concurrent transaction invalidated what
//! this one read, `commit` (or any earlier call) fails with
//! [`StoreError::Conflict`] and the engine runs the whole operation again.

mod memory;

pub use memory::InMemoryLedgerStore;

use async_trait::async_trait;
use inkwell_shared::types::{ContentId, ExternalEventId, PageRequest, UserId};
use thiserror::Error;

use crate::account::AccountRecord;
use crate::catalog::ContentItem;
use crate::idempotency::IdempotencyLock;
use crate::ledger::{LedgerEntry, LedgerError};

/// Errors raised by a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Serialization failure, deadlock or lost race on a unique key.
    #[error("Transaction conflict: {0}")]
    Conflict(String),

    /// Any other backend failure.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true if running the transaction again may succeed.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

/// Factory for transactions plus non-transactional reads.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Starts a serializable transaction.
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, StoreError>;

    /// Lists a user's entries, newest first, with the total count.
    async fn list_entries(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<(Vec<LedgerEntry>, u64), StoreError>;
}

/// One serializable unit of work.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Reads an account.
    async fn load_account(&mut self, user_id: UserId) -> Result<Option<AccountRecord>, StoreError>;

    /// Reads a catalog item.
    async fn load_content(
        &mut self,
        content_id: &ContentId,
    ) -> Result<Option<ContentItem>, StoreError>;

    /// Reads the lock of an external event.
    async fn find_idempotency_lock(
        &mut self,
        event_id: &ExternalEventId,
    ) -> Result<Option<IdempotencyLock>, StoreError>;

    /// Sums the amounts of a user's entries.
    async fn sum_entries(&mut self, user_id: UserId) -> Result<i64, StoreError>;

    /// Creates an account that must not exist yet.
    async fn insert_account(&mut self, account: &AccountRecord) -> Result<(), StoreError>;

    /// Overwrites an existing account.
    async fn save_account(&mut self, account: &AccountRecord) -> Result<(), StoreError>;

    /// Appends a ledger entry.
    async fn append_entry(&mut self, entry: &LedgerEntry) -> Result<(), StoreError>;

    /// Tallies an unlock of a catalog item against its already appended
    /// ledger entry.
    ///
    /// Must not write state shared with other accounts, so unlocks by
    /// different users never conflict.
    async fn record_unlock(
        &mut self,
        content_id: &ContentId,
        entry: &LedgerEntry,
    ) -> Result<(), StoreError>;

    /// Creates the lock of an external event; fails if it already exists.
    async fn insert_idempotency_lock(&mut self, lock: &IdempotencyLock) -> Result<(), StoreError>;

    /// Makes every buffered write visible.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discards every buffered write.
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
