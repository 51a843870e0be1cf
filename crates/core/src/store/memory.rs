//! In-process optimistic store.
//!
//! Each account, idempotency lock and per-user ledger carries a version.
//! A transaction remembers the version of every key it read (absent keys
//! read as version 0) and buffers its writes. Commit takes the state lock,
//! fails with a conflict if any remembered version moved, and otherwise
//! applies the writes and bumps versions. Ledger appends and content
//! counters never invalidate other writers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use inkwell_shared::types::{ContentId, ExternalEventId, PageRequest, UserId};
use parking_lot::Mutex;
use tracing::debug;

use super::{LedgerStore, LedgerTransaction, StoreError};
use crate::account::AccountRecord;
use crate::catalog::ContentItem;
use crate::idempotency::IdempotencyLock;
use crate::ledger::{LedgerEntry, ledger_total};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ReadKey {
    Account(UserId),
    Lock(ExternalEventId),
    Ledger(UserId),
}

#[derive(Debug, Clone)]
struct Versioned<T> {
    value: T,
    version: u64,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<UserId, Versioned<AccountRecord>>,
    locks: HashMap<ExternalEventId, Versioned<IdempotencyLock>>,
    entries: Vec<LedgerEntry>,
    ledger_versions: HashMap<UserId, u64>,
    last_version: u64,
}

impl State {
    fn version_of(&self, key: &ReadKey) -> u64 {
        match key {
            ReadKey::Account(id) => self.accounts.get(id).map_or(0, |a| a.version),
            ReadKey::Lock(id) => self.locks.get(id).map_or(0, |l| l.version),
            ReadKey::Ledger(id) => self.ledger_versions.get(id).copied().unwrap_or(0),
        }
    }

    fn bump(&mut self) -> u64 {
        self.last_version += 1;
        self.last_version
    }
}

#[derive(Debug)]
struct ContentRow {
    item: ContentItem,
    unlock_count: u64,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    contents: DashMap<ContentId, ContentRow>,
    injected_conflicts: AtomicU32,
}

/// Ledger store kept entirely in process memory.
///
/// Cloning is cheap and every clone sees the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    shared: Arc<Shared>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a catalog item, keeping its unlock counter.
    pub fn put_content(&self, item: ContentItem) {
        self.shared
            .contents
            .entry(item.id.clone())
            .and_modify(|row| row.item = item.clone())
            .or_insert(ContentRow {
                item,
                unlock_count: 0,
            });
    }

    /// Returns how many times a catalog item was unlocked.
    #[must_use]
    pub fn unlock_count(&self, content_id: &ContentId) -> Option<u64> {
        self.shared
            .contents
            .get(content_id)
            .map(|row| row.unlock_count)
    }

    /// Makes the next `n` commits fail with a conflict.
    pub fn inject_commit_conflicts(&self, n: u32) {
        self.shared.injected_conflicts.store(n, Ordering::SeqCst);
    }

    /// Returns every committed entry of a user in append order.
    #[must_use]
    pub fn entries_for(&self, user_id: UserId) -> Vec<LedgerEntry> {
        self.shared
            .state
            .lock()
            .entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }

    fn take_injected_conflict(&self) -> bool {
        self.shared
            .injected_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, StoreError> {
        Ok(Box::new(MemoryTransaction {
            store: self.clone(),
            reads: HashMap::new(),
            accounts: HashMap::new(),
            inserted_accounts: Vec::new(),
            locks: HashMap::new(),
            entries: Vec::new(),
            unlocks: Vec::new(),
        }))
    }

    async fn list_entries(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<(Vec<LedgerEntry>, u64), StoreError> {
        let page = page.normalized();
        let mut entries = self.entries_for(user_id);
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = u64::try_from(entries.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let data = entries.into_iter().skip(offset).take(limit).collect();
        Ok((data, total))
    }
}

struct MemoryTransaction {
    store: InMemoryLedgerStore,
    reads: HashMap<ReadKey, u64>,
    accounts: HashMap<UserId, AccountRecord>,
    inserted_accounts: Vec<UserId>,
    locks: HashMap<ExternalEventId, IdempotencyLock>,
    entries: Vec<LedgerEntry>,
    unlocks: Vec<ContentId>,
}

impl MemoryTransaction {
    /// Remembers the first version seen for a key.
    fn record_read(&mut self, key: ReadKey, version: u64) {
        self.reads.entry(key).or_insert(version);
    }
}

#[async_trait]
impl LedgerTransaction for MemoryTransaction {
    async fn load_account(&mut self, user_id: UserId) -> Result<Option<AccountRecord>, StoreError> {
        if let Some(account) = self.accounts.get(&user_id) {
            return Ok(Some(account.clone()));
        }
        let (account, version) = {
            let state = self.store.shared.state.lock();
            state
                .accounts
                .get(&user_id)
                .map_or((None, 0), |a| (Some(a.value.clone()), a.version))
        };
        self.record_read(ReadKey::Account(user_id), version);
        Ok(account)
    }

    async fn load_content(
        &mut self,
        content_id: &ContentId,
    ) -> Result<Option<ContentItem>, StoreError> {
        Ok(self
            .store
            .shared
            .contents
            .get(content_id)
            .map(|row| row.item.clone()))
    }

    async fn find_idempotency_lock(
        &mut self,
        event_id: &ExternalEventId,
    ) -> Result<Option<IdempotencyLock>, StoreError> {
        if let Some(lock) = self.locks.get(event_id) {
            return Ok(Some(lock.clone()));
        }
        let (lock, version) = {
            let state = self.store.shared.state.lock();
            state
                .locks
                .get(event_id)
                .map_or((None, 0), |l| (Some(l.value.clone()), l.version))
        };
        self.record_read(ReadKey::Lock(event_id.clone()), version);
        Ok(lock)
    }

    async fn sum_entries(&mut self, user_id: UserId) -> Result<i64, StoreError> {
        let (committed, version) = {
            let state = self.store.shared.state.lock();
            let sum = ledger_total(state.entries.iter().filter(|e| e.user_id == user_id));
            (sum, state.version_of(&ReadKey::Ledger(user_id)))
        };
        self.record_read(ReadKey::Ledger(user_id), version);
        let pending = ledger_total(self.entries.iter().filter(|e| e.user_id == user_id));
        committed
            .zip(pending)
            .and_then(|(committed, pending)| committed.checked_add(pending))
            .ok_or_else(|| StoreError::Backend(format!("ledger total overflow for {user_id}")))
    }

    async fn insert_account(&mut self, account: &AccountRecord) -> Result<(), StoreError> {
        if self.accounts.contains_key(&account.user_id) {
            return Err(StoreError::Conflict(format!(
                "account {} already exists",
                account.user_id
            )));
        }
        self.inserted_accounts.push(account.user_id);
        self.accounts.insert(account.user_id, account.clone());
        Ok(())
    }

    async fn save_account(&mut self, account: &AccountRecord) -> Result<(), StoreError> {
        self.accounts.insert(account.user_id, account.clone());
        Ok(())
    }

    async fn append_entry(&mut self, entry: &LedgerEntry) -> Result<(), StoreError> {
        self.entries.push(entry.clone());
        Ok(())
    }

    async fn record_unlock(
        &mut self,
        content_id: &ContentId,
        entry: &LedgerEntry,
    ) -> Result<(), StoreError> {
        if !self.entries.iter().any(|e| e.id == entry.id) {
            return Err(StoreError::Backend(format!(
                "unlock of {content_id} references unknown entry {}",
                entry.id
            )));
        }
        self.unlocks.push(content_id.clone());
        Ok(())
    }

    async fn insert_idempotency_lock(&mut self, lock: &IdempotencyLock) -> Result<(), StoreError> {
        if self.locks.contains_key(&lock.event_id) {
            return Err(StoreError::Conflict(format!(
                "idempotency lock {} already exists",
                lock.event_id
            )));
        }
        self.locks.insert(lock.event_id.clone(), lock.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        if this.store.take_injected_conflict() {
            return Err(StoreError::Conflict("injected conflict".to_string()));
        }

        let mut state = this.store.shared.state.lock();

        if let Some((key, _)) = this
            .reads
            .iter()
            .find(|(key, version)| state.version_of(key) != **version)
        {
            debug!(key = ?key, "Optimistic read invalidated at commit");
            return Err(StoreError::Conflict(format!("{key:?} changed concurrently")));
        }
        if let Some(id) = this
            .inserted_accounts
            .iter()
            .find(|id| state.accounts.contains_key(*id))
        {
            return Err(StoreError::Conflict(format!("account {id} already exists")));
        }
        if let Some(id) = this.locks.keys().find(|id| state.locks.contains_key(*id)) {
            return Err(StoreError::Conflict(format!(
                "idempotency lock {id} already exists"
            )));
        }
        if let Some(id) = this
            .accounts
            .keys()
            .find(|id| !this.inserted_accounts.contains(*id) && !state.accounts.contains_key(*id))
        {
            return Err(StoreError::Backend(format!("account {id} does not exist")));
        }

        for (user_id, account) in this.accounts {
            let version = state.bump();
            state.accounts.insert(
                user_id,
                Versioned {
                    value: account,
                    version,
                },
            );
        }
        for (event_id, lock) in this.locks {
            let version = state.bump();
            state.locks.insert(
                event_id,
                Versioned {
                    value: lock,
                    version,
                },
            );
        }
        for entry in this.entries {
            let version = state.bump();
            state.ledger_versions.insert(entry.user_id, version);
            state.entries.push(entry);
        }
        drop(state);

        for content_id in this.unlocks {
            if let Some(mut row) = this.store.shared.contents.get_mut(&content_id) {
                row.unlock_count += 1;
            }
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn open(store: &InMemoryLedgerStore, user_id: UserId) {
        let mut tx = store.begin().await.unwrap();
        assert!(tx.load_account(user_id).await.unwrap().is_none());
        tx.insert_account(&AccountRecord::open(user_id, Utc::now()))
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_commit_makes_writes_visible() {
        let store = InMemoryLedgerStore::new();
        let user_id = UserId::new();
        open(&store, user_id).await;

        let mut tx = store.begin().await.unwrap();
        let mut account = tx.load_account(user_id).await.unwrap().unwrap();
        account.balance = 150;
        tx.save_account(&account).await.unwrap();
        tx.append_entry(&LedgerEntry::purchase(user_id, 150, &"o-1".into(), Utc::now()))
            .await
            .unwrap();
        assert_eq!(tx.sum_entries(user_id).await.unwrap(), 150);
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.load_account(user_id).await.unwrap().unwrap().balance, 150);
        assert_eq!(tx.sum_entries(user_id).await.unwrap(), 150);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let store = InMemoryLedgerStore::new();
        let user_id = UserId::new();
        open(&store, user_id).await;

        let mut tx = store.begin().await.unwrap();
        tx.append_entry(&LedgerEntry::purchase(user_id, 10, &"o-1".into(), Utc::now()))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        assert!(store.entries_for(user_id).is_empty());
    }

    #[tokio::test]
    async fn test_stale_read_conflicts_at_commit() {
        let store = InMemoryLedgerStore::new();
        let user_id = UserId::new();
        open(&store, user_id).await;

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();

        let mut a = first.load_account(user_id).await.unwrap().unwrap();
        let mut b = second.load_account(user_id).await.unwrap().unwrap();
        a.balance = 10;
        b.balance = 20;
        first.save_account(&a).await.unwrap();
        second.save_account(&b).await.unwrap();

        first.commit().await.unwrap();
        let err = second.commit().await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_racing_lock_inserts_conflict() {
        let store = InMemoryLedgerStore::new();
        let user_id = UserId::new();
        let event: ExternalEventId = "order-9".into();

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        for tx in [&mut first, &mut second] {
            assert!(tx.find_idempotency_lock(&event).await.unwrap().is_none());
            tx.insert_idempotency_lock(&IdempotencyLock::new(
                event.clone(),
                user_id,
                100,
                Utc::now(),
            ))
            .await
            .unwrap();
        }

        first.commit().await.unwrap();
        assert!(second.commit().await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_blind_appends_do_not_conflict() {
        let store = InMemoryLedgerStore::new();
        let user_id = UserId::new();

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        first
            .append_entry(&LedgerEntry::download(user_id, &ContentId::new("c"), Utc::now()))
            .await
            .unwrap();
        second
            .append_entry(&LedgerEntry::download(user_id, &ContentId::new("c"), Utc::now()))
            .await
            .unwrap();

        first.commit().await.unwrap();
        second.commit().await.unwrap();
        assert_eq!(store.entries_for(user_id).len(), 2);
    }

    #[tokio::test]
    async fn test_unlock_tally_applies_on_commit_only() {
        let store = InMemoryLedgerStore::new();
        let content = ContentId::new("c1");
        let user_id = UserId::new();
        store.put_content(ContentItem::new(content.clone(), 100));

        let mut tx = store.begin().await.unwrap();
        let entry = LedgerEntry::unlock(user_id, 100, &content, Utc::now());
        tx.append_entry(&entry).await.unwrap();
        tx.record_unlock(&content, &entry).await.unwrap();
        tx.rollback().await.unwrap();
        assert_eq!(store.unlock_count(&content), Some(0));

        let mut tx = store.begin().await.unwrap();
        let entry = LedgerEntry::unlock(user_id, 100, &content, Utc::now());
        tx.append_entry(&entry).await.unwrap();
        tx.record_unlock(&content, &entry).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.unlock_count(&content), Some(1));

        store.put_content(ContentItem::new(content.clone(), 120));
        assert_eq!(store.unlock_count(&content), Some(1));
    }

    #[tokio::test]
    async fn test_unlock_tally_requires_its_entry() {
        let store = InMemoryLedgerStore::new();
        let content = ContentId::new("c1");
        store.put_content(ContentItem::new(content.clone(), 100));

        let mut tx = store.begin().await.unwrap();
        let entry = LedgerEntry::unlock(UserId::new(), 100, &content, Utc::now());
        let err = tx.record_unlock(&content, &entry).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn test_injected_conflicts_are_consumed() {
        let store = InMemoryLedgerStore::new();
        store.inject_commit_conflicts(2);

        for _ in 0..2 {
            let tx = store.begin().await.unwrap();
            assert!(tx.commit().await.unwrap_err().is_conflict());
        }
        let tx = store.begin().await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_list_entries_newest_first_and_paginated() {
        let store = InMemoryLedgerStore::new();
        let user_id = UserId::new();
        let start = Utc::now();

        let mut tx = store.begin().await.unwrap();
        for i in 0..5 {
            let order: ExternalEventId = format!("o-{i}").into();
            tx.append_entry(&LedgerEntry::purchase(
                user_id,
                i + 1,
                &order,
                start + chrono::Duration::seconds(i),
            ))
            .await
            .unwrap();
        }
        tx.append_entry(&LedgerEntry::purchase(UserId::new(), 99, &"other".into(), start))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let (page, total) = store
            .list_entries(user_id, PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.iter().map(|e| e.amount).collect::<Vec<_>>(), vec![5, 4]);

        let (page, _) = store
            .list_entries(user_id, PageRequest::new(3, 2))
            .await
            .unwrap();
        assert_eq!(page.iter().map(|e| e.amount).collect::<Vec<_>>(), vec![1]);
    }
}
